//! Real-world scenario benchmarks.
//!
//! These model how the keyboard is actually driven: one engine tick per UI
//! frame, and one mixer render per audio callback.

mod engine;
mod mixer;

pub use engine::bench_engine;
pub use mixer::bench_mixer;
