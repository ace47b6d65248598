//! Benchmarks for low-level DSP primitives.

mod amplify;
mod automation;
mod mix;

pub use amplify::bench_amplify;
pub use automation::bench_automation;
pub use mix::bench_mix;
