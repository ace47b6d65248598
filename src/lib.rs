pub mod agent;
pub mod assets; // Sample loading
pub mod clock;
pub mod color;
pub mod config;
pub mod dsp;
pub mod engine; // Per-key presser stacks and blending
pub mod io;
pub mod playback; // Injected audio output
pub mod session;
pub mod synth; // Voice lifecycle

pub use agent::{AgentId, Participant};
pub use clock::{Clock, ManualClock, SystemClock};
pub use color::Color;
pub use config::{EngineConfig, FadeConfig, VoiceConfig};
pub use engine::KeyStateEngine;

/// Keys on the shared keyboard (MIDI note numbers 0-127).
pub const KEY_COUNT: usize = 128;

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME_MS: f64 = 1.0 / 48.0;
