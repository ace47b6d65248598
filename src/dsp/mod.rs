//! Low-level DSP primitives used by the voice and playback layers.
//!
//! These components are allocation-free and realtime-safe, so the mixer can
//! run them inside the audio callback.

/// Velocity-to-gain curve and gain application.
pub mod amplify;
/// Hold-then-ramp release automation.
pub mod automation;
/// Bus summing, soft limiting, and alpha layering.
pub mod mix;

pub use automation::{AutomationStage, GainAutomation, ReleaseShape};
