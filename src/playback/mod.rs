//! Injected audio output.
//!
//! The voice manager never talks to audio hardware directly. It drives a
//! [`PlaybackDevice`], so tests run against [`RecordingDevice`] and the
//! binary runs against [`CpalPlayback`].

mod cpal_output;
mod mixer;
mod recording;

use std::fmt;

use crate::assets::SampleBuffer;
use crate::dsp::automation::ReleaseShape;
use crate::synth::VoiceId;

pub use cpal_output::CpalPlayback;
pub use mixer::{Mixer, MixerCommand};
pub use recording::{DeviceCommand, RecordingDevice};

/// Something that can play, fade, and stop sample sources.
pub trait PlaybackDevice {
    /// Start playing `sample` immediately at `gain`.
    fn start(&mut self, id: VoiceId, sample: &SampleBuffer, gain: f32)
        -> Result<(), PlaybackError>;

    /// Begin the hold-then-ramp release of a playing source.
    fn release(&mut self, id: VoiceId, shape: ReleaseShape) -> Result<(), PlaybackError>;

    /// Disconnect and stop a source.
    fn stop(&mut self, id: VoiceId) -> Result<(), PlaybackError>;
}

/// Errors raised by playback devices.
#[derive(Debug)]
pub enum PlaybackError {
    NoOutputDevice,
    DefaultConfig(cpal::DefaultStreamConfigError),
    BuildStream(cpal::BuildStreamError),
    PlayStream(cpal::PlayStreamError),
    UnsupportedFormat(cpal::SampleFormat),
    /// The audio thread is not draining commands fast enough
    QueueFull,
    /// The device refused the command
    Rejected,
}

impl fmt::Display for PlaybackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackError::NoOutputDevice => f.write_str("no default output device available"),
            PlaybackError::DefaultConfig(e) => write!(f, "failed to fetch output config: {}", e),
            PlaybackError::BuildStream(e) => write!(f, "failed to build output stream: {}", e),
            PlaybackError::PlayStream(e) => write!(f, "failed to start output stream: {}", e),
            PlaybackError::UnsupportedFormat(format) => {
                write!(f, "unsupported sample format: {:?}", format)
            }
            PlaybackError::QueueFull => f.write_str("playback command queue is full"),
            PlaybackError::Rejected => f.write_str("playback device rejected the command"),
        }
    }
}

impl std::error::Error for PlaybackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlaybackError::DefaultConfig(e) => Some(e),
            PlaybackError::BuildStream(e) => Some(e),
            PlaybackError::PlayStream(e) => Some(e),
            _ => None,
        }
    }
}

impl From<cpal::DefaultStreamConfigError> for PlaybackError {
    fn from(e: cpal::DefaultStreamConfigError) -> Self {
        PlaybackError::DefaultConfig(e)
    }
}

impl From<cpal::BuildStreamError> for PlaybackError {
    fn from(e: cpal::BuildStreamError) -> Self {
        PlaybackError::BuildStream(e)
    }
}

impl From<cpal::PlayStreamError> for PlaybackError {
    fn from(e: cpal::PlayStreamError) -> Self {
        PlaybackError::PlayStream(e)
    }
}
