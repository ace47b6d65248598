//! Sample assets: one decoded sound per key.
//!
//! Loading is all-or-nothing. A [`SampleBank`] only exists once every key has a
//! sample, and the voice manager stays silent until it receives one.

mod loader;
mod ogg;
mod tone;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use lewton::VorbisError;

use crate::KEY_COUNT;

pub use loader::AssetLoader;
pub use ogg::OggDirectory;
pub use tone::ToneBank;

/// Decoded, interleaved audio for one key.
///
/// Cloning is cheap: the frames are shared.
#[derive(Clone, Debug)]
pub struct SampleBuffer {
    samples: Arc<[f32]>,
    channels: usize,
    sample_rate: u32,
}

impl SampleBuffer {
    /// Create a buffer from interleaved samples
    pub fn new(samples: Vec<f32>, channels: usize, sample_rate: u32) -> Self {
        Self {
            samples: samples.into(),
            channels: channels.max(1),
            sample_rate: sample_rate.max(1),
        }
    }

    /// Interleaved samples
    #[inline]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of frames (samples per channel)
    #[inline]
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels
    }

    /// Playback length in milliseconds
    pub fn duration_ms(&self) -> f64 {
        self.frames() as f64 * 1000.0 / self.sample_rate as f64
    }

    /// Sample at `frame` for output channel `channel`, wrapping channels
    /// when the output has more than the source.
    #[inline]
    pub fn sample(&self, frame: usize, channel: usize) -> f32 {
        let idx = frame * self.channels + channel % self.channels;
        self.samples.get(idx).copied().unwrap_or(0.0)
    }
}

/// Exactly one sample per key.
#[derive(Clone, Debug)]
pub struct SampleBank {
    buffers: Vec<SampleBuffer>,
}

impl SampleBank {
    /// Build a bank; fails unless there is a buffer for every key.
    pub fn new(buffers: Vec<SampleBuffer>) -> Result<Self, AssetError> {
        if buffers.len() != KEY_COUNT {
            return Err(AssetError::IncompleteBank {
                expected: KEY_COUNT,
                found: buffers.len(),
            });
        }
        Ok(Self { buffers })
    }

    /// Same buffer on every key.
    pub fn uniform(buffer: SampleBuffer) -> Self {
        Self {
            buffers: vec![buffer; KEY_COUNT],
        }
    }

    pub fn get(&self, key: u8) -> Option<&SampleBuffer> {
        self.buffers.get(key as usize)
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}

/// Supplies the sample bank. Called once, usually off the main thread.
pub trait AssetProvider {
    fn load_all(&self) -> Result<SampleBank, AssetError>;
}

/// An already-built bank provides itself.
impl AssetProvider for SampleBank {
    fn load_all(&self) -> Result<SampleBank, AssetError> {
        Ok(self.clone())
    }
}

/// Errors raised while loading assets.
#[derive(Debug)]
pub enum AssetError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Vorbis {
        path: PathBuf,
        source: VorbisError,
    },
    IncompleteBank {
        expected: usize,
        found: usize,
    },
    /// A file decoded to zero frames
    EmptySample {
        path: PathBuf,
    },
    /// The loader thread ended without handing back a result
    LoaderGone,
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::Io { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            AssetError::Vorbis { path, source } => {
                write!(f, "failed to decode {}: {}", path.display(), source)
            }
            AssetError::IncompleteBank { expected, found } => {
                write!(f, "sample bank needs {} samples, got {}", expected, found)
            }
            AssetError::EmptySample { path } => {
                write!(f, "{} contains no audio", path.display())
            }
            AssetError::LoaderGone => f.write_str("asset loader stopped without a result"),
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AssetError::Io { source, .. } => Some(source),
            AssetError::Vorbis { source, .. } => Some(source),
            _ => None,
        }
    }
}
