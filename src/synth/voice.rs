use std::fmt;

use crate::dsp::automation::ReleaseShape;

/// Identity of one playing sound. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoiceId(pub(crate) u64);

impl VoiceId {
    /// Wrap a raw id. The voice manager numbers its own voices; this is for
    /// driving a device directly.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for VoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "voice#{}", self.0)
    }
}

/// Returned by a successful press; the only way to refer to a voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoiceHandle {
    id: VoiceId,
    key: u8,
}

impl VoiceHandle {
    pub(crate) fn new(id: VoiceId, key: u8) -> Self {
        Self { id, key }
    }

    pub fn id(&self) -> VoiceId {
        self.id
    }

    pub fn key(&self) -> u8 {
        self.key
    }
}

impl From<VoiceHandle> for VoiceId {
    fn from(handle: VoiceHandle) -> Self {
        handle.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceStatus {
    Playing,   // Started, not yet released
    Releasing, // Released, ramping down until teardown
    Removed,   // Stopped and disconnected
}

/// Bookkeeping for one voice. The audio itself lives in the device.
#[derive(Debug, Clone)]
pub(crate) struct Voice {
    pub key: u8,
    pub gain: f32,
    pub released_at: Option<f64>,
    /// Set by the first teardown to run; later ones are no-ops
    pub removed: bool,
    /// Scheduled teardowns that still reference this voice
    pub pending: u32,
}

impl Voice {
    pub fn new(key: u8, gain: f32) -> Self {
        Self {
            key,
            gain,
            released_at: None,
            removed: false,
            pending: 0,
        }
    }

    pub fn status(&self) -> VoiceStatus {
        if self.removed {
            VoiceStatus::Removed
        } else if self.released_at.is_some() {
            VoiceStatus::Releasing
        } else {
            VoiceStatus::Playing
        }
    }

    /// Gain the device should be applying at `now_ms`.
    pub fn gain_at(&self, now_ms: f64, shape: &ReleaseShape) -> f32 {
        if self.removed {
            return 0.0;
        }
        match self.released_at {
            None => self.gain,
            Some(at) => shape.level_at(self.gain, (now_ms - at).max(0.0)),
        }
    }
}
