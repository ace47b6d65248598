//! Engine configuration.
//!
//! All durations are milliseconds. Defaults reproduce the stock feel of the
//! shared keyboard: a 5 s stuck-key hold, 300 ms visual fades, and a 50 ms
//! hold + 300 ms audio release.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::automation::ReleaseShape;

/// Visual fade timing for pressers.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct FadeConfig {
    /// Linear decay time after a release, and after the stuck-key hold
    pub fade_time_ms: f64,
    /// How long an unreleased press stays fully lit before it auto-fades
    pub auto_fade_time_ms: f64,
    /// White-key desaturation amount; computed but not applied
    pub key_desaturate: f32,
}

impl Default for FadeConfig {
    fn default() -> Self {
        Self {
            fade_time_ms: 300.0,
            auto_fade_time_ms: 5_000.0,
            key_desaturate: 80.0,
        }
    }
}

impl FadeConfig {
    /// Time after press at which an unreleased presser disappears.
    pub fn stuck_key_lifetime_ms(&self) -> f64 {
        self.auto_fade_time_ms + self.fade_time_ms
    }
}

/// Audio voice gain staging and release timing.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct VoiceConfig {
    /// Headroom factor: `gain = velocity² × volume_scale`
    pub volume_scale: f32,
    /// Gain hold after a release, before the ramp starts
    pub release_hold_ms: f64,
    /// Release ramp duration
    pub falloff_ms: f64,
    /// Extra time after the falloff before the voice is torn down
    pub teardown_padding_ms: f64,
    /// Release ramp target
    pub silence_floor: f32,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            volume_scale: 0.3,
            release_hold_ms: 50.0,
            falloff_ms: 300.0,
            teardown_padding_ms: 500.0,
            silence_floor: 0.0001,
        }
    }
}

impl VoiceConfig {
    pub fn release_shape(&self) -> ReleaseShape {
        ReleaseShape::new(self.release_hold_ms, self.falloff_ms, self.silence_floor)
    }

    /// Delay between a release call and the voice teardown.
    pub fn teardown_delay_ms(&self) -> f64 {
        self.falloff_ms + self.teardown_padding_ms
    }
}

/// Full engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct EngineConfig {
    pub fade: FadeConfig,
    pub voice: VoiceConfig,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the visual fade time
    pub fn with_fade_time_ms(mut self, ms: f64) -> Self {
        self.fade.fade_time_ms = ms.max(crate::MIN_TIME_MS);
        self
    }

    /// Set the stuck-key hold time
    pub fn with_auto_fade_time_ms(mut self, ms: f64) -> Self {
        self.fade.auto_fade_time_ms = ms.max(0.0);
        self
    }

    /// Set the voice headroom factor
    pub fn with_volume_scale(mut self, scale: f32) -> Self {
        self.voice.volume_scale = scale.max(0.0);
        self
    }

    /// Set the audio release ramp duration
    pub fn with_falloff_ms(mut self, ms: f64) -> Self {
        self.voice.falloff_ms = ms.max(crate::MIN_TIME_MS);
        self
    }
}
