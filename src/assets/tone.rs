//! Synthesized stand-in samples, so the keyboard plays without asset files.

use std::f32::consts::TAU;

use super::{AssetError, AssetProvider, SampleBank, SampleBuffer};
use crate::io::converter::midi_note_to_freq;
use crate::KEY_COUNT;

/// A decaying sine (plus a quiet octave partial) per key.
pub struct ToneBank {
    sample_rate: u32,
    duration_ms: f64,
    decay_per_sec: f32,
}

impl ToneBank {
    pub fn new() -> Self {
        Self {
            sample_rate: 32_000,
            duration_ms: 1_000.0,
            decay_per_sec: 4.0,
        }
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate.max(1);
        self
    }

    pub fn with_duration_ms(mut self, ms: f64) -> Self {
        self.duration_ms = ms.max(0.0);
        self
    }

    /// Render the tone for one key.
    pub fn render(&self, key: u8) -> SampleBuffer {
        let frames = (self.duration_ms * self.sample_rate as f64 / 1000.0) as usize;
        let freq = midi_note_to_freq(key);
        let nyquist = self.sample_rate as f32 / 2.0;
        let sr = self.sample_rate as f32;

        let samples = (0..frames)
            .map(|i| {
                let t = i as f32 / sr;
                let env = (-self.decay_per_sec * t).exp();
                let mut s = (TAU * freq * t).sin();
                if freq * 2.0 < nyquist {
                    s += 0.25 * (TAU * freq * 2.0 * t).sin();
                }
                s * env * 0.8
            })
            .collect();

        SampleBuffer::new(samples, 1, self.sample_rate)
    }
}

impl Default for ToneBank {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetProvider for ToneBank {
    fn load_all(&self) -> Result<SampleBank, AssetError> {
        let buffers = (0..KEY_COUNT as u8).map(|key| self.render(key)).collect();
        SampleBank::new(buffers)
    }
}
