//! RGB colors for agents and keys.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::mix::over;

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const BLACK: Color = Color::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Round and clamp floating-point channels into a color.
    pub fn from_channels(channels: Channels) -> Self {
        let [r, g, b] = channels.0.map(|c| c.round().clamp(0.0, 255.0) as u8);
        Self { r, g, b }
    }

    pub fn channels(self) -> Channels {
        Channels([self.r as f32, self.g as f32, self.b as f32])
    }
}

/// Unclamped floating-point color used while compositing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Channels(pub [f32; 3]);

impl Channels {
    /// Composite `layer` over these channels with opacity `alpha`.
    pub fn over(self, layer: Channels, alpha: f32) -> Channels {
        let mut out = self.0;
        for (o, l) in out.iter_mut().zip(layer.0) {
            *o = over(*o, l, alpha);
        }
        Channels(out)
    }

    /// Clamp every channel into [0, 255].
    pub fn clamped(self) -> Channels {
        Channels(self.0.map(|c| c.clamp(0.0, 255.0)))
    }
}

impl From<Color> for Channels {
    fn from(color: Color) -> Self {
        color.channels()
    }
}
