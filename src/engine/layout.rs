//! Keyboard geometry: which keys are black, and their resting colors.

use crate::color::Color;

/// Semitone offsets within an octave that are black keys.
const BLACK_OFFSETS: [u8; 5] = [1, 3, 6, 8, 10];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    White,
    Black,
}

impl KeyKind {
    pub fn of(key: u8) -> Self {
        if is_black(key) {
            KeyKind::Black
        } else {
            KeyKind::White
        }
    }

    /// Color of the key when nobody is pressing it.
    pub fn resting_color(self) -> Color {
        match self {
            KeyKind::White => Color::WHITE,
            KeyKind::Black => Color::BLACK,
        }
    }
}

#[inline]
pub fn is_black(key: u8) -> bool {
    BLACK_OFFSETS.contains(&(key % 12))
}

/// Position of `key` among keys of its own kind, counting from key 0.
///
/// White keys count 0, 1, 2, ... left to right, and so do black keys. The
/// renderer uses this to place keys without walking the whole keyboard.
pub fn key_number(key: u8) -> usize {
    let octave = (key / 12) as usize;
    let offset = key % 12;
    if is_black(key) {
        let within = BLACK_OFFSETS.iter().take_while(|&&b| b < offset).count();
        octave * BLACK_OFFSETS.len() + within
    } else {
        let blacks_below = BLACK_OFFSETS.iter().take_while(|&&b| b < offset).count();
        octave * 7 + (offset as usize - blacks_below)
    }
}
