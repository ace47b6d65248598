//! Timestamped note events, batched for sending to other participants.
//!
//! With the `serde` feature these serialize to the collaboration wire shape:
//!
//! ```text
//! { "timestamp": 1200.0, "event": "note-on", "data": { "key": 60, "velocity": 0.8 } }
//! { "data": [ ...events ], "recordStartTime": 1000.0 }
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::agent::AgentId;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(tag = "event", content = "data", rename_all = "kebab-case")
)]
pub enum KeyAction {
    NoteOn { key: u8, velocity: f32 },
    NoteOff { key: u8 },
}

impl KeyAction {
    pub fn key(&self) -> u8 {
        match *self {
            KeyAction::NoteOn { key, .. } | KeyAction::NoteOff { key } => key,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KeyEvent {
    /// Milliseconds on the sender's clock
    pub timestamp: f64,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub action: KeyAction,
}

/// Events recorded since `record_start_time`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct EventBatch {
    pub data: Vec<KeyEvent>,
    pub record_start_time: f64,
}

/// A batch as relayed to everyone else, tagged with its sender.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ReceivedBatch {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub batch: EventBatch,
    pub start_time: f64,
    pub end_time: f64,
    pub user: AgentId,
}

/// Records local key events until they are flushed as a batch.
#[derive(Debug, Clone)]
pub struct EventRecorder {
    events: Vec<KeyEvent>,
    record_start_time: f64,
}

impl EventRecorder {
    pub fn new(now_ms: f64) -> Self {
        Self {
            events: Vec::new(),
            record_start_time: now_ms,
        }
    }

    pub fn note_on(&mut self, key: u8, velocity: f32, now_ms: f64) {
        self.record(KeyAction::NoteOn { key, velocity }, now_ms);
    }

    pub fn note_off(&mut self, key: u8, now_ms: f64) {
        self.record(KeyAction::NoteOff { key }, now_ms);
    }

    fn record(&mut self, action: KeyAction, timestamp: f64) {
        self.events.push(KeyEvent { timestamp, action });
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Take everything recorded so far and start a new recording at `now_ms`.
    ///
    /// Returns `None` if nothing was recorded; the recording restarts either way.
    pub fn flush(&mut self, now_ms: f64) -> Option<EventBatch> {
        let start = std::mem::replace(&mut self.record_start_time, now_ms);
        if self.events.is_empty() {
            return None;
        }
        Some(EventBatch {
            data: std::mem::take(&mut self.events),
            record_start_time: start,
        })
    }
}
