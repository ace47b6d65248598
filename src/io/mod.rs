// Purpose - external interfaces, format conversions

pub mod converter;
pub mod events;
pub mod midi;

pub use events::{EventBatch, EventRecorder, KeyAction, KeyEvent, ReceivedBatch};
