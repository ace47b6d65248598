// Purpose: per-key concurrent state
// Presser stacks, fades and blending; drives the voice manager

pub mod key_state;
pub mod layout;
pub mod message;
pub mod presser;

mod keyboard;

pub use key_state::KeyState;
pub use keyboard::KeyStateEngine;
pub use layout::{is_black, key_number, KeyKind};
pub use message::{KeyMessage, MessageReceiver};
pub use presser::Presser;
