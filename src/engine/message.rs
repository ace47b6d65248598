use rtrb::Consumer;

use crate::agent::AgentId;
use crate::color::Color;

/// Key input queued from another thread (network, MIDI) for the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyMessage {
    Press {
        key: u8,
        velocity: f32,
        agent: AgentId,
        color: Color,
    },
    Release {
        key: u8,
        agent: AgentId,
    },
    ReleaseAll {
        agent: AgentId,
    },
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<KeyMessage>;
}

impl MessageReceiver for Consumer<KeyMessage> {
    fn pop(&mut self) -> Option<KeyMessage> {
        Consumer::pop(self).ok()
    }
}

impl MessageReceiver for std::collections::VecDeque<KeyMessage> {
    fn pop(&mut self) -> Option<KeyMessage> {
        self.pop_front()
    }
}
