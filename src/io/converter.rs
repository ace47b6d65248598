use crate::{agent::AgentId, color::Color, engine::KeyMessage, io::midi::MidiEvent};

/// "All Notes Off" channel mode message
const ALL_NOTES_OFF: u8 = 123;

/// Turn a MIDI event into engine input on behalf of `agent`.
///
/// Velocity is normalized from 0-127 to 0.0-1.0. Events the keyboard has no
/// use for return `None`.
pub fn midi_to_key_message(midi: MidiEvent, agent: &AgentId, color: Color) -> Option<KeyMessage> {
    match midi {
        MidiEvent::NoteOn { key, velocity, .. } => Some(KeyMessage::Press {
            key,
            velocity: velocity as f32 / 127.0,
            agent: agent.clone(),
            color,
        }),
        MidiEvent::NoteOff { key, .. } => Some(KeyMessage::Release {
            key,
            agent: agent.clone(),
        }),
        MidiEvent::ControlChange {
            controller: ALL_NOTES_OFF,
            ..
        } => Some(KeyMessage::ReleaseAll {
            agent: agent.clone(),
        }),
        _ => None,
    }
}

pub fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}
