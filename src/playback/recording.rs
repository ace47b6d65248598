//! Headless device that records what it was asked to do.

use std::collections::HashSet;

use super::{PlaybackDevice, PlaybackError};
use crate::assets::SampleBuffer;
use crate::dsp::automation::ReleaseShape;
use crate::synth::VoiceId;

/// One command received by a [`RecordingDevice`].
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    Start { id: VoiceId, gain: f32, frames: usize },
    Release { id: VoiceId, shape: ReleaseShape },
    Stop { id: VoiceId },
}

/// Plays nothing; keeps a log of commands and the set of live sources.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    commands: Vec<DeviceCommand>,
    playing: HashSet<VoiceId>,
    rejecting: bool,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following command fail (simulates a dead device).
    pub fn set_rejecting(&mut self, rejecting: bool) {
        self.rejecting = rejecting;
    }

    pub fn commands(&self) -> &[DeviceCommand] {
        &self.commands
    }

    pub fn is_playing(&self, id: VoiceId) -> bool {
        self.playing.contains(&id)
    }

    pub fn playing_count(&self) -> usize {
        self.playing.len()
    }

    /// How many times `id` was stopped.
    pub fn stop_count(&self, id: VoiceId) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DeviceCommand::Stop { id: stopped } if *stopped == id))
            .count()
    }

    pub fn release_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DeviceCommand::Release { .. }))
            .count()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    fn check(&self) -> Result<(), PlaybackError> {
        if self.rejecting {
            Err(PlaybackError::Rejected)
        } else {
            Ok(())
        }
    }
}

impl PlaybackDevice for RecordingDevice {
    fn start(
        &mut self,
        id: VoiceId,
        sample: &SampleBuffer,
        gain: f32,
    ) -> Result<(), PlaybackError> {
        self.check()?;
        self.playing.insert(id);
        self.commands.push(DeviceCommand::Start {
            id,
            gain,
            frames: sample.frames(),
        });
        Ok(())
    }

    fn release(&mut self, id: VoiceId, shape: ReleaseShape) -> Result<(), PlaybackError> {
        self.check()?;
        self.commands.push(DeviceCommand::Release { id, shape });
        Ok(())
    }

    fn stop(&mut self, id: VoiceId) -> Result<(), PlaybackError> {
        self.check()?;
        self.playing.remove(&id);
        self.commands.push(DeviceCommand::Stop { id });
        Ok(())
    }
}
