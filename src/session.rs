//! The local participant, and playback of other participants' batches.

use std::collections::{HashMap, VecDeque};

use tracing::{debug, warn};

use crate::agent::{AgentId, Participant};
use crate::clock::Clock;
use crate::engine::KeyStateEngine;
use crate::io::events::{EventBatch, EventRecorder, KeyAction, ReceivedBatch};
use crate::playback::PlaybackDevice;

/// The person at this keyboard.
///
/// Presses go to the engine as the participant's agent and are recorded for
/// sending to everyone else.
pub struct LocalSession {
    participant: Participant,
    recorder: EventRecorder,
}

impl LocalSession {
    pub fn new(participant: Participant, now_ms: f64) -> Self {
        Self {
            participant,
            recorder: EventRecorder::new(now_ms),
        }
    }

    pub fn participant(&self) -> &Participant {
        &self.participant
    }

    pub fn agent(&self) -> &AgentId {
        &self.participant.id
    }

    pub fn press<D: PlaybackDevice, C: Clock>(
        &mut self,
        engine: &mut KeyStateEngine<D, C>,
        key: u8,
        velocity: f32,
    ) {
        engine.press(key, velocity, &self.participant.id, self.participant.color);
        self.recorder
            .note_on(key, velocity, engine.clock().now_ms());
    }

    /// Release `key`. Only a release that actually let go of something is
    /// recorded.
    pub fn release<D: PlaybackDevice, C: Clock>(
        &mut self,
        engine: &mut KeyStateEngine<D, C>,
        key: u8,
    ) -> bool {
        if !engine.release(key, &self.participant.id) {
            return false;
        }
        self.recorder.note_off(key, engine.clock().now_ms());
        true
    }

    /// Let go of everything, e.g. when the window loses focus. Not recorded.
    pub fn release_all<D: PlaybackDevice, C: Clock>(&mut self, engine: &mut KeyStateEngine<D, C>) {
        engine.release_all(&self.participant.id);
    }

    /// Take the recorded events as a batch to send.
    pub fn flush(&mut self, now_ms: f64) -> Option<EventBatch> {
        self.recorder.flush(now_ms)
    }
}

#[derive(Debug, Clone)]
struct PendingEvent {
    due_ms: f64,
    user: AgentId,
    action: KeyAction,
}

/// Replays batches received from other participants.
///
/// Each event plays at `arrival + (timestamp - record_start_time)`, keeping
/// the sender's rhythm but not their clock.
#[derive(Debug, Default)]
pub struct RemotePlayback {
    roster: HashMap<AgentId, Participant>,
    pending: VecDeque<PendingEvent>,
}

impl RemotePlayback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or update a participant.
    pub fn join(&mut self, participant: Participant) {
        self.roster.insert(participant.id.clone(), participant);
    }

    pub fn leave(&mut self, id: &AgentId) -> Option<Participant> {
        self.roster.remove(id)
    }

    pub fn participant(&self, id: &AgentId) -> Option<&Participant> {
        self.roster.get(id)
    }

    /// Schedule a received batch, which arrived at `now_ms`.
    ///
    /// Batches from unknown users are dropped.
    pub fn enqueue(&mut self, received: ReceivedBatch, now_ms: f64) {
        if !self.roster.contains_key(&received.user) {
            warn!(user = %received.user, "dropping batch from unknown user");
            return;
        }

        let start = received.batch.record_start_time;
        for event in received.batch.data {
            let pending = PendingEvent {
                due_ms: now_ms + (event.timestamp - start).max(0.0),
                user: received.user.clone(),
                action: event.action,
            };
            // Batches mostly arrive in order; insert after every event due
            // no later than this one.
            let at = self.pending.partition_point(|p| p.due_ms <= pending.due_ms);
            self.pending.insert(at, pending);
        }
        debug!(user = %received.user, queued = self.pending.len(), "batch scheduled");
    }

    /// Play every event due at or before `now_ms`. Returns how many played.
    pub fn drain_due<D: PlaybackDevice, C: Clock>(
        &mut self,
        now_ms: f64,
        engine: &mut KeyStateEngine<D, C>,
    ) -> usize {
        let mut played = 0;
        while self.pending.front().is_some_and(|p| p.due_ms <= now_ms) {
            let Some(event) = self.pending.pop_front() else {
                break;
            };
            played += 1;

            let Some(participant) = self.roster.get(&event.user) else {
                // Left after the batch was scheduled
                continue;
            };
            match event.action {
                KeyAction::NoteOn { key, velocity } => {
                    engine.press(key, velocity, &participant.id, participant.color)
                }
                KeyAction::NoteOff { key } => {
                    engine.release(key, &participant.id);
                }
            }
        }
        played
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}
