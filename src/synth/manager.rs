use std::collections::HashMap;

use tracing::{debug, info, trace, warn};

use super::scheduler::{Scheduler, TaskKind};
use super::voice::{Voice, VoiceHandle, VoiceId, VoiceStatus};
use crate::assets::SampleBank;
use crate::config::VoiceConfig;
use crate::dsp::amplify::velocity_gain;
use crate::playback::PlaybackDevice;
use crate::KEY_COUNT;

/// Owns every audio voice and its teardown schedule.
///
/// Each press starts one voice. Voices on a key are released last-in,
/// first-out. Every voice is torn down by whichever of its scheduled tasks
/// runs first: the natural end of its sample, or the end of its release ramp.
/// The loser finds `removed` already set and does nothing.
pub struct VoiceManager<D: PlaybackDevice> {
    device: D,
    config: VoiceConfig,
    bank: Option<SampleBank>,

    voices: HashMap<VoiceId, Voice>,
    // Unreleased voices per key, oldest first
    active: Vec<Vec<VoiceId>>,
    scheduler: Scheduler,
    next_id: u64,
}

impl<D: PlaybackDevice> VoiceManager<D> {
    pub fn new(device: D, config: VoiceConfig) -> Self {
        Self {
            device,
            config,
            bank: None,
            voices: HashMap::new(),
            active: vec![Vec::new(); KEY_COUNT],
            scheduler: Scheduler::new(),
            next_id: 0,
        }
    }

    /// Install the sample bank. Until this happens every press and release
    /// is ignored.
    pub fn install(&mut self, bank: SampleBank) {
        info!(keys = bank.len(), "sample bank installed");
        self.bank = Some(bank);
    }

    pub fn is_ready(&self) -> bool {
        self.bank.is_some()
    }

    /// Start a voice for `key`. Returns `None` when assets are not loaded, the
    /// key is out of range, or the device refused to start.
    pub fn press(&mut self, key: u8, velocity: f32, now_ms: f64) -> Option<VoiceHandle> {
        let Some(bank) = &self.bank else {
            trace!(key, "press ignored, assets not loaded");
            return None;
        };
        let sample = bank.get(key)?;

        let id = VoiceId(self.next_id);
        self.next_id += 1;

        let gain = velocity_gain(velocity, self.config.volume_scale);
        if let Err(err) = self.device.start(id, sample, gain) {
            warn!(key, %id, "failed to start voice: {}", err);
            return None;
        }

        let mut voice = Voice::new(key, gain);
        voice.pending = 1;
        self.scheduler
            .schedule(now_ms + sample.duration_ms(), id, TaskKind::NaturalEnd);
        self.voices.insert(id, voice);
        self.active[key as usize].push(id);

        debug!(key, %id, gain, "voice started");
        Some(VoiceHandle::new(id, key))
    }

    /// Release the most recently pressed unreleased voice on `key`.
    pub fn release(&mut self, key: u8, now_ms: f64) -> Option<VoiceHandle> {
        if !self.is_ready() {
            return None;
        }
        let id = self.active.get_mut(key as usize)?.pop()?;
        let voice = self.voices.get_mut(&id)?;

        voice.released_at = Some(now_ms);
        voice.pending += 1;

        if let Err(err) = self.device.release(id, self.config.release_shape()) {
            warn!(key, %id, "failed to release voice: {}", err);
        }
        self.scheduler.schedule(
            now_ms + self.config.teardown_delay_ms(),
            id,
            TaskKind::ReleaseTeardown,
        );

        debug!(key, %id, "voice released");
        Some(VoiceHandle::new(id, key))
    }

    /// Run every teardown due at or before `now_ms`.
    pub fn service(&mut self, now_ms: f64) {
        while let Some(task) = self.scheduler.pop_due(now_ms) {
            self.teardown(task.voice, task.kind);
        }
    }

    fn teardown(&mut self, id: VoiceId, kind: TaskKind) {
        let Some(voice) = self.voices.get_mut(&id) else {
            return;
        };
        voice.pending = voice.pending.saturating_sub(1);

        if !voice.removed {
            voice.removed = true;
            let key = voice.key as usize;
            if let Err(err) = self.device.stop(id) {
                warn!(%id, "failed to stop voice: {}", err);
            }
            // A voice that ends on its own is no longer releasable
            if let Some(stack) = self.active.get_mut(key) {
                stack.retain(|v| *v != id);
            }
            trace!(%id, ?kind, "voice removed");
        }

        if self.voices.get(&id).is_some_and(|v| v.removed && v.pending == 0) {
            self.voices.remove(&id);
        }
    }

    /// Status of a voice, by handle or id. Dropped records read as removed.
    pub fn status(&self, voice: impl Into<VoiceId>) -> VoiceStatus {
        self.voices
            .get(&voice.into())
            .map(Voice::status)
            .unwrap_or(VoiceStatus::Removed)
    }

    /// Gain the voice is playing at, following the release ramp.
    pub fn gain_at(&self, voice: impl Into<VoiceId>, now_ms: f64) -> f32 {
        let shape = self.config.release_shape();
        self.voices
            .get(&voice.into())
            .map(|v| v.gain_at(now_ms, &shape))
            .unwrap_or(0.0)
    }

    /// Unreleased voices on `key`.
    pub fn active_count(&self, key: u8) -> usize {
        self.active.get(key as usize).map_or(0, Vec::len)
    }

    /// Voices not yet torn down, across all keys.
    pub fn live_count(&self) -> usize {
        self.voices.values().filter(|v| !v.removed).count()
    }

    pub fn pending_tasks(&self) -> usize {
        self.scheduler.len()
    }

    pub fn config(&self) -> &VoiceConfig {
        &self.config
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }
}
