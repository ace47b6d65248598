use tracing::debug;

use super::key_state::KeyState;
use super::layout::KeyKind;
use super::message::{KeyMessage, MessageReceiver};
use super::presser::Presser;
use crate::agent::AgentId;
use crate::assets::SampleBank;
use crate::clock::{Clock, SystemClock};
use crate::color::Color;
use crate::config::{EngineConfig, FadeConfig};
use crate::playback::PlaybackDevice;
use crate::synth::VoiceManager;
use crate::KEY_COUNT;

/// The shared keyboard.
///
/// Agents press and release keys; every key keeps an ordered stack of
/// pressers and repaints itself on each [`tick`](Self::tick). Presses and
/// releases are forwarded to the [`VoiceManager`]. Until the sample bank is
/// installed, presses and releases are ignored entirely.
///
/// All calls happen on one thread. Input from other threads arrives as
/// [`KeyMessage`]s through [`drain`](Self::drain).
pub struct KeyStateEngine<D: PlaybackDevice, C: Clock = SystemClock> {
    keys: Vec<KeyState>,
    voices: VoiceManager<D>,
    clock: C,
    fade: FadeConfig,
}

impl<D: PlaybackDevice> KeyStateEngine<D, SystemClock> {
    pub fn new(device: D, config: EngineConfig) -> Self {
        Self::with_clock(device, config, SystemClock::new())
    }
}

impl<D: PlaybackDevice, C: Clock> KeyStateEngine<D, C> {
    pub fn with_clock(device: D, config: EngineConfig, clock: C) -> Self {
        Self {
            keys: (0..KEY_COUNT as u8).map(KeyState::new).collect(),
            voices: VoiceManager::new(device, config.voice),
            clock,
            fade: config.fade,
        }
    }

    pub fn install_assets(&mut self, bank: SampleBank) {
        self.voices.install(bank);
    }

    pub fn is_ready(&self) -> bool {
        self.voices.is_ready()
    }

    /// Press `key` as `agent`. Out-of-range keys are ignored.
    pub fn press(&mut self, key: u8, velocity: f32, agent: &AgentId, color: Color) {
        if !self.is_ready() {
            return;
        }
        let now = self.clock.now_ms();
        let Some(state) = self.keys.get_mut(key as usize) else {
            return;
        };

        let mut presser = Presser::new(agent.clone(), color, velocity, now);
        presser.voiced = self.voices.press(key, velocity, now).is_some();
        state.push(presser);
        debug!(key, %agent, velocity, "key pressed");
    }

    /// Release the newest press `agent` still holds on `key`.
    ///
    /// Returns false if there was nothing to release.
    pub fn release(&mut self, key: u8, agent: &AgentId) -> bool {
        if !self.is_ready() {
            return false;
        }
        let now = self.clock.now_ms();
        let Some(state) = self.keys.get_mut(key as usize) else {
            return false;
        };

        let Some(presser) = state.release(agent, now) else {
            return false;
        };
        // A press the device refused never took a voice off the stack
        if presser.voiced {
            self.voices.release(key, now);
        }
        debug!(key, %agent, "key released");
        true
    }

    /// Release every key `agent` is holding.
    pub fn release_all(&mut self, agent: &AgentId) {
        if !self.is_ready() {
            return;
        }
        let now = self.clock.now_ms();

        for (key, state) in self.keys.iter_mut().enumerate() {
            for _ in 0..state.release_all(agent, now) {
                self.voices.release(key as u8, now);
            }
        }
        debug!(%agent, "released all keys");
    }

    /// Age every presser and repaint every key.
    ///
    /// Due voice teardowns run first. A press that auto-fades out without
    /// ever being released gets its voice released here.
    pub fn tick(&mut self, now_ms: f64) {
        self.voices.service(now_ms);

        for (key, state) in self.keys.iter_mut().enumerate() {
            for _ in 0..state.age(now_ms, &self.fade) {
                debug!(key, "stuck key auto-released");
                self.voices.release(key as u8, now_ms);
            }
            state.recompute(&self.fade);
        }
    }

    /// [`tick`](Self::tick) at the clock's current time.
    pub fn update(&mut self) {
        let now = self.clock.now_ms();
        self.tick(now);
    }

    /// Apply one queued message.
    pub fn apply(&mut self, message: KeyMessage) {
        match message {
            KeyMessage::Press {
                key,
                velocity,
                agent,
                color,
            } => self.press(key, velocity, &agent, color),
            KeyMessage::Release { key, agent } => {
                self.release(key, &agent);
            }
            KeyMessage::ReleaseAll { agent } => self.release_all(&agent),
        }
    }

    /// Apply every queued message. Returns how many were applied.
    pub fn drain<R: MessageReceiver>(&mut self, rx: &mut R) -> usize {
        let mut applied = 0;
        while let Some(message) = rx.pop() {
            self.apply(message);
            applied += 1;
        }
        applied
    }

    pub fn key(&self, key: u8) -> Option<&KeyState> {
        self.keys.get(key as usize)
    }

    pub fn keys(&self) -> &[KeyState] {
        &self.keys
    }

    /// Blended color of `key` as of the last tick. Black for out-of-range keys.
    pub fn mixed_color(&self, key: u8) -> Color {
        self.key(key).map_or(Color::BLACK, KeyState::mixed_color)
    }

    pub fn press_strength(&self, key: u8) -> f32 {
        self.key(key).map_or(0.0, KeyState::press_strength)
    }

    pub fn pressers(&self, key: u8) -> &[Presser] {
        self.key(key).map(KeyState::pressers).unwrap_or_default()
    }

    pub fn key_kind(&self, key: u8) -> KeyKind {
        KeyKind::of(key)
    }

    pub fn voices(&self) -> &VoiceManager<D> {
        &self.voices
    }

    pub fn voices_mut(&mut self) -> &mut VoiceManager<D> {
        &mut self.voices
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn fade_config(&self) -> &FadeConfig {
        &self.fade
    }
}
