use tracing::trace;

use super::layout::KeyKind;
use super::presser::Presser;
use crate::agent::AgentId;
use crate::color::{Channels, Color};
use crate::config::FadeConfig;
use crate::dsp::mix::screen;

/*
Blending a Key
==============

Every key keeps its pressers oldest first. After aging, the key is painted
from its stack:

  1. Base. Find the OLDEST presser whose fade is exactly 1.0. Its color is
     the base and the press state starts at 1.0. If there is none, the base
     is the key's resting color and the press state starts at 0.0.

  2. Layers below the base. Walk from just below the base down to the oldest
     presser, compositing each one over the running color:

         out   = layer × fade + out × (1 - fade)
         state = state + fade × (1 - state)

     Pressers newer than the base are not painted at all. A fully-on press
     always wins outright over fading presses stacked on top of it.

  3. Tone clamp. Black keys take the max of each channel and white keys the
     min, each over a single value, which leaves the color unchanged. White
     keys also compute a desaturation amount that is exposed but never
     applied to the color.

  4. Summary. The color is clamped to [0, 255]; press strength is
     `clamp(state × 2 - 1, 0, 1)`.

Example: stack [A fade 0.5 red, B fade 1.0 green, C fade 0.4 blue]

    base  = B (index 1)        out = green, state = 1.0
    layer = A (index 0)        out = 0.5 red + 0.5 green, state = 1.0
    C is ignored
*/

/// Blend a presser stack over a resting color.
///
/// Returns the unclamped color and the accumulated press state.
pub fn blend(resting: Color, pressers: &[Presser]) -> (Channels, f32) {
    let base = pressers.iter().position(|p| p.fade == 1.0);

    let (mut out, mut state, below) = match base {
        Some(index) => (pressers[index].color.channels(), 1.0, index),
        None => (resting.channels(), 0.0, pressers.len()),
    };

    for presser in pressers[..below].iter().rev() {
        out = out.over(presser.color.channels(), presser.fade);
        state = screen(state, presser.fade);
    }

    (out, state)
}

/// Presser stack and rendered output for one key.
#[derive(Debug, Clone)]
pub struct KeyState {
    kind: KeyKind,
    pressers: Vec<Presser>,
    mixed_color: Color,
    press_strength: f32,
    desaturate_extra: f32,
}

impl KeyState {
    pub fn new(key: u8) -> Self {
        let kind = KeyKind::of(key);
        Self {
            kind,
            pressers: Vec::new(),
            mixed_color: kind.resting_color(),
            press_strength: 0.0,
            desaturate_extra: 0.0,
        }
    }

    pub fn kind(&self) -> KeyKind {
        self.kind
    }

    /// Pressers, oldest first.
    pub fn pressers(&self) -> &[Presser] {
        &self.pressers
    }

    pub fn mixed_color(&self) -> Color {
        self.mixed_color
    }

    /// How strongly the key reads as pressed, in [0, 1].
    pub fn press_strength(&self) -> f32 {
        self.press_strength
    }

    /// Desaturation computed for white keys on the last tick. Never applied
    /// to `mixed_color`; renderers may use it.
    pub fn desaturate_extra(&self) -> f32 {
        self.desaturate_extra
    }

    pub(crate) fn push(&mut self, presser: Presser) {
        self.pressers.push(presser);
    }

    /// Release the newest presser `agent` still holds and return it.
    pub(crate) fn release(&mut self, agent: &AgentId, now_ms: f64) -> Option<&Presser> {
        let presser = self.pressers.iter_mut().rev().find(|p| p.is_held_by(agent))?;
        presser.unpress(now_ms);
        Some(presser)
    }

    /// Release every presser `agent` holds.
    ///
    /// Returns how many of the released pressers own a voice.
    pub(crate) fn release_all(&mut self, agent: &AgentId, now_ms: f64) -> usize {
        let mut voiced = 0;
        for presser in self.pressers.iter_mut().rev() {
            if presser.is_held_by(agent) {
                presser.unpress(now_ms);
                voiced += usize::from(presser.voiced);
            }
        }
        voiced
    }

    /// Update every fade and drop pressers that reached zero.
    ///
    /// Returns how many of the dropped pressers were still pressed and own a
    /// voice; each of those needs a release the agent never sent.
    pub(crate) fn age(&mut self, now_ms: f64, config: &FadeConfig) -> usize {
        let mut expired_pressed = 0;

        self.pressers.retain_mut(|presser| {
            let fade = presser.fade_at(now_ms, config);
            if fade <= 0.0 {
                if presser.pressed && presser.voiced {
                    expired_pressed += 1;
                }
                trace!(agent = %presser.agent, pressed = presser.pressed, "presser expired");
                false
            } else {
                presser.fade = fade;
                true
            }
        });

        expired_pressed
    }

    /// Repaint `mixed_color` and `press_strength` from the stack.
    pub(crate) fn recompute(&mut self, config: &FadeConfig) {
        let (out, state) = blend(self.kind.resting_color(), &self.pressers);
        let out = self.tone_clamp(out, config);

        self.mixed_color = Color::from_channels(out.clamped());
        self.press_strength = (state * 2.0 - 1.0).clamp(0.0, 1.0);
    }

    fn tone_clamp(&mut self, out: Channels, config: &FadeConfig) -> Channels {
        let [r, g, b] = out.0;
        match self.kind {
            KeyKind::Black => Channels([max_of(&[r]), max_of(&[g]), max_of(&[b])]),
            KeyKind::White => {
                self.desaturate_extra = config.key_desaturate + g / 10.0;
                Channels([min_of(&[r]), min_of(&[g]), min_of(&[b])])
            }
        }
    }
}

fn max_of(values: &[f32]) -> f32 {
    values.iter().copied().fold(f32::NEG_INFINITY, f32::max)
}

fn min_of(values: &[f32]) -> f32 {
    values.iter().copied().fold(f32::INFINITY, f32::min)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::new(255, 0, 0);
    const GREEN: Color = Color::new(0, 255, 0);
    const BLUE: Color = Color::new(0, 0, 255);

    fn presser(agent: &str, color: Color, fade: f32) -> Presser {
        let mut p = Presser::new(AgentId::from(agent), color, 1.0, 0.0);
        p.fade = fade;
        p
    }

    #[test]
    fn empty_stack_rests() {
        let (out, state) = blend(Color::WHITE, &[]);
        assert_eq!(Color::from_channels(out), Color::WHITE);
        assert_eq!(state, 0.0);
    }

    #[test]
    fn oldest_full_presser_is_the_base() {
        let stack = [
            presser("A", RED, 0.5),
            presser("B", GREEN, 1.0),
            presser("C", BLUE, 0.4),
        ];
        let (out, state) = blend(Color::WHITE, &stack);

        // Blue is newer than the base and ignored
        assert_eq!(Color::from_channels(out), Color::new(128, 128, 0));
        assert_eq!(state, 1.0);
    }

    #[test]
    fn no_full_presser_blends_over_resting() {
        let stack = [presser("A", RED, 0.5)];
        let (out, state) = blend(Color::WHITE, &stack);
        assert_eq!(Color::from_channels(out), Color::new(255, 128, 128));
        assert_eq!(state, 0.5);

        // Newer fading pressers are layered too when there is no base
        let stack = [presser("A", RED, 0.5), presser("B", BLUE, 0.5)];
        let (_, state) = blend(Color::WHITE, &stack);
        assert_eq!(state, 0.75);
    }

    #[test]
    fn release_picks_newest_held_presser() {
        let mut key = KeyState::new(60);
        key.push(Presser::new(AgentId::from("A"), RED, 1.0, 0.0));
        key.push(Presser::new(AgentId::from("A"), GREEN, 1.0, 10.0));

        let released = key.release(&AgentId::from("A"), 20.0).unwrap();
        assert_eq!(released.color, GREEN);
        assert!(key.pressers()[0].pressed);
        assert!(!key.pressers()[1].pressed);

        assert!(key.release(&AgentId::from("B"), 20.0).is_none());
    }

    #[test]
    fn release_all_counts_only_held() {
        let mut key = KeyState::new(60);
        let a = AgentId::from("A");
        key.push(Presser::new(a.clone(), RED, 1.0, 0.0));
        key.push(Presser::new(AgentId::from("B"), GREEN, 1.0, 0.0));
        key.push(Presser::new(a.clone(), BLUE, 1.0, 0.0));

        assert_eq!(key.release_all(&a, 10.0), 2);
        assert_eq!(key.release_all(&a, 20.0), 0);
        assert!(key.pressers()[1].pressed);
    }

    #[test]
    fn age_reports_stuck_pressers() {
        let config = FadeConfig::default();
        let mut key = KeyState::new(60);
        key.push(Presser::new(AgentId::from("A"), RED, 1.0, 0.0));
        key.push(Presser::new(AgentId::from("B"), GREEN, 1.0, 0.0));
        key.release(&AgentId::from("B"), 100.0);

        assert_eq!(key.age(400.0, &config), 0);
        assert_eq!(key.pressers().len(), 1);

        assert_eq!(key.age(5_300.0, &config), 1);
        assert!(key.pressers().is_empty());
    }

    #[test]
    fn recompute_paints_summary() {
        let config = FadeConfig::default();
        let mut key = KeyState::new(61);
        assert_eq!(key.mixed_color(), Color::BLACK);

        key.push(Presser::new(AgentId::from("A"), RED, 1.0, 0.0));
        key.age(100.0, &config);
        key.recompute(&config);
        assert_eq!(key.mixed_color(), RED);
        assert_eq!(key.press_strength(), 1.0);

        key.release(&AgentId::from("A"), 100.0);
        key.age(400.0, &config);
        key.recompute(&config);
        assert_eq!(key.mixed_color(), Color::BLACK);
        assert_eq!(key.press_strength(), 0.0);
    }

    #[test]
    fn white_keys_compute_unapplied_desaturation() {
        let config = FadeConfig::default();
        let mut key = KeyState::new(60);
        key.push(Presser::new(AgentId::from("A"), GREEN, 1.0, 0.0));
        key.age(10.0, &config);
        key.recompute(&config);

        assert_eq!(key.mixed_color(), GREEN);
        assert!((key.desaturate_extra() - (80.0 + 25.5)).abs() < 1e-4);
    }

    #[test]
    fn half_faded_presser_has_no_strength() {
        let config = FadeConfig::default();
        let mut key = KeyState::new(60);
        key.push(Presser::new(AgentId::from("A"), RED, 1.0, 0.0));
        key.release(&AgentId::from("A"), 0.0);
        key.age(150.0, &config);
        key.recompute(&config);

        // state 0.5 maps to strength 0
        assert_eq!(key.press_strength(), 0.0);
        assert_eq!(key.mixed_color(), Color::new(255, 128, 128));
    }

    #[test]
    fn unvoiced_pressers_need_no_voice_release() {
        let config = FadeConfig::default();
        let mut key = KeyState::new(60);
        let a = AgentId::from("A");
        let mut silent = Presser::new(a.clone(), RED, 1.0, 0.0);
        silent.voiced = false;
        key.push(silent.clone());
        key.push(Presser::new(a.clone(), GREEN, 1.0, 0.0));

        assert_eq!(key.release_all(&a, 10.0), 1);

        let mut key = KeyState::new(60);
        key.push(silent);
        assert!(!key.release(&a, 10.0).unwrap().voiced);

        let mut key = KeyState::new(60);
        let mut stuck = Presser::new(a, RED, 1.0, 0.0);
        stuck.voiced = false;
        key.push(stuck);
        assert_eq!(key.age(5_300.0, &config), 0);
        assert!(key.pressers().is_empty());
    }
}
