use crate::agent::AgentId;
use crate::color::Color;
use crate::config::FadeConfig;
use crate::MIN_TIME_MS;

/*
Presser Fades
=============

A presser is one logical press on one key. Its `fade` is its weight in the
key's blend, from 1.0 (fully on) down to 0.0 (gone).

Two curves drive it:

  auto-fade   Holds 1.0 for `auto_fade_time` after the press, then falls
              linearly to 0.0 over `fade_time`. Applies whether or not the
              key was released, so a press nobody ever releases still ends.

                  auto = 1 - ((now - press) - auto_fade_time) / fade_time

  release     Falls linearly from 1.0 at the release to 0.0 `fade_time`
              later.

                  rel = 1 - (now - release) / fade_time

A pressed presser uses `auto`. A released one uses `min(auto, rel)`, so a
release late in the auto-fade never brightens the key back up. Both are
clamped to [0, 1] afterwards.

      fade
    1 ┤━━━━━━━━━━━━━━━━━━━━━━━━┓          pressed, never released
      │                        ┃╲
      │                        ┃  ╲
    0 ┤────────────────────────┸────╲───→ time
      press                  5.0s  5.3s
*/

/// One logical press on a key.
#[derive(Debug, Clone, PartialEq)]
pub struct Presser {
    pub agent: AgentId,
    pub color: Color,
    pub velocity: f32,
    pub pressed: bool,
    pub press_time_ms: f64,
    pub unpress_time_ms: Option<f64>,
    /// Current blend weight, updated every tick
    pub fade: f32,
    /// Whether the press started an audio voice. Only voiced pressers
    /// release one.
    pub voiced: bool,
}

impl Presser {
    pub fn new(agent: AgentId, color: Color, velocity: f32, now_ms: f64) -> Self {
        Self {
            agent,
            color,
            velocity,
            pressed: true,
            press_time_ms: now_ms,
            unpress_time_ms: None,
            fade: 1.0,
            voiced: true,
        }
    }

    /// Mark the presser released at `now_ms`.
    pub fn unpress(&mut self, now_ms: f64) {
        self.pressed = false;
        self.unpress_time_ms = Some(now_ms);
    }

    /// Whether this presser can be released by `agent`.
    pub fn is_held_by(&self, agent: &AgentId) -> bool {
        self.pressed && self.agent == *agent
    }

    /// Fade at `now_ms`, clamped to [0, 1].
    pub fn fade_at(&self, now_ms: f64, config: &FadeConfig) -> f32 {
        // A zero fade time would make the hold boundary 0/0
        let fade_time = config.fade_time_ms.max(MIN_TIME_MS);
        let auto = 1.0 - ((now_ms - self.press_time_ms) - config.auto_fade_time_ms) / fade_time;

        let fade = match self.unpress_time_ms {
            Some(at) if !self.pressed => {
                let released = 1.0 - (now_ms - at) / fade_time;
                auto.min(released)
            }
            _ => auto,
        };

        fade.clamp(0.0, 1.0) as f32
    }
}
