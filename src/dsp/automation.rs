use crate::MIN_TIME_MS;

/*
Release Automation
==================

A voice plays at a constant gain until its key is released. Release does not
cut the sound; it schedules a short hold followed by a straight-line fade to
near silence. This module describes that fade twice:

  - `ReleaseShape::level_at` answers "what is the gain N ms after release?"
    in closed form. The voice manager uses it for bookkeeping.
  - `GainAutomation` walks the same curve one sample at a time on the audio
    thread.

Vocabulary
----------

  hold        Time after release during which the gain stays where it was.
              Gives the release a moment to land on a clean sample boundary.

  ramp        The linear fade from the held gain down to the floor.

  floor       "Effectively silent". The ramp ends slightly above zero; the
              voice is torn down shortly after anyway.

  settled     The ramp has finished and the gain sits at the floor.


The Shape
---------

  Gain
    g ──────────────┐
                    │╲
                    │  ╲
                    │    ╲
                    │      ╲
  floor             │        ╲──────────
        ──────────────────────────────────→ Time
       playing   release  hold   ramp    settled
                    ↑       ↑      ↑
                    0     hold   hold+ramp   (ms since release)

With the default 50 ms hold and 300 ms ramp, the gain reaches the floor
350 ms after the release call.


The State Machine
-----------------

    ┌────────┐ release ┌──────┐ hold done ┌──────┐ ramp done ┌─────────┐
    │ Steady │ ──────→ │ Hold │ ────────→ │ Ramp │ ────────→ │ Settled │
    └────────┘         └──────┘           └──────┘           └─────────┘

A second release while already releasing is ignored: the first ramp wins.


Implementation Notes
--------------------

Like the ADSR release, we snapshot the starting level and the total sample
counts at release time, then interpolate. Interpolating from a snapshot lands
exactly on the floor instead of accumulating rounding drift.
*/

/// Hold-then-ramp release curve, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReleaseShape {
    /// Time the gain is held at its current value
    pub hold_ms: f64,
    /// Duration of the linear ramp that follows the hold
    pub ramp_ms: f64,
    /// Gain at the end of the ramp
    pub floor: f32,
}

impl ReleaseShape {
    pub fn new(hold_ms: f64, ramp_ms: f64, floor: f32) -> Self {
        Self {
            hold_ms: hold_ms.max(0.0),
            ramp_ms: ramp_ms.max(MIN_TIME_MS),
            floor: floor.max(0.0),
        }
    }

    /// Total time from release until the gain settles on the floor.
    pub fn total_ms(&self) -> f64 {
        self.hold_ms + self.ramp_ms
    }

    /// Gain `elapsed_ms` after a release that started at gain `start`.
    pub fn level_at(&self, start: f32, elapsed_ms: f64) -> f32 {
        if elapsed_ms <= self.hold_ms {
            return start;
        }
        let progress = (elapsed_ms - self.hold_ms) / self.ramp_ms;
        if progress >= 1.0 {
            return self.floor;
        }
        start + (self.floor - start) * progress as f32
    }
}

/// Where the automation currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutomationStage {
    Steady,  // Playing at the struck gain
    Hold,    // Released, holding before the ramp
    Ramp,    // Fading linearly toward the floor
    Settled, // Sitting on the floor
}

/// Per-sample gain automation for one voice.
pub struct GainAutomation {
    stage: AutomationStage,
    level: f32,

    // Release bookkeeping (snapshotted at release time)
    ramp_start_level: f32,
    floor: f32,
    hold_samples: u32,
    ramp_samples: u32,
    elapsed_samples: u32,
}

impl GainAutomation {
    pub fn new(gain: f32) -> Self {
        Self {
            stage: AutomationStage::Steady,
            level: gain,
            ramp_start_level: gain,
            floor: gain,
            hold_samples: 0,
            ramp_samples: 1,
            elapsed_samples: 0,
        }
    }

    /// Begin the release from the current level.
    pub fn release(&mut self, shape: &ReleaseShape, sample_rate: f32) {
        if self.stage != AutomationStage::Steady {
            return;
        }

        let samples_per_ms = sample_rate as f64 / 1000.0;
        self.ramp_start_level = self.level;
        self.floor = shape.floor;
        self.hold_samples = (shape.hold_ms * samples_per_ms).round() as u32;
        self.ramp_samples = (shape.ramp_ms * samples_per_ms).round().max(1.0) as u32;
        self.elapsed_samples = 0;
        self.stage = AutomationStage::Hold;
    }

    /// Advance the automation by one sample.
    pub fn next_sample(&mut self) -> f32 {
        match self.stage {
            AutomationStage::Steady | AutomationStage::Settled => {}

            AutomationStage::Hold => {
                if self.elapsed_samples >= self.hold_samples {
                    self.elapsed_samples = 0;
                    self.stage = AutomationStage::Ramp;
                } else {
                    self.elapsed_samples += 1;
                }
            }

            AutomationStage::Ramp => {
                // level = start + (floor - start) * elapsed/total
                self.elapsed_samples = self.elapsed_samples.saturating_add(1);
                let progress = self.elapsed_samples as f32 / self.ramp_samples as f32;
                self.level =
                    self.ramp_start_level + (self.floor - self.ramp_start_level) * progress;

                if self.elapsed_samples >= self.ramp_samples {
                    self.level = self.floor;
                    self.stage = AutomationStage::Settled;
                }
            }
        }

        self.level
    }

    /// Render a block of per-sample gains into the buffer.
    pub fn render(&mut self, gains: &mut [f32]) {
        for gain in gains.iter_mut() {
            *gain = self.next_sample();
        }
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn stage(&self) -> AutomationStage {
        self.stage
    }
}
