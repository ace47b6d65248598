//! Gain staging primitives.

/*
Gain Staging
============

Every key press becomes one voice, and each voice gets its own gain. The gain
decides how loud the sample plays and is the only thing the release ramp
changes afterwards.

Vocabulary
----------

  velocity      How hard the key was struck, normalized to 0.0 - 1.0.

  gain          A multiplier applied to amplitude.
                  gain = 1.0  →  unchanged (unity gain)
                  gain < 1.0  →  quieter (attenuation)
                  gain = 0.0  →  silence

  volume scale  A fixed headroom factor applied to every voice so that many
                overlapping voices do not overload the bus.


The Math: Velocity Curve
------------------------

Velocity is squared before scaling:

    gain = velocity² × volume_scale

Squaring gives a gentler response at soft velocities and matches how
loudness is perceived better than a straight line would:

    velocity 1.0  →  gain 0.300   (with volume_scale = 0.3)
    velocity 0.5  →  gain 0.075
    velocity 0.1  →  gain 0.003


Gain Curves
-----------

A release ramp changes gain every sample. The ramp is rendered into a buffer
of per-sample gains first, then multiplied into the voice's audio:

    Sample:  [ 0.8, -0.6,  0.9, -0.7, ...]
    Gains:   [0.30, 0.29, 0.28, 0.27, ...]
    Output:  [0.24, -0.17, 0.25, -0.19, ...]
*/

/// Gain for a voice struck at `velocity`.
///
/// Velocity is clamped to [0.0, 1.0] first.
#[inline]
pub fn velocity_gain(velocity: f32, volume_scale: f32) -> f32 {
    let velocity = velocity.clamp(0.0, 1.0);
    velocity * velocity * volume_scale
}

/// Multiply a signal by a constant gain factor (in-place).
#[inline]
pub fn apply_gain(signal: &mut [f32], gain: f32) {
    for sample in signal.iter_mut() {
        *sample *= gain;
    }
}

/// Multiply a signal by a per-sample gain curve (in-place).
#[inline]
pub fn multiply_in_place(signal: &mut [f32], gains: &[f32]) {
    debug_assert_eq!(signal.len(), gains.len());

    for (s, &g) in signal.iter_mut().zip(gains.iter()) {
        *s *= g;
    }
}
