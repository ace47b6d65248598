//! Summing and layering primitives.

/*
Summing and Layering
====================

Two kinds of "mixing" happen in this crate, and they share the same math.

  - The audio bus SUMS every playing voice into one buffer.
  - The key renderer LAYERS the colors of every presser on a key, weighting
    each layer by its fade.

Vocabulary
----------

  bus           The output buffer every voice is added into.

  summing       Adding signals at equal levels (no weighting). Can exceed the
                [-1.0, +1.0] range when several loud voices overlap.

  soft limit    A smooth curve (tanh) that squeezes peaks back under 1.0
                instead of hard-clipping them.

  over          Alpha compositing of one layer on top of what is below it.
                `alpha` is how opaque the upper layer is.

  screen        Accumulating coverage: two 50% layers cover 75%, not 100%.


The Math: Over
--------------

For a layer value L with opacity a on top of an existing value U:

    out = L × a + U × (1 - a)

This is a linear crossfade from U (a = 0) to L (a = 1), the same curve as a
dry/wet blend where U is "dry" and L is "wet".


The Math: Screen
----------------

Coverage accumulates without ever exceeding 1.0:

    acc' = acc + a × (1 - acc)

Applying layers in any order gives the same result, since
1 - acc' = (1 - acc)(1 - a) is a product.

    acc = 0.0, a = 0.5  →  0.5
    acc = 0.5, a = 0.5  →  0.75
    acc = 1.0, a = any  →  1.0


Clipping Risk
-------------

Summing two voices that each peak at 0.8 gives 1.6. The bus is soft-limited
only where it actually exceeds 1.0, so quiet passages are untouched.
*/

/// Add signal B into signal A in-place (summing).
///
/// ⚠️ WARNING: Can exceed [-1.0, +1.0] range!
#[inline]
pub fn sum_in_place(a: &mut [f32], b: &[f32]) {
    debug_assert_eq!(a.len(), b.len());

    for (sa, &sb) in a.iter_mut().zip(b.iter()) {
        *sa += sb;
    }
}

/// Squeeze samples outside [-1.0, +1.0] back into range with tanh.
///
/// Samples already in range pass through unchanged.
#[inline]
pub fn soft_limit_in_place(signal: &mut [f32]) {
    for s in signal.iter_mut() {
        if s.abs() > 1.0 {
            *s = s.tanh();
        }
    }
}

/// Composite `layer` over `under` with opacity `alpha`.
///
/// output = (layer × alpha) + (under × (1-alpha))
#[inline]
pub fn over(under: f32, layer: f32, alpha: f32) -> f32 {
    layer * alpha + under * (1.0 - alpha)
}

/// Accumulate coverage `alpha` into `acc` (screen-style).
#[inline]
pub fn screen(acc: f32, alpha: f32) -> f32 {
    acc + alpha * (1.0 - acc)
}
