//! Monotonic time sources.
//!
//! Every timestamp in the engine is a millisecond count from an arbitrary
//! epoch. Only differences between timestamps are ever used.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Supplies "now" to the engine.
/// Implementations: [`SystemClock`] (production), [`ManualClock`] (testing).
pub trait Clock {
    /// Current time in milliseconds.
    fn now_ms(&self) -> f64;
}

/// Wall clock backed by [`Instant`], measured from construction.
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

/// Clock that only moves when told to.
///
/// Share it with `Rc` to keep a handle while the engine owns another.
#[derive(Debug, Default)]
pub struct ManualClock {
    current_ms: Cell<f64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::starting_at(0.0)
    }

    pub fn starting_at(ms: f64) -> Self {
        Self {
            current_ms: Cell::new(ms),
        }
    }

    pub fn set(&self, ms: f64) {
        self.current_ms.set(ms);
    }

    pub fn advance(&self, delta_ms: f64) {
        self.current_ms.set(self.current_ms.get() + delta_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.current_ms.get()
    }
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now_ms(&self) -> f64 {
        (**self).now_ms()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> f64 {
        (**self).now_ms()
    }
}
