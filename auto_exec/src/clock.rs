//! # Run clock
//!
//! All timing decisions of the autonomy system are made against a [`Clock`], giving the number of
//! seconds since the run started. The executive uses a [`RunClock`] on the system's monotonic
//! clock, while accelerated runs and tests use a [`ManualClock`] which only moves when told to.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    cell::Cell,
    time::{Duration, Instant},
};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A monotonic source of run time.
pub trait Clock {
    /// Number of seconds elapsed since the run started.
    fn elapsed_s(&self) -> f64;

    /// Block the caller for the given number of seconds.
    fn sleep(&self, duration_s: f64);
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Monotonic time since the clock was created. Changes to the wall clock do not affect it.
#[derive(Debug, Clone)]
pub struct RunClock {
    epoch: Instant,
}

/// A clock which only advances when [`ManualClock::advance`] or [`Clock::sleep`] is called.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_s: Cell<f64>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RunClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for RunClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for RunClock {
    fn elapsed_s(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    fn sleep(&self, duration_s: f64) {
        if duration_s > 0.0 {
            std::thread::sleep(Duration::from_secs_f64(duration_s));
        }
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current time.
    pub fn set(&self, now_s: f64) {
        self.now_s.set(now_s);
    }

    /// Move time forward by the given number of seconds.
    pub fn advance(&self, duration_s: f64) {
        self.now_s.set(self.now_s.get() + duration_s);
    }
}

impl Clock for ManualClock {
    fn elapsed_s(&self) -> f64 {
        self.now_s.get()
    }

    fn sleep(&self, duration_s: f64) {
        if duration_s > 0.0 {
            self.advance(duration_s);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new();
        assert_eq!(clock.elapsed_s(), 0.0);

        clock.advance(0.5);
        clock.sleep(0.25);
        assert_eq!(clock.elapsed_s(), 0.75);

        // Negative sleeps never move time backwards
        clock.sleep(-1.0);
        assert_eq!(clock.elapsed_s(), 0.75);

        clock.set(10.0);
        assert_eq!(clock.elapsed_s(), 10.0);
    }

    #[test]
    fn test_run_clock_monotonic() {
        let clock = RunClock::new();
        let a = clock.elapsed_s();
        assert!(a.is_finite());
        assert!(a >= 0.0);

        clock.sleep(0.01);
        let b = clock.elapsed_s();
        assert!(b >= a + 0.01);

        // Non-positive sleeps return straight away
        clock.sleep(0.0);
        clock.sleep(-1.0);
        assert!(clock.elapsed_s() >= b);
    }
}
