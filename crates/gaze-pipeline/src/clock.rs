//! Time source used for paced capture and dwell timing.
//!
//! Live sessions use [`SystemClock`]. Tests and simulated runs use
//! [`ManualClock`], where `sleep` advances time instantly.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

pub trait Clock {
    /// Current monotonic instant.
    fn now(&self) -> Instant;

    /// Block for `duration` (or pretend to).
    fn sleep(&self, duration: Duration);
}

/// Real monotonic time and real `thread::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Manually driven clock. `sleep` returns at once and moves time forward.
#[derive(Debug)]
pub struct ManualClock {
    instant: Mutex<Instant>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            instant: Mutex::new(Instant::now()),
        }
    }

    pub fn advance(&self, duration: Duration) {
        let mut inst = self.instant.lock().unwrap_or_else(PoisonError::into_inner);
        *inst += duration;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.instant.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}
