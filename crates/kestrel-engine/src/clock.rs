//! Time sources for the scheduler's throttle.
//!
//! The scheduler is handed wall-clock deltas by its host, but measures how
//! long its own ticking took through a [`Clock`] so tests can drive the
//! throttle without sleeping.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Monotonic time source.
pub trait Clock: Send {
    /// Time elapsed since an arbitrary fixed origin.
    fn now(&self) -> Duration;
}

/// [`Instant`]-backed clock.
#[derive(Clone, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// A clock whose origin is now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-driven clock. Clones share the same time.
///
/// Besides explicit [`ManualClock::advance`], an auto-step makes every
/// [`Clock::now`] read move time forward, which is how tests model a
/// tick loop that is slower than the display.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
    auto_step: Arc<AtomicU64>,
}

impl ManualClock {
    /// A clock at time zero with no auto-step.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward.
    pub fn advance(&self, by: Duration) {
        self.nanos.fetch_add(by.as_nanos() as u64, Ordering::SeqCst);
    }

    /// Advance by `step` after every read. Zero disables.
    pub fn set_auto_step(&self, step: Duration) {
        self.auto_step
            .store(step.as_nanos() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        let step = self.auto_step.load(Ordering::SeqCst);
        Duration::from_nanos(self.nanos.fetch_add(step, Ordering::SeqCst))
    }
}
