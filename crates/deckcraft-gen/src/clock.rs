//! Time source for pacing and deadlines
//!
//! The pipeline never calls `Instant::now` or `thread::sleep` directly, so a
//! run can be driven by a [`ManualClock`] in tests.

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Source of the current time and of waits
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    /// Wait for `duration`. Only the calling request's thread is suspended.
    fn sleep(&self, duration: Duration);
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// A clock that only moves when told to. `sleep` advances it instantly.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    elapsed: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut elapsed = self.elapsed.lock().unwrap_or_else(|e| e.into_inner());
        *elapsed += by;
    }

    /// Total time advanced since creation
    pub fn elapsed(&self) -> Duration {
        *self.elapsed.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}

/// A point in time after which a pipeline run stops starting new work
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    /// `None` when the budget reaches past what `Instant` can represent
    at: Option<Instant>,
}

impl Deadline {
    pub fn after(clock: &dyn Clock, budget: Duration) -> Self {
        Self {
            at: clock.now().checked_add(budget),
        }
    }

    pub fn remaining(&self, clock: &dyn Clock) -> Duration {
        match self.at {
            Some(at) => at.saturating_duration_since(clock.now()),
            None => Duration::MAX,
        }
    }

    pub fn is_expired(&self, clock: &dyn Clock) -> bool {
        self.remaining(clock).is_zero()
    }

    /// Shorten a per-call timeout so it cannot outlive the deadline
    pub fn clamp(&self, clock: &dyn Clock, timeout: Duration) -> Duration {
        timeout.min(self.remaining(clock))
    }
}
