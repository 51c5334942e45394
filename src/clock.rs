use std::cell::Cell;
use std::time::Instant;

// Slack for elapsed-time comparisons: f64 second arithmetic can land a few
// ulps short of an exact boundary, and the contract only promises
// millisecond resolution.
pub(crate) const TIME_EPSILON: f64 = 1e-9;

pub trait Clock {
    fn now_seconds(&self) -> f64;
}

pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_seconds(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::starting_at(0.0)
    }

    pub fn starting_at(seconds: f64) -> Self {
        Self { now: Cell::new(seconds) }
    }

    pub fn set_seconds(&self, seconds: f64) {
        self.now.set(seconds);
    }

    pub fn advance_seconds(&self, seconds: f64) {
        self.now.set(self.now.get() + seconds);
    }

    pub fn advance_ms(&self, ms: f64) {
        self.advance_seconds(ms / 1_000.0);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now_seconds(&self) -> f64 {
        self.now.get()
    }
}
