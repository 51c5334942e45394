use std::rc::Rc;

use crate::clock::{Clock, TIME_EPSILON};

pub struct Throttle {
    clock: Rc<dyn Clock>,
    window: f64,
    last_pass: Option<f64>,
    locked: bool,
}

impl Throttle {
    pub fn new(clock: Rc<dyn Clock>, window_ms: f64) -> Self {
        Self { clock, window: window_ms / 1_000.0, last_pass: None, locked: false }
    }

    pub fn can_pass(&self) -> bool {
        if self.locked {
            return false;
        }
        match self.last_pass {
            None => true,
            Some(last) => self.clock.now_seconds() - last >= self.window - TIME_EPSILON,
        }
    }

    pub fn try_pass(&mut self) -> bool {
        if !self.can_pass() {
            return false;
        }
        self.last_pass = Some(self.clock.now_seconds());
        true
    }

    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn last_pass_seconds(&self) -> Option<f64> {
        self.last_pass
    }

    pub fn reset_last_pass(&mut self) {
        self.last_pass = None;
    }

    pub fn window_ms(&self) -> f64 {
        self.window * 1_000.0
    }

    pub fn set_window_ms(&mut self, window_ms: f64) {
        self.window = window_ms / 1_000.0;
    }

    pub fn wrap(clock: Rc<dyn Clock>, window_ms: f64, mut f: impl FnMut()) -> impl FnMut() {
        let mut gate = Throttle::new(clock, window_ms);
        move || {
            if gate.try_pass() {
                f();
            }
        }
    }
}
