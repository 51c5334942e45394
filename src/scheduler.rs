use std::cell::RefCell;
use std::rc::Rc;

use crate::clock::{Clock, SystemClock, TIME_EPSILON};
use crate::config::TimerConfig;

type Callback = Box<dyn FnMut()>;

struct IntervalState {
    // period for cycles not yet started; the in-flight cycle keeps cycle_period
    period: f64,
    cycle_period: f64,
    cycle_start: Option<f64>,
    destroyed: bool,
    immediate: bool,
    callback: Option<Callback>,
}

struct TimeoutState {
    delay: f64,
    start: Option<f64>,
    executed: bool,
    destroyed: bool,
    callback: Option<Callback>,
}

struct SchedulerInner {
    config: TimerConfig,
    intervals: Vec<Rc<RefCell<IntervalState>>>,
    timeouts: Vec<Rc<RefCell<TimeoutState>>>,
}

#[derive(Clone)]
pub struct TimerScheduler {
    clock: Rc<dyn Clock>,
    inner: Rc<RefCell<SchedulerInner>>,
}

impl TimerScheduler {
    pub fn new() -> Self {
        Self::with_clock(Rc::new(SystemClock::new()))
    }

    pub fn with_clock(clock: Rc<dyn Clock>) -> Self {
        Self::with_config(clock, TimerConfig::default())
    }

    pub fn with_config(clock: Rc<dyn Clock>, config: TimerConfig) -> Self {
        Self {
            clock,
            inner: Rc::new(RefCell::new(SchedulerInner {
                config,
                intervals: Vec::new(),
                timeouts: Vec::new(),
            })),
        }
    }

    pub fn clock(&self) -> Rc<dyn Clock> {
        self.clock.clone()
    }

    pub fn interval(&self, period_ms: f64, callback: impl FnMut() + 'static) -> IntervalHandle {
        self.spawn_interval(period_ms, false, Box::new(callback))
    }

    pub fn interval_immediate(&self, period_ms: f64, callback: impl FnMut() + 'static) -> IntervalHandle {
        self.spawn_interval(period_ms, true, Box::new(callback))
    }

    pub fn timeout(&self, delay_ms: f64, callback: impl FnMut() + 'static) -> TimeoutHandle {
        self.spawn_timeout(delay_ms, Some(Box::new(callback)))
    }

    pub fn sleep(&self, delay_ms: f64) -> TimeoutHandle {
        self.spawn_timeout(delay_ms, None)
    }

    pub fn active_timers(&self) -> usize {
        let inner = self.inner.borrow();
        inner.intervals.len() + inner.timeouts.len()
    }

    pub fn update(&self) {
        let now = self.clock.now_seconds();
        let (timeouts, intervals) = {
            let inner = self.inner.borrow();
            (inner.timeouts.clone(), inner.intervals.clone())
        };

        for state in &timeouts {
            let callback = {
                let mut timeout = state.borrow_mut();
                if timeout.destroyed {
                    timeout.start = None;
                    timeout.callback = None;
                    continue;
                }
                let Some(start) = timeout.start else { continue };
                if now - start < timeout.delay - TIME_EPSILON {
                    continue;
                }
                timeout.start = None;
                timeout.executed = true;
                timeout.callback.take()
            };
            if let Some(mut callback) = callback {
                callback();
            }
        }

        for state in &intervals {
            let fire_immediate = {
                let mut interval = state.borrow_mut();
                if interval.destroyed {
                    interval.cycle_start = None;
                    false
                } else if interval.immediate {
                    interval.immediate = false;
                    true
                } else {
                    false
                }
            };
            if fire_immediate {
                Self::invoke_interval(state);
            }

            let due = {
                let interval = state.borrow();
                !interval.destroyed
                    && matches!(interval.cycle_start, Some(start) if now - start >= interval.cycle_period - TIME_EPSILON)
            };
            if due {
                state.borrow_mut().cycle_start = None;
                Self::invoke_interval(state);
                let mut interval = state.borrow_mut();
                if !interval.destroyed {
                    interval.cycle_start = Some(now);
                    interval.cycle_period = interval.period;
                }
            }
        }

        let mut inner = self.inner.borrow_mut();
        inner.timeouts.retain(|state| {
            let timeout = state.borrow();
            !timeout.destroyed && !timeout.executed
        });
        inner.intervals.retain(|state| !state.borrow().destroyed);

        let spent_ms = (self.clock.now_seconds() - now) * 1_000.0;
        if spent_ms > inner.config.warn_budget_ms {
            eprintln!(
                "[timers] update took {spent_ms:.2}ms (budget {:.2}ms)",
                inner.config.warn_budget_ms
            );
        }
    }

    fn invoke_interval(state: &Rc<RefCell<IntervalState>>) {
        // callback is taken out so it can call back into its own handle
        let callback = state.borrow_mut().callback.take();
        if let Some(mut callback) = callback {
            callback();
            state.borrow_mut().callback = Some(callback);
        }
    }

    fn spawn_interval(&self, period_ms: f64, immediate: bool, callback: Callback) -> IntervalHandle {
        let period = period_ms / 1_000.0;
        let state = Rc::new(RefCell::new(IntervalState {
            period,
            cycle_period: period,
            cycle_start: Some(self.clock.now_seconds()),
            destroyed: false,
            immediate,
            callback: Some(callback),
        }));
        let mut inner = self.inner.borrow_mut();
        if inner.config.log_lifecycle {
            println!("[timers] interval created period={period_ms}ms immediate={immediate}");
        }
        inner.intervals.push(state.clone());
        IntervalHandle { state, clock: self.clock.clone() }
    }

    fn spawn_timeout(&self, delay_ms: f64, callback: Option<Callback>) -> TimeoutHandle {
        let state = Rc::new(RefCell::new(TimeoutState {
            delay: delay_ms / 1_000.0,
            start: Some(self.clock.now_seconds()),
            executed: false,
            destroyed: false,
            callback,
        }));
        let mut inner = self.inner.borrow_mut();
        if inner.config.log_lifecycle {
            println!("[timers] timeout created delay={delay_ms}ms");
        }
        inner.timeouts.push(state.clone());
        TimeoutHandle { state, clock: self.clock.clone() }
    }
}

impl Default for TimerScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub struct IntervalHandle {
    state: Rc<RefCell<IntervalState>>,
    clock: Rc<dyn Clock>,
}

impl IntervalHandle {
    pub fn remaining_ms(&self) -> f64 {
        let interval = self.state.borrow();
        match interval.cycle_start {
            Some(start) if !interval.destroyed => {
                let elapsed = self.clock.now_seconds() - start;
                ((interval.cycle_period - elapsed) * 1_000.0).max(0.0)
            }
            _ => 0.0,
        }
    }

    pub fn period_ms(&self) -> f64 {
        self.state.borrow().period * 1_000.0
    }

    pub fn set_period_ms(&self, period_ms: f64) {
        self.state.borrow_mut().period = period_ms / 1_000.0;
    }

    pub fn destroy(&self) {
        let mut interval = self.state.borrow_mut();
        interval.destroyed = true;
        interval.cycle_start = None;
    }

    pub fn is_destroyed(&self) -> bool {
        self.state.borrow().destroyed
    }
}

#[derive(Clone)]
pub struct TimeoutHandle {
    state: Rc<RefCell<TimeoutState>>,
    clock: Rc<dyn Clock>,
}

impl TimeoutHandle {
    pub fn remaining_ms(&self) -> f64 {
        let timeout = self.state.borrow();
        match timeout.start {
            Some(start) if !timeout.destroyed => {
                let elapsed = self.clock.now_seconds() - start;
                ((timeout.delay - elapsed) * 1_000.0).max(0.0)
            }
            _ => 0.0,
        }
    }

    pub fn delay_ms(&self) -> f64 {
        self.state.borrow().delay * 1_000.0
    }

    pub fn has_executed(&self) -> bool {
        self.state.borrow().executed
    }

    pub fn destroy(&self) {
        let mut timeout = self.state.borrow_mut();
        if timeout.executed {
            // the callback already ran; nothing left to cancel
            return;
        }
        timeout.destroyed = true;
        timeout.start = None;
        timeout.callback = None;
    }

    pub fn is_destroyed(&self) -> bool {
        self.state.borrow().destroyed
    }
}
