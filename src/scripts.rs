use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result};
use rhai::{Engine, AST};

use crate::debounce::Debounce;
use crate::scheduler::{IntervalHandle, TimeoutHandle, TimerScheduler};
use crate::throttle::Throttle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEventKind {
    Interval,
    Timeout,
    Debounce,
}

#[derive(Debug, Clone)]
pub struct TimerEvent {
    pub id: i64,
    pub name: String,
    pub kind: TimerEventKind,
}

impl fmt::Display for TimerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TimerEventKind::Interval => write!(f, "IntervalFired id={} name={}", self.id, self.name),
            TimerEventKind::Timeout => write!(f, "TimeoutFired id={} name={}", self.id, self.name),
            TimerEventKind::Debounce => write!(f, "DebounceFired id={} name={}", self.id, self.name),
        }
    }
}

pub struct ScriptTimers {
    scheduler: TimerScheduler,
    events: Rc<RefCell<Vec<TimerEvent>>>,
    next_id: i64,
    intervals: HashMap<i64, IntervalHandle>,
    timeouts: HashMap<i64, TimeoutHandle>,
    throttles: HashMap<String, Throttle>,
    debounces: HashMap<String, (i64, Debounce)>,
}

impl ScriptTimers {
    pub fn new(scheduler: TimerScheduler) -> Self {
        Self {
            scheduler,
            events: Rc::new(RefCell::new(Vec::new())),
            next_id: 1,
            intervals: HashMap::new(),
            timeouts: HashMap::new(),
            throttles: HashMap::new(),
            debounces: HashMap::new(),
        }
    }

    pub fn scheduler(&self) -> &TimerScheduler {
        &self.scheduler
    }

    pub fn update(&mut self) {
        self.scheduler.update();
        self.timeouts.retain(|_, timer| !timer.has_executed() && !timer.is_destroyed());
        self.intervals.retain(|_, timer| !timer.is_destroyed());
    }

    pub fn take_events(&mut self) -> Vec<TimerEvent> {
        self.events.borrow_mut().drain(..).collect()
    }

    pub fn active_handles(&self) -> usize {
        self.intervals.len() + self.timeouts.len()
    }

    fn alloc_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn push_event_on_fire(
        events: &Rc<RefCell<Vec<TimerEvent>>>,
        id: i64,
        name: String,
        kind: TimerEventKind,
    ) -> impl FnMut() + 'static {
        let events = events.clone();
        move || {
            events.borrow_mut().push(TimerEvent { id, name: name.clone(), kind });
        }
    }

    pub fn start_interval(&mut self, name: &str, period_ms: f64, immediate: bool) -> i64 {
        let id = self.alloc_id();
        let fire =
            Self::push_event_on_fire(&self.events, id, name.to_string(), TimerEventKind::Interval);
        let handle = if immediate {
            self.scheduler.interval_immediate(period_ms, fire)
        } else {
            self.scheduler.interval(period_ms, fire)
        };
        self.intervals.insert(id, handle);
        id
    }

    pub fn start_timeout(&mut self, name: &str, delay_ms: f64) -> i64 {
        let id = self.alloc_id();
        let fire =
            Self::push_event_on_fire(&self.events, id, name.to_string(), TimerEventKind::Timeout);
        let handle = self.scheduler.timeout(delay_ms, fire);
        self.timeouts.insert(id, handle);
        id
    }

    pub fn cancel(&mut self, id: i64) -> bool {
        if let Some(handle) = self.intervals.get(&id) {
            handle.destroy();
            true
        } else if let Some(handle) = self.timeouts.get(&id) {
            handle.destroy();
            true
        } else {
            false
        }
    }

    pub fn remaining_ms(&self, id: i64) -> f64 {
        if let Some(handle) = self.intervals.get(&id) {
            handle.remaining_ms()
        } else if let Some(handle) = self.timeouts.get(&id) {
            handle.remaining_ms()
        } else {
            0.0
        }
    }

    pub fn set_period_ms(&mut self, id: i64, period_ms: f64) -> bool {
        match self.intervals.get(&id) {
            Some(handle) => {
                handle.set_period_ms(period_ms);
                true
            }
            None => false,
        }
    }

    pub fn throttle_pass(&mut self, name: &str, window_ms: f64) -> bool {
        let clock = self.scheduler.clock();
        let gate = self
            .throttles
            .entry(name.to_string())
            .or_insert_with(|| Throttle::new(clock, window_ms));
        gate.set_window_ms(window_ms);
        gate.try_pass()
    }

    pub fn debounce(&mut self, name: &str, delay_ms: f64) {
        if !self.debounces.contains_key(name) {
            let id = self.alloc_id();
            let debounce = Debounce::new(self.scheduler.clone(), delay_ms);
            self.debounces.insert(name.to_string(), (id, debounce));
        }
        let (id, debounce) = self.debounces.get_mut(name).expect("debounce entry just ensured");
        debounce.set_delay_ms(delay_ms);
        let fire =
            Self::push_event_on_fire(&self.events, *id, name.to_string(), TimerEventKind::Debounce);
        debounce.schedule(fire);
    }
}

#[derive(Clone, Copy)]
pub struct ScriptTimerApi {
    timers: *mut ScriptTimers,
}

unsafe impl Send for ScriptTimerApi {}
unsafe impl Sync for ScriptTimerApi {}

impl ScriptTimerApi {
    pub fn new(timers: &mut ScriptTimers) -> Self {
        Self { timers }
    }

    fn timer_interval(&mut self, name: &str, period_ms: f64) -> rhai::INT {
        let timers = unsafe { &mut *self.timers };
        timers.start_interval(name, period_ms, false)
    }

    fn timer_interval_now(&mut self, name: &str, period_ms: f64) -> rhai::INT {
        let timers = unsafe { &mut *self.timers };
        timers.start_interval(name, period_ms, true)
    }

    fn timer_timeout(&mut self, name: &str, delay_ms: f64) -> rhai::INT {
        let timers = unsafe { &mut *self.timers };
        timers.start_timeout(name, delay_ms)
    }

    fn timer_cancel(&mut self, id: rhai::INT) -> bool {
        let timers = unsafe { &mut *self.timers };
        timers.cancel(id)
    }

    fn timer_remaining(&mut self, id: rhai::INT) -> f64 {
        let timers = unsafe { &mut *self.timers };
        timers.remaining_ms(id)
    }

    fn timer_set_period(&mut self, id: rhai::INT, period_ms: f64) -> bool {
        let timers = unsafe { &mut *self.timers };
        timers.set_period_ms(id, period_ms)
    }

    fn throttle_pass(&mut self, name: &str, window_ms: f64) -> bool {
        let timers = unsafe { &mut *self.timers };
        timers.throttle_pass(name, window_ms)
    }

    fn debounce(&mut self, name: &str, delay_ms: f64) {
        let timers = unsafe { &mut *self.timers };
        timers.debounce(name, delay_ms);
    }
}

pub fn register_timer_api(engine: &mut Engine) {
    engine.register_type_with_name::<ScriptTimerApi>("Timers");
    engine.register_fn("interval", ScriptTimerApi::timer_interval);
    engine.register_fn("interval_now", ScriptTimerApi::timer_interval_now);
    engine.register_fn("timeout", ScriptTimerApi::timer_timeout);
    engine.register_fn("cancel", ScriptTimerApi::timer_cancel);
    engine.register_fn("remaining_ms", ScriptTimerApi::timer_remaining);
    engine.register_fn("set_period", ScriptTimerApi::timer_set_period);
    engine.register_fn("throttle_pass", ScriptTimerApi::throttle_pass);
    engine.register_fn("debounce", ScriptTimerApi::debounce);
}

pub fn compile_script(engine: &Engine, path: impl AsRef<Path>) -> Result<AST> {
    let path = path.as_ref();
    let source = fs::read_to_string(path)
        .with_context(|| format!("Reading timer script {}", path.display()))?;
    engine.compile(source).with_context(|| "Compiling timer script")
}
