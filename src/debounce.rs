use std::cell::RefCell;
use std::rc::Rc;

use crate::scheduler::{TimeoutHandle, TimerScheduler};

type Callback = Box<dyn FnMut()>;

pub struct Debounce {
    scheduler: TimerScheduler,
    delay_ms: f64,
    pending: Option<Pending>,
}

struct Pending {
    timer: TimeoutHandle,
    // shared with the timeout closure; taken by whichever side fires first
    slot: Rc<RefCell<Option<Callback>>>,
}

impl Debounce {
    pub fn new(scheduler: TimerScheduler, delay_ms: f64) -> Self {
        Self { scheduler, delay_ms, pending: None }
    }

    pub fn schedule(&mut self, callback: impl FnMut() + 'static) {
        self.clear();
        let slot: Rc<RefCell<Option<Callback>>> = Rc::new(RefCell::new(Some(Box::new(callback))));
        let fire_slot = slot.clone();
        let timer = self.scheduler.timeout(self.delay_ms, move || {
            let callback = fire_slot.borrow_mut().take();
            if let Some(mut callback) = callback {
                callback();
            }
        });
        self.pending = Some(Pending { timer, slot });
    }

    pub fn clear(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.timer.destroy();
            pending.slot.borrow_mut().take();
        }
    }

    pub fn flush(&mut self) {
        let Some(pending) = self.pending.take() else { return };
        pending.timer.destroy();
        let callback = pending.slot.borrow_mut().take();
        if let Some(mut callback) = callback {
            callback();
        }
    }

    pub fn is_scheduled(&self) -> bool {
        self.pending
            .as_ref()
            .map_or(false, |pending| !pending.timer.has_executed() && !pending.timer.is_destroyed())
    }

    pub fn remaining_ms(&self) -> Option<f64> {
        let pending = self.pending.as_ref()?;
        if pending.timer.has_executed() || pending.timer.is_destroyed() {
            return None;
        }
        Some(pending.timer.remaining_ms())
    }

    pub fn delay_ms(&self) -> f64 {
        self.delay_ms
    }

    pub fn set_delay_ms(&mut self, delay_ms: f64) {
        self.delay_ms = delay_ms;
    }
}
