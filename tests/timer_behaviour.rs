use std::cell::Cell;
use std::rc::Rc;

use tickwork::debounce::Debounce;
use tickwork::{ManualClock, Throttle, TimerConfig, TimerScheduler};

fn manual_scheduler() -> (Rc<ManualClock>, TimerScheduler) {
    let clock = Rc::new(ManualClock::new());
    let scheduler = TimerScheduler::with_clock(clock.clone());
    (clock, scheduler)
}

#[test]
fn interval_fire_count_is_cadence_independent() {
    let (clock, scheduler) = manual_scheduler();
    let fired = Rc::new(Cell::new(0));
    let counter = fired.clone();
    let _handle = scheduler.interval(50.0, move || counter.set(counter.get() + 1));

    // pump every 10ms for 500ms; only full 50ms periods may fire
    for _ in 0..50 {
        clock.advance_ms(10.0);
        scheduler.update();
    }
    assert_eq!(fired.get(), 10, "ten full periods elapsed, ten fires expected");
}

#[test]
fn sparse_pumps_fire_at_most_once_per_pump() {
    let (clock, scheduler) = manual_scheduler();
    let fired = Rc::new(Cell::new(0));
    let counter = fired.clone();
    let _handle = scheduler.interval(50.0, move || counter.set(counter.get() + 1));

    // a long stall does not burst-fire missed cycles; the next cycle starts
    // from the pump that woke the timer
    clock.advance_ms(500.0);
    scheduler.update();
    assert_eq!(fired.get(), 1, "a stalled pump wakes the cycle once");

    clock.advance_ms(50.0);
    scheduler.update();
    assert_eq!(fired.get(), 2);
}

#[test]
fn handles_survive_across_scheduler_clones() {
    let (clock, scheduler) = manual_scheduler();
    let fired = Rc::new(Cell::new(0));
    let counter = fired.clone();

    let clone = scheduler.clone();
    let handle = clone.interval(100.0, move || counter.set(counter.get() + 1));
    drop(clone);

    clock.advance_ms(100.0);
    scheduler.update();
    assert_eq!(fired.get(), 1, "clones share the same timer set");

    handle.destroy();
    clock.advance_ms(100.0);
    scheduler.update();
    assert_eq!(fired.get(), 1);
}

#[test]
fn independent_timers_with_equal_delays_both_fire() {
    let (clock, scheduler) = manual_scheduler();
    let first = Rc::new(Cell::new(false));
    let second = Rc::new(Cell::new(false));
    let flag_a = first.clone();
    let flag_b = second.clone();
    let _a = scheduler.timeout(100.0, move || flag_a.set(true));
    let _b = scheduler.timeout(100.0, move || flag_b.set(true));

    clock.advance_ms(100.0);
    scheduler.update();
    assert!(first.get() && second.get(), "no cross-handle interference");
}

#[test]
fn debounced_input_fires_after_the_quiet_period() {
    let (clock, scheduler) = manual_scheduler();
    let mut debounce = Debounce::new(scheduler.clone(), 40.0);
    let saves = Rc::new(Cell::new(0));

    // a burst of "file changed" notifications, one save at the end
    for _ in 0..5 {
        let counter = saves.clone();
        debounce.schedule(move || counter.set(counter.get() + 1));
        clock.advance_ms(10.0);
        scheduler.update();
    }
    assert_eq!(saves.get(), 0, "burst still inside the quiet window");

    clock.advance_ms(40.0);
    scheduler.update();
    assert_eq!(saves.get(), 1, "one trailing save for the whole burst");
}

#[test]
fn throttled_and_scheduled_work_share_one_clock() {
    let (clock, scheduler) = manual_scheduler();
    let mut gate = Throttle::new(scheduler.clock(), 100.0);
    let ticks = Rc::new(Cell::new(0));
    let counter = ticks.clone();
    let _heartbeat = scheduler.interval(50.0, move || counter.set(counter.get() + 1));

    let mut passes = 0;
    for _ in 0..6 {
        clock.advance_ms(50.0);
        scheduler.update();
        if gate.try_pass() {
            passes += 1;
        }
    }
    assert_eq!(ticks.get(), 6, "heartbeat fires every pump");
    assert_eq!(passes, 3, "throttle lets one pass per 100ms window");
}

#[test]
fn scheduler_accepts_a_custom_config() {
    let clock = Rc::new(ManualClock::new());
    let config = TimerConfig { warn_budget_ms: 100.0, log_lifecycle: true };
    let scheduler = TimerScheduler::with_config(clock.clone(), config);

    let fired = Rc::new(Cell::new(false));
    let flag = fired.clone();
    let _handle = scheduler.timeout(10.0, move || flag.set(true));
    clock.advance_ms(10.0);
    scheduler.update();
    assert!(fired.get());
}
