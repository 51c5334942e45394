use std::collections::HashMap;
use std::rc::Rc;

use crate::clock::{Clock, SystemClock};
use crate::units::format_duration;

#[derive(Clone, Debug)]
pub struct BenchSummary {
    pub name: String,
    pub last_seconds: f64,
    pub average_seconds: f64,
    pub max_seconds: f64,
    pub samples: u64,
}

#[derive(Default)]
struct BenchTiming {
    last_seconds: f64,
    total_seconds: f64,
    max_seconds: f64,
    samples: u64,
}

pub struct BenchRegistry {
    clock: Rc<dyn Clock>,
    running: HashMap<String, f64>,
    timings: HashMap<String, BenchTiming>,
}

impl BenchRegistry {
    pub fn new() -> Self {
        Self::with_clock(Rc::new(SystemClock::new()))
    }

    pub fn with_clock(clock: Rc<dyn Clock>) -> Self {
        Self { clock, running: HashMap::new(), timings: HashMap::new() }
    }

    // Double-start is a programmer error, not a recoverable condition.
    pub fn start(&mut self, id: &str) {
        let now = self.clock.now_seconds();
        if self.running.insert(id.to_string(), now).is_some() {
            panic!("[bench] benchmark '{id}' is already running");
        }
    }

    pub fn stop(&mut self, id: &str) -> f64 {
        let Some(started) = self.running.remove(id) else {
            panic!("[bench] benchmark '{id}' was never started");
        };
        let elapsed = self.clock.now_seconds() - started;
        self.record(id, elapsed);
        elapsed
    }

    pub fn is_running(&self, id: &str) -> bool {
        self.running.contains_key(id)
    }

    pub fn scope(&mut self, name: &str) -> BenchScope<'_> {
        let start = self.clock.now_seconds();
        BenchScope { name: name.to_string(), registry: self, start }
    }

    pub fn measure<R>(&mut self, id: &str, f: impl FnOnce() -> R) -> R {
        let _scope = self.scope(id);
        f()
    }

    fn record(&mut self, name: &str, elapsed_seconds: f64) {
        let entry = self.timings.entry(name.to_string()).or_default();
        entry.last_seconds = elapsed_seconds;
        entry.max_seconds = entry.max_seconds.max(elapsed_seconds);
        entry.total_seconds += elapsed_seconds;
        entry.samples += 1;
    }

    pub fn summaries(&self) -> Vec<BenchSummary> {
        let mut out = Vec::with_capacity(self.timings.len());
        for (name, timing) in &self.timings {
            let average = if timing.samples == 0 {
                0.0
            } else {
                timing.total_seconds / timing.samples as f64
            };
            out.push(BenchSummary {
                name: name.clone(),
                last_seconds: timing.last_seconds,
                average_seconds: average,
                max_seconds: timing.max_seconds,
                samples: timing.samples,
            });
        }
        out.sort_by(|a, b| {
            b.last_seconds.partial_cmp(&a.last_seconds).unwrap_or(std::cmp::Ordering::Equal)
        });
        out
    }

    pub fn report(&self) -> String {
        let mut lines = Vec::new();
        for summary in self.summaries() {
            lines.push(format!(
                "[bench] {} last={} avg={} max={} samples={}",
                summary.name,
                format_duration(summary.last_seconds),
                format_duration(summary.average_seconds),
                format_duration(summary.max_seconds),
                summary.samples
            ));
        }
        lines.join("\n")
    }
}

impl Default for BenchRegistry {
    fn default() -> Self {
        Self::new()
    }
}

pub struct BenchScope<'a> {
    name: String,
    registry: &'a mut BenchRegistry,
    start: f64,
}

impl<'a> Drop for BenchScope<'a> {
    fn drop(&mut self) {
        let elapsed = self.registry.clock.now_seconds() - self.start;
        self.registry.record(&self.name, elapsed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn manual_registry() -> (Rc<ManualClock>, BenchRegistry) {
        let clock = Rc::new(ManualClock::new());
        let registry = BenchRegistry::with_clock(clock.clone());
        (clock, registry)
    }

    #[test]
    fn start_stop_measures_elapsed_time() {
        let (clock, mut registry) = manual_registry();
        registry.start("load");
        clock.advance_ms(125.0);
        let elapsed = registry.stop("load");
        assert!((elapsed - 0.125).abs() < 1e-9);
        assert!(!registry.is_running("load"));
    }

    #[test]
    #[should_panic(expected = "already running")]
    fn double_start_panics() {
        let (_clock, mut registry) = manual_registry();
        registry.start("load");
        registry.start("load");
    }

    #[test]
    #[should_panic(expected = "never started")]
    fn stop_without_start_panics() {
        let (_clock, mut registry) = manual_registry();
        registry.stop("load");
    }

    #[test]
    fn restart_after_stop_is_allowed() {
        let (clock, mut registry) = manual_registry();
        registry.start("frame");
        clock.advance_ms(10.0);
        registry.stop("frame");
        registry.start("frame");
        clock.advance_ms(20.0);
        let elapsed = registry.stop("frame");
        assert!((elapsed - 0.02).abs() < 1e-9);
    }

    #[test]
    fn scope_records_on_drop() {
        let (clock, mut registry) = manual_registry();
        {
            let _scope = registry.scope("physics");
            clock.advance_ms(3.0);
        }
        let summaries = registry.summaries();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].name, "physics");
        assert_eq!(summaries[0].samples, 1);
        assert!((summaries[0].last_seconds - 0.003).abs() < 1e-9);
    }

    #[test]
    fn summaries_track_average_and_max() {
        let (clock, mut registry) = manual_registry();
        for ms in [10.0, 30.0, 20.0] {
            registry.start("tick");
            clock.advance_ms(ms);
            registry.stop("tick");
        }
        let summary = &registry.summaries()[0];
        assert_eq!(summary.samples, 3);
        assert!((summary.average_seconds - 0.02).abs() < 1e-9);
        assert!((summary.max_seconds - 0.03).abs() < 1e-9);
        assert!((summary.last_seconds - 0.02).abs() < 1e-9);
    }

    #[test]
    fn summaries_sort_by_last_duration() {
        let (clock, mut registry) = manual_registry();
        registry.measure("fast", || clock.advance_ms(1.0));
        registry.measure("slow", || clock.advance_ms(50.0));
        let summaries = registry.summaries();
        assert_eq!(summaries[0].name, "slow");
        assert_eq!(summaries[1].name, "fast");
    }

    #[test]
    fn report_uses_unit_aware_formatting() {
        let (clock, mut registry) = manual_registry();
        registry.start("save");
        clock.advance_ms(1.25);
        registry.stop("save");
        let report = registry.report();
        assert!(report.contains("save"), "report should name the benchmark: {report}");
        assert!(report.contains("1.25ms"), "report should format with units: {report}");
    }

    #[test]
    fn independent_registries_do_not_share_state() {
        let (_clock, mut a) = manual_registry();
        let (_clock_b, mut b) = manual_registry();
        a.start("job");
        assert!(!b.is_running("job"), "registries are isolated sessions");
        b.start("job");
        a.stop("job");
        b.stop("job");
    }
}
