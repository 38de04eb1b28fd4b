//! Wall-clock timing for runs and stages.

use crate::core::StageKind;
use std::collections::BTreeMap;
use std::time::Instant;

/// Simple span timing helper.
#[derive(Debug)]
pub struct SpanTimer {
    start: Instant,
    name: String,
}

impl SpanTimer {
    /// Starts a new span timer.
    #[must_use]
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            name: name.into(),
        }
    }

    /// Returns the elapsed time in seconds.
    #[must_use]
    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    /// Returns the elapsed time in milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_secs() * 1000.0
    }

    /// Returns the span name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Finishes the span and returns the duration in seconds.
    #[must_use]
    pub fn finish(self) -> f64 {
        self.elapsed_secs()
    }
}

/// Per-stage durations collected over one run.
#[derive(Debug, Clone, Default)]
pub struct StageTimings {
    durations: BTreeMap<StageKind, f64>,
}

impl StageTimings {
    /// Creates an empty timing table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the duration of a stage, replacing any earlier value.
    pub fn record(&mut self, stage: StageKind, seconds: f64) {
        self.durations.insert(stage, seconds);
    }

    /// Returns the recorded duration of a stage.
    #[must_use]
    pub fn get(&self, stage: StageKind) -> Option<f64> {
        self.durations.get(&stage).copied()
    }

    /// Returns the sum of all recorded durations.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.durations.values().sum()
    }

    /// Consumes the table, returning the durations keyed by stage.
    #[must_use]
    pub fn into_inner(self) -> BTreeMap<StageKind, f64> {
        self.durations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_timer() {
        let timer = SpanTimer::start("test_span");
        std::thread::sleep(std::time::Duration::from_millis(10));
        assert_eq!(timer.name(), "test_span");
        assert!(timer.elapsed_ms() >= 10.0);
        assert!(timer.finish() >= 0.01);
    }

    #[test]
    fn test_stage_timings() {
        let mut timings = StageTimings::new();
        timings.record(StageKind::Ingestion, 0.25);
        timings.record(StageKind::Training, 0.5);

        assert_eq!(timings.get(StageKind::Ingestion), Some(0.25));
        assert_eq!(timings.get(StageKind::Transformation), None);
        assert!((timings.total() - 0.75).abs() < f64::EPSILON);

        let inner = timings.into_inner();
        assert_eq!(inner.keys().copied().collect::<Vec<_>>(), vec![StageKind::Ingestion, StageKind::Training]);
    }
}
