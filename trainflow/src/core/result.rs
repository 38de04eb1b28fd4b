//! The structured result of a successful run.

use super::{Metrics, StageKind};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Summary of a completed pipeline run.
///
/// Built once when the run completes and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunResult {
    run_id: Uuid,
    started_at: DateTime<Utc>,
    metrics: Metrics,
    preprocessor_path: PathBuf,
    elapsed_seconds: f64,
    stage_timings: BTreeMap<StageKind, f64>,
}

impl RunResult {
    pub(crate) fn new(
        run_id: Uuid,
        started_at: DateTime<Utc>,
        metrics: Metrics,
        preprocessor_path: PathBuf,
        elapsed_seconds: f64,
        stage_timings: BTreeMap<StageKind, f64>,
    ) -> Self {
        Self {
            run_id,
            started_at,
            metrics,
            preprocessor_path,
            elapsed_seconds,
            stage_timings,
        }
    }

    /// Returns the unique ID of the run.
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Returns when the run started.
    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Returns the metrics reported by the trainer.
    #[must_use]
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Returns where the fitted preprocessor was persisted.
    #[must_use]
    pub fn preprocessor_path(&self) -> &Path {
        &self.preprocessor_path
    }

    /// Returns the wall-clock duration from seeding to metrics persistence.
    #[must_use]
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_seconds
    }

    /// Returns the wall-clock duration of each stage in seconds.
    #[must_use]
    pub fn stage_timings(&self) -> &BTreeMap<StageKind, f64> {
        &self.stage_timings
    }

    /// Consumes the result, returning the metrics.
    #[must_use]
    pub fn into_metrics(self) -> Metrics {
        self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_result_serialization() {
        let mut metrics = Metrics::new();
        metrics.insert("rmse".to_string(), 1.23);
        let mut timings = BTreeMap::new();
        timings.insert(StageKind::Ingestion, 0.5);

        let result = RunResult::new(
            Uuid::new_v4(),
            Utc::now(),
            metrics,
            PathBuf::from("artifacts/preprocessor"),
            1.5,
            timings,
        );

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["metrics"]["rmse"], 1.23);
        assert_eq!(json["preprocessor_path"], "artifacts/preprocessor");
        assert_eq!(json["stage_timings"]["ingestion"], 0.5);
        assert_eq!(json["elapsed_seconds"], 1.5);
    }
}
