//! Outputs handed from one stage to the next.
//!
//! The orchestrator treats these as opaque: it moves them between
//! collaborators and only ever inspects the final [`Metrics`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Metric name to value, ordered by name.
pub type Metrics = BTreeMap<String, f64>;

/// The output of the ingestion stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionOutput {
    /// Location of the training split.
    pub train_path: PathBuf,
    /// Location of the test split.
    pub test_path: PathBuf,
    /// Optional auxiliary metadata about the ingested data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl IngestionOutput {
    /// Creates an ingestion output without metadata.
    #[must_use]
    pub fn new(train_path: impl Into<PathBuf>, test_path: impl Into<PathBuf>) -> Self {
        Self {
            train_path: train_path.into(),
            test_path: test_path.into(),
            metadata: None,
        }
    }

    /// Attaches auxiliary metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// The output of the transformation stage.
///
/// `D` is the transformed dataset handle understood by the trainer.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformOutput<D> {
    /// Transformed training split.
    pub train: D,
    /// Transformed test split.
    pub test: D,
    /// Where the fitted preprocessor was persisted.
    pub preprocessor_path: PathBuf,
}

impl<D> TransformOutput<D> {
    /// Creates a transformation output.
    #[must_use]
    pub fn new(train: D, test: D, preprocessor_path: impl Into<PathBuf>) -> Self {
        Self {
            train,
            test,
            preprocessor_path: preprocessor_path.into(),
        }
    }

    /// Returns the preprocessor location.
    #[must_use]
    pub fn preprocessor_path(&self) -> &Path {
        &self.preprocessor_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingestion_output_metadata() {
        let output = IngestionOutput::new("train.csv", "test.csv")
            .with_metadata(serde_json::json!({"rows": 10}));

        assert_eq!(output.train_path, PathBuf::from("train.csv"));
        assert_eq!(output.metadata, Some(serde_json::json!({"rows": 10})));
    }

    #[test]
    fn test_ingestion_output_skips_empty_metadata() {
        let output = IngestionOutput::new("a.csv", "b.csv");
        let json = serde_json::to_value(&output).unwrap();

        assert!(json.get("metadata").is_none());
    }

    #[test]
    fn test_metrics_iterate_in_name_order() {
        let mut metrics = Metrics::new();
        metrics.insert("rmse".to_string(), 1.0);
        metrics.insert("mae".to_string(), 0.5);
        metrics.insert("r2".to_string(), 0.9);

        let names: Vec<&str> = metrics.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["mae", "r2", "rmse"]);
    }
}
