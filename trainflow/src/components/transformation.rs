//! Reference transformation: standardizes features and persists the scaler.

use super::dataset::Dataset;
use crate::config::RunConfig;
use crate::core::TransformOutput;
use crate::stages::Transform;
use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Per-feature standardization fitted on training data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl StandardScaler {
    /// Fits means and population standard deviations on `data`.
    ///
    /// Constant columns get a scale of 1 so they map to zero.
    ///
    /// # Errors
    ///
    /// Fails if `data` has no rows.
    #[allow(clippy::cast_precision_loss)]
    pub fn fit(data: &Dataset) -> anyhow::Result<Self> {
        ensure!(!data.is_empty(), "cannot fit a scaler on an empty dataset");
        let rows = data.len() as f64;
        let width = data.feature_count();

        let mut means = vec![0.0; width];
        for row in data.features() {
            for (mean, value) in means.iter_mut().zip(row) {
                *mean += value;
            }
        }
        for mean in &mut means {
            *mean /= rows;
        }

        let mut scales = vec![0.0; width];
        for row in data.features() {
            for ((scale, value), mean) in scales.iter_mut().zip(row).zip(&means) {
                *scale += (value - mean).powi(2);
            }
        }
        for scale in &mut scales {
            let std = (*scale / rows).sqrt();
            *scale = if std > f64::EPSILON { std } else { 1.0 };
        }

        Ok(Self { means, scales })
    }

    /// Applies the fitted transform to every feature row of `data`.
    ///
    /// # Errors
    ///
    /// Fails if `data` has a different feature count than the fit.
    pub fn transform(&self, data: &Dataset) -> anyhow::Result<Dataset> {
        ensure!(
            data.feature_count() == self.means.len(),
            "scaler was fitted on {} features, got {}",
            self.means.len(),
            data.feature_count()
        );
        let features = data
            .features()
            .iter()
            .map(|row| {
                row.iter()
                    .zip(self.means.iter().zip(&self.scales))
                    .map(|(value, (mean, scale))| (value - mean) / scale)
                    .collect()
            })
            .collect();
        Ok(data.with_features(features))
    }

    /// Returns the fitted means.
    #[must_use]
    pub fn means(&self) -> &[f64] {
        &self.means
    }

    /// Returns the fitted scales.
    #[must_use]
    pub fn scales(&self) -> &[f64] {
        &self.scales
    }
}

/// Fits a [`StandardScaler`] on the training split and applies it to both.
#[derive(Debug, Clone)]
pub struct DataTransformation {
    preprocessor_path: PathBuf,
}

impl DataTransformation {
    /// Creates the component, persisting the scaler at `preprocessor_path`.
    #[must_use]
    pub fn new(preprocessor_path: impl Into<PathBuf>) -> Self {
        Self {
            preprocessor_path: preprocessor_path.into(),
        }
    }

    /// Creates the component from a run configuration.
    #[must_use]
    pub fn from_run_config(config: &RunConfig) -> Self {
        Self::new(config.preprocessor_path())
    }
}

impl Transform for DataTransformation {
    type Dataset = Dataset;

    fn initiate(&self, train: &Path, test: &Path) -> anyhow::Result<TransformOutput<Dataset>> {
        let train = Dataset::read_csv(train)?;
        let test = Dataset::read_csv(test)?;

        let scaler = StandardScaler::fit(&train)?;
        let train = scaler.transform(&train)?;
        let test = scaler.transform(&test)?;

        let body = serde_json::to_string_pretty(&scaler)?;
        fs::write(&self.preprocessor_path, body).with_context(|| {
            format!(
                "failed to write preprocessor to {}",
                self.preprocessor_path.display()
            )
        })?;
        info!(
            path = %self.preprocessor_path.display(),
            features = scaler.means.len(),
            "Saved preprocessor"
        );

        Ok(TransformOutput::new(train, test, &self.preprocessor_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn data(rows: &[(f64, f64, f64)]) -> Dataset {
        Dataset::new(
            vec!["a".into(), "b".into(), "y".into()],
            rows.iter().map(|&(a, b, _)| vec![a, b]).collect(),
            rows.iter().map(|&(_, _, y)| y).collect(),
        )
    }

    #[test]
    fn test_fit_and_transform() {
        let train = data(&[(1.0, 5.0, 0.0), (3.0, 5.0, 1.0)]);
        let scaler = StandardScaler::fit(&train).unwrap();

        assert_eq!(scaler.means(), &[2.0, 5.0]);
        assert_eq!(scaler.scales(), &[1.0, 1.0]);

        let scaled = scaler.transform(&train).unwrap();
        assert_eq!(scaled.features(), &[vec![-1.0, 0.0], vec![1.0, 0.0]]);
        assert_eq!(scaled.targets(), train.targets());
    }

    #[test]
    fn test_transform_rejects_width_mismatch() {
        let scaler = StandardScaler::fit(&data(&[(1.0, 2.0, 3.0)])).unwrap();
        let narrow = Dataset::new(vec!["a".into(), "y".into()], vec![vec![1.0]], vec![1.0]);

        assert!(scaler.transform(&narrow).is_err());
    }

    #[test]
    fn test_fit_rejects_empty() {
        let empty = data(&[]);
        assert!(StandardScaler::fit(&empty).is_err());
    }

    #[test]
    fn test_initiate_persists_scaler() {
        let dir = tempfile::tempdir().unwrap();
        let train_path = dir.path().join("train.csv");
        let test_path = dir.path().join("test.csv");
        data(&[(0.0, 1.0, 1.0), (4.0, 3.0, 2.0)])
            .write_csv(&train_path)
            .unwrap();
        data(&[(2.0, 2.0, 1.5)]).write_csv(&test_path).unwrap();
        let preprocessor = dir.path().join("preprocessor");

        let output = DataTransformation::new(&preprocessor)
            .initiate(&train_path, &test_path)
            .unwrap();

        assert_eq!(output.preprocessor_path(), preprocessor.as_path());
        assert_eq!(output.test.features(), &[vec![0.0, 0.0]]);

        let saved: StandardScaler =
            serde_json::from_str(&fs::read_to_string(&preprocessor).unwrap()).unwrap();
        assert_eq!(saved.means(), &[2.0, 2.0]);
    }
}
