//! Run configuration.
//!
//! A [`RunConfig`] is the single source of truth for a pipeline run: where
//! artifacts go, which seed drives randomness and how data is split. It is
//! validated once by [`RunConfigBuilder::build`] and never mutated afterwards.

use crate::errors::ConfigError;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Default root for all output artifacts.
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";
/// File name of the persisted preprocessor inside the artifacts directory.
pub const PREPROCESSOR_FILE: &str = "preprocessor";
/// File name of the persisted model inside the artifacts directory.
pub const MODEL_FILE: &str = "model";
/// File name of the metrics record inside the artifacts directory.
pub const METRICS_FILE: &str = "metrics.json";
/// Default random seed.
pub const DEFAULT_SEED: u64 = 42;
/// Default fraction of rows held out for evaluation.
pub const DEFAULT_TEST_SIZE: f64 = 0.2;

/// Immutable configuration for one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunConfig {
    artifacts_dir: PathBuf,
    preprocessor_path: PathBuf,
    model_path: PathBuf,
    metrics_path: PathBuf,
    seed: u64,
    test_size: f64,
}

impl Default for RunConfig {
    fn default() -> Self {
        let artifacts_dir = PathBuf::from(DEFAULT_ARTIFACTS_DIR);
        Self {
            preprocessor_path: artifacts_dir.join(PREPROCESSOR_FILE),
            model_path: artifacts_dir.join(MODEL_FILE),
            metrics_path: artifacts_dir.join(METRICS_FILE),
            artifacts_dir,
            seed: DEFAULT_SEED,
            test_size: DEFAULT_TEST_SIZE,
        }
    }
}

impl RunConfig {
    /// Starts building a configuration from the defaults.
    #[must_use]
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder::new()
    }

    /// Returns the root directory for all output artifacts.
    #[must_use]
    pub fn artifacts_dir(&self) -> &Path {
        &self.artifacts_dir
    }

    /// Returns where the fitted preprocessor is persisted.
    #[must_use]
    pub fn preprocessor_path(&self) -> &Path {
        &self.preprocessor_path
    }

    /// Returns where the trained model is persisted.
    #[must_use]
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Returns where the metrics record is written.
    #[must_use]
    pub fn metrics_path(&self) -> &Path {
        &self.metrics_path
    }

    /// Returns the seed for all randomness sources.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns the fraction of rows held out for evaluation.
    #[must_use]
    pub fn test_size(&self) -> f64 {
        self.test_size
    }
}

/// Builder for [`RunConfig`].
///
/// Paths that are not set explicitly are derived from the artifacts
/// directory when [`build`](Self::build) runs.
#[derive(Debug, Clone, Default)]
pub struct RunConfigBuilder {
    artifacts_dir: Option<PathBuf>,
    preprocessor_path: Option<PathBuf>,
    model_path: Option<PathBuf>,
    metrics_path: Option<PathBuf>,
    seed: Option<u64>,
    test_size: Option<f64>,
}

impl RunConfigBuilder {
    /// Creates a builder with every field at its default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the artifacts directory.
    #[must_use]
    pub fn with_artifacts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = Some(dir.into());
        self
    }

    /// Overrides the preprocessor path.
    #[must_use]
    pub fn with_preprocessor_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.preprocessor_path = Some(path.into());
        self
    }

    /// Overrides the model path.
    #[must_use]
    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = Some(path.into());
        self
    }

    /// Overrides the metrics path.
    #[must_use]
    pub fn with_metrics_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.metrics_path = Some(path.into());
        self
    }

    /// Sets the random seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the test split ratio.
    #[must_use]
    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = Some(test_size);
        self
    }

    /// Validates and builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTestSize`] unless `test_size` lies
    /// strictly between 0 and 1.
    pub fn build(self) -> Result<RunConfig, ConfigError> {
        let test_size = self.test_size.unwrap_or(DEFAULT_TEST_SIZE);
        if !(test_size > 0.0 && test_size < 1.0) {
            return Err(ConfigError::InvalidTestSize(test_size));
        }

        let artifacts_dir = self
            .artifacts_dir
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ARTIFACTS_DIR));

        Ok(RunConfig {
            preprocessor_path: self
                .preprocessor_path
                .unwrap_or_else(|| artifacts_dir.join(PREPROCESSOR_FILE)),
            model_path: self
                .model_path
                .unwrap_or_else(|| artifacts_dir.join(MODEL_FILE)),
            metrics_path: self
                .metrics_path
                .unwrap_or_else(|| artifacts_dir.join(METRICS_FILE)),
            artifacts_dir,
            seed: self.seed.unwrap_or(DEFAULT_SEED),
            test_size,
        })
    }
}
