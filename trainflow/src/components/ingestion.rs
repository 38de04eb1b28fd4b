//! Reference ingestion: reads a CSV source and writes seeded train/test splits.

use super::dataset::Dataset;
use crate::config::RunConfig;
use crate::core::IngestionOutput;
use crate::seeding;
use crate::stages::Ingest;
use anyhow::Context;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming the source dataset.
pub const DATASET_ENV: &str = "TRAINFLOW_DATASET";

/// Source dataset used when [`DATASET_ENV`] is unset.
pub const DEFAULT_DATASET_PATH: &str = "data/dataset.csv";

/// Where ingestion reads from and writes to.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestionConfig {
    /// Source CSV file.
    pub source_path: PathBuf,
    /// Unmodified copy of the source.
    pub raw_path: PathBuf,
    /// Training split.
    pub train_path: PathBuf,
    /// Test split.
    pub test_path: PathBuf,
    /// Fraction of rows held out for testing.
    pub test_size: f64,
}

impl IngestionConfig {
    /// Lays out the split files under `artifacts_dir`.
    #[must_use]
    pub fn new(source_path: impl Into<PathBuf>, artifacts_dir: &Path, test_size: f64) -> Self {
        Self {
            source_path: source_path.into(),
            raw_path: artifacts_dir.join("raw.csv"),
            train_path: artifacts_dir.join("train.csv"),
            test_path: artifacts_dir.join("test.csv"),
            test_size,
        }
    }

    /// Derives the layout from a run configuration.
    ///
    /// The source is taken from [`DATASET_ENV`], falling back to
    /// [`DEFAULT_DATASET_PATH`].
    #[must_use]
    pub fn from_run_config(config: &RunConfig) -> Self {
        let source = std::env::var_os(DATASET_ENV)
            .map_or_else(|| PathBuf::from(DEFAULT_DATASET_PATH), PathBuf::from);
        Self::new(source, config.artifacts_dir(), config.test_size())
    }
}

/// Reads the source dataset and produces shuffled train/test files.
#[derive(Debug, Clone)]
pub struct DataIngestion {
    config: IngestionConfig,
}

impl DataIngestion {
    /// Creates the component.
    #[must_use]
    pub fn new(config: IngestionConfig) -> Self {
        Self { config }
    }

    /// Returns the component's layout.
    #[must_use]
    pub fn config(&self) -> &IngestionConfig {
        &self.config
    }
}

impl Ingest for DataIngestion {
    fn initiate(&self) -> anyhow::Result<IngestionOutput> {
        let cfg = &self.config;
        info!(source = %cfg.source_path.display(), "Reading source dataset");

        let data = Dataset::read_csv(&cfg.source_path)?;
        data.write_csv(&cfg.raw_path)
            .context("failed to write raw copy of the source dataset")?;

        let (train, test) = seeding::with_rng(|rng| data.split(cfg.test_size, rng))?;
        train.write_csv(&cfg.train_path)?;
        test.write_csv(&cfg.test_path)?;

        debug!(
            rows = data.len(),
            train_rows = train.len(),
            test_rows = test.len(),
            "Split dataset"
        );

        Ok(
            IngestionOutput::new(&cfg.train_path, &cfg.test_path).with_metadata(json!({
                "source": cfg.source_path,
                "raw_path": cfg.raw_path,
                "rows": data.len(),
                "train_rows": train.len(),
                "test_rows": test.len(),
                "columns": data.columns(),
            })),
        )
    }
}
