//! Stage collaborator traits.
//!
//! The orchestrator depends on three capabilities, one per stage. Each is a
//! single blocking entry point; errors of any type cross the seam as
//! [`anyhow::Error`] and are translated by the orchestrator.

use crate::core::{IngestionOutput, Metrics, TransformOutput};
use std::path::Path;
use std::sync::Arc;

/// Loads raw data and splits it into train and test datasets.
pub trait Ingest {
    /// Runs ingestion using the collaborator's own configuration.
    ///
    /// # Returns
    ///
    /// Locators for the train and test splits, plus optional metadata.
    fn initiate(&self) -> anyhow::Result<IngestionOutput>;
}

/// Fits a preprocessor and produces model-ready datasets.
pub trait Transform {
    /// The transformed dataset handle passed on to the trainer.
    type Dataset;

    /// Transforms the splits found at `train` and `test`.
    ///
    /// # Returns
    ///
    /// The transformed splits and the location of the persisted preprocessor.
    fn initiate(&self, train: &Path, test: &Path) -> anyhow::Result<TransformOutput<Self::Dataset>>;
}

/// Fits and evaluates a model.
pub trait Train {
    /// The transformed dataset handle this trainer consumes.
    type Dataset;

    /// Trains on `train`, evaluates on `test` and reports metrics.
    fn initiate(&self, train: &Self::Dataset, test: &Self::Dataset) -> anyhow::Result<Metrics>;
}

impl<T: Ingest + ?Sized> Ingest for Arc<T> {
    fn initiate(&self) -> anyhow::Result<IngestionOutput> {
        (**self).initiate()
    }
}

impl<T: Ingest + ?Sized> Ingest for Box<T> {
    fn initiate(&self) -> anyhow::Result<IngestionOutput> {
        (**self).initiate()
    }
}

impl<T: Transform + ?Sized> Transform for Arc<T> {
    type Dataset = T::Dataset;

    fn initiate(&self, train: &Path, test: &Path) -> anyhow::Result<TransformOutput<Self::Dataset>> {
        (**self).initiate(train, test)
    }
}

impl<T: Transform + ?Sized> Transform for Box<T> {
    type Dataset = T::Dataset;

    fn initiate(&self, train: &Path, test: &Path) -> anyhow::Result<TransformOutput<Self::Dataset>> {
        (**self).initiate(train, test)
    }
}

impl<T: Train + ?Sized> Train for Arc<T> {
    type Dataset = T::Dataset;

    fn initiate(&self, train: &Self::Dataset, test: &Self::Dataset) -> anyhow::Result<Metrics> {
        (**self).initiate(train, test)
    }
}

impl<T: Train + ?Sized> Train for Box<T> {
    type Dataset = T::Dataset;

    fn initiate(&self, train: &Self::Dataset, test: &Self::Dataset) -> anyhow::Result<Metrics> {
        (**self).initiate(train, test)
    }
}
