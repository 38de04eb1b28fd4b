//! Reference stage collaborators.
//!
//! Small numeric implementations of the three stages so the binary can train
//! on a headed CSV file whose last column is the regression target:
//! - [`DataIngestion`] splits the source into train/test files
//! - [`DataTransformation`] standardizes features
//! - [`ModelTrainer`] fits a linear model by gradient descent

mod dataset;
mod ingestion;
mod trainer;
mod transformation;

pub use dataset::{Dataset, DatasetError};
pub use ingestion::{DataIngestion, IngestionConfig, DATASET_ENV, DEFAULT_DATASET_PATH};
pub use trainer::{evaluate, LinearModel, ModelTrainer, DEFAULT_EPOCHS, DEFAULT_LEARNING_RATE};
pub use transformation::{DataTransformation, StandardScaler};
