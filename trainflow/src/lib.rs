//! # Trainflow
//!
//! A three-stage model training orchestrator.
//!
//! Trainflow runs ingestion, transformation and training in strict sequence,
//! seeds every randomness source before the first stage, and persists the
//! trainer's metrics as a JSON run record. Failures are translated into
//! errors that carry the source location where they were observed.
//!
//! - **Pluggable stages**: collaborators implement [`stages::Ingest`],
//!   [`stages::Transform`] and [`stages::Train`]
//! - **Reproducible runs**: [`seeding`] resets the run generator from the
//!   configured seed
//! - **Event-driven observability**: the orchestrator reports progress to an
//!   injected [`events::EventSink`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use trainflow::prelude::*;
//!
//! let config = RunConfig::builder().with_seed(7).build()?;
//! let mut pipeline = TrainPipeline::initialize(
//!     config.clone(),
//!     DataIngestion::new(IngestionConfig::from_run_config(&config)),
//!     DataTransformation::from_run_config(&config),
//!     ModelTrainer::from_run_config(&config),
//! )?;
//!
//! let result = pipeline.run()?;
//! println!("{:?}", result.metrics());
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod components;
pub mod config;
pub mod core;
pub mod errors;
pub mod events;
pub mod observability;
pub mod pipeline;
pub mod seeding;
pub mod stages;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::components::{
        DataIngestion, DataTransformation, Dataset, IngestionConfig, ModelTrainer,
    };
    pub use crate::config::{RunConfig, RunConfigBuilder};
    pub use crate::core::{
        IngestionOutput, Metrics, PipelineState, RunResult, StageKind, TransformOutput,
    };
    pub use crate::errors::{
        ConfigError, Diagnose, DiagnosticError, PipelineError, SourceLocation,
    };
    pub use crate::events::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::pipeline::{load_metrics, persist_metrics, TrainPipeline};
    pub use crate::seeding::seed_everything;
    pub use crate::stages::{Ingest, Train, Transform};
}
