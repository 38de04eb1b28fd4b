//! Pipeline orchestration and execution.
//!
//! This module provides:
//! - The three-stage training orchestrator
//! - Metrics record persistence

mod orchestrator;
mod persist;

pub use orchestrator::TrainPipeline;
pub use persist::{load_metrics, persist_metrics, PersistError};
