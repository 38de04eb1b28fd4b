//! Core domain model types for trainflow.
//!
//! This module contains the fundamental types shared by the orchestrator and
//! the stage collaborators:
//! - Pipeline state and stage kind enums
//! - Outputs passed between stages
//! - The structured run result

mod output;
mod result;
mod status;

pub use output::{IngestionOutput, Metrics, TransformOutput};
pub use result::RunResult;
pub use status::{PipelineState, StageKind};
