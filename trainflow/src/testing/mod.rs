//! Testing utilities for trainflow pipelines.
//!
//! This module provides:
//! - Stub collaborators for each stage
//! - A shared call log for asserting stage ordering
//! - Seed observations for asserting reproducibility

mod mocks;

pub use mocks::{
    call_log, CallLog, SeedObservation, StubDataset, StubIngestion, StubTrainer,
    StubTransformation,
};
