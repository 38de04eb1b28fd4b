//! Event sink system for observability.
//!
//! The orchestrator receives its logging capability as an
//! [`EventSink`] instead of reaching into process-wide state. The binary
//! wires in a [`LoggingEventSink`]; tests use a [`CollectingEventSink`].

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};

/// Event emitted when a run begins.
pub const PIPELINE_STARTED: &str = "pipeline.started";
/// Event emitted when a run completes.
pub const PIPELINE_COMPLETED: &str = "pipeline.completed";
/// Event emitted when a run fails.
pub const PIPELINE_FAILED: &str = "pipeline.failed";
/// Event emitted before a stage collaborator is invoked.
pub const STAGE_STARTED: &str = "stage.started";
/// Event emitted after a stage collaborator returns successfully.
pub const STAGE_COMPLETED: &str = "stage.completed";
/// Event emitted when a stage collaborator fails.
pub const STAGE_FAILED: &str = "stage.failed";
/// Event emitted once the metrics record is written.
pub const METRICS_PERSISTED: &str = "metrics.persisted";
