//! Pipeline state and stage kind enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The stage collaborators a training pipeline sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Loads raw data and produces train/test dataset locators.
    Ingestion,
    /// Fits the preprocessor and produces model-ready datasets.
    Transformation,
    /// Fits and evaluates the model, producing metrics.
    Training,
}

impl StageKind {
    /// All stages in execution order.
    pub const ALL: [Self; 3] = [Self::Ingestion, Self::Transformation, Self::Training];

    /// Returns the pipeline state entered while this stage runs.
    #[must_use]
    pub const fn state(self) -> PipelineState {
        match self {
            Self::Ingestion => PipelineState::Ingesting,
            Self::Transformation => PipelineState::Transforming,
            Self::Training => PipelineState::Training,
        }
    }

    /// Returns the stage's position in the pipeline, starting at one.
    #[must_use]
    pub const fn step(self) -> usize {
        match self {
            Self::Ingestion => 1,
            Self::Transformation => 2,
            Self::Training => 3,
        }
    }

    /// Returns the stable lowercase name of the stage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ingestion => "ingestion",
            Self::Transformation => "transformation",
            Self::Training => "training",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The lifecycle state of a pipeline run.
///
/// A run moves strictly forward through the happy path
/// `Initialized -> Ingesting -> Transforming -> Training -> Persisting ->
/// Completed`. `Failed` is reachable from every non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    /// Collaborators are bound and the artifacts directory exists.
    Initialized,
    /// The ingestion stage is running.
    Ingesting,
    /// The transformation stage is running.
    Transforming,
    /// The training stage is running.
    Training,
    /// Metrics are being written.
    Persisting,
    /// The run finished successfully.
    Completed,
    /// The run failed.
    Failed,
}

impl Default for PipelineState {
    fn default() -> Self {
        Self::Initialized
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initialized => write!(f, "initialized"),
            Self::Ingesting => write!(f, "ingesting"),
            Self::Transforming => write!(f, "transforming"),
            Self::Training => write!(f, "training"),
            Self::Persisting => write!(f, "persisting"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl PipelineState {
    /// Returns true if the state represents a terminal state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Returns the next state on the happy path, if any.
    #[must_use]
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Initialized => Some(Self::Ingesting),
            Self::Ingesting => Some(Self::Transforming),
            Self::Transforming => Some(Self::Training),
            Self::Training => Some(Self::Persisting),
            Self::Persisting => Some(Self::Completed),
            Self::Completed | Self::Failed => None,
        }
    }

    /// Returns true if moving from `self` to `target` is a legal transition.
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        target == Self::Failed || self.next() == Some(target)
    }
}
