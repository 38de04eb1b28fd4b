//! Error types for the trainflow pipeline.
//!
//! Collaborator failures cross the stage seam as [`anyhow::Error`] and are
//! translated into a [`DiagnosticError`] that records where the failure
//! surfaced. The orchestrator reports the failure taxonomy through
//! [`PipelineError`], so callers can tell configuration problems, stage
//! failures and persistence failures apart without string matching.

use crate::core::StageKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::Location;
use std::path::PathBuf;
use thiserror::Error;

/// A point in the source code where a failure surfaced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Source file path as reported by the compiler.
    pub file: String,
    /// One-based line number.
    pub line: u32,
}

impl SourceLocation {
    /// Creates a new source location.
    #[must_use]
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// Returns the location of the caller.
    #[must_use]
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self::new(location.file(), location.line())
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// A failure wrapped with the location it surfaced at.
///
/// The original failure is kept as the error source, so it stays reachable
/// through [`std::error::Error::source`], [`DiagnosticError::original_cause`]
/// and [`DiagnosticError::downcast_ref`].
///
/// Translating never logs; reporting is left to whoever handles the error.
#[derive(Debug)]
pub struct DiagnosticError {
    location: Option<SourceLocation>,
    message: String,
    cause: anyhow::Error,
}

impl DiagnosticError {
    /// Wraps `cause`, recording the caller's source location.
    ///
    /// If `cause` already is a `DiagnosticError` it is returned unchanged and
    /// keeps the location it was first captured at.
    #[must_use]
    #[track_caller]
    pub fn capture(cause: impl Into<anyhow::Error>) -> Self {
        Self::build(Some(SourceLocation::caller()), cause.into())
    }

    /// Wraps `cause` with an explicit source location.
    #[must_use]
    pub fn at(location: SourceLocation, cause: impl Into<anyhow::Error>) -> Self {
        Self::build(Some(location), cause.into())
    }

    /// Wraps `cause` when no failure context is available.
    ///
    /// The rendered message degrades to `error message [<message>]`.
    #[must_use]
    pub fn detached(cause: impl Into<anyhow::Error>) -> Self {
        Self::build(None, cause.into())
    }

    fn build(location: Option<SourceLocation>, cause: anyhow::Error) -> Self {
        // Only the outermost error may pass through: a by-value downcast also
        // matches beneath `.context(..)` layers and would drop them.
        let outermost = cause
            .chain()
            .next()
            .is_some_and(|err| err.downcast_ref::<Self>().is_some());
        let cause = if outermost {
            match cause.downcast::<Self>() {
                Ok(existing) => return existing,
                Err(cause) => cause,
            }
        } else {
            cause
        };

        Self {
            location,
            message: cause.to_string(),
            cause,
        }
    }

    /// Returns the location the failure surfaced at, if known.
    #[must_use]
    pub fn location(&self) -> Option<&SourceLocation> {
        self.location.as_ref()
    }

    /// Returns the source file the failure surfaced in, if known.
    #[must_use]
    pub fn source_file(&self) -> Option<&str> {
        self.location.as_ref().map(|loc| loc.file.as_str())
    }

    /// Returns the line number the failure surfaced at, if known.
    #[must_use]
    pub fn line_number(&self) -> Option<u32> {
        self.location.as_ref().map(|loc| loc.line)
    }

    /// Returns the original failure's message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the original failure.
    #[must_use]
    pub fn original_cause(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        &*self.cause
    }

    /// Attempts to view the original failure as a concrete error type.
    #[must_use]
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        self.cause.downcast_ref::<E>()
    }

    /// Consumes the diagnostic and returns the original failure.
    #[must_use]
    pub fn into_cause(self) -> anyhow::Error {
        self.cause
    }

    /// Converts to a JSON representation for event payloads.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "source_location": self.source_file(),
            "line_number": self.line_number(),
            "message": self.message,
            "diagnostic": self.to_string(),
        })
    }
}

impl fmt::Display for DiagnosticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(loc) => write!(
                f,
                "Error occurred in script [{}] line number [{}] error message [{}]",
                loc.file, loc.line, self.message
            ),
            None => write!(f, "error message [{}]", self.message),
        }
    }
}

impl std::error::Error for DiagnosticError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.cause)
    }
}

/// Extension trait translating any failing result into a [`DiagnosticError`].
pub trait Diagnose<T> {
    /// Wraps the error with the caller's source location.
    fn diagnose(self) -> Result<T, DiagnosticError>;
}

impl<T, E> Diagnose<T> for Result<T, E>
where
    E: Into<anyhow::Error>,
{
    #[track_caller]
    fn diagnose(self) -> Result<T, DiagnosticError> {
        match self {
            Ok(value) => Ok(value),
            Err(err) => Err(DiagnosticError::capture(err)),
        }
    }
}

/// Error raised when a run configuration is invalid or unusable.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The test split ratio is outside the open interval (0, 1).
    #[error("test_size must be strictly between 0 and 1, got {0}")]
    InvalidTestSize(f64),

    /// The artifacts path exists but is not a directory.
    #[error("artifacts path '{}' exists and is not a directory", path.display())]
    NotADirectory {
        /// The offending path.
        path: PathBuf,
    },

    /// The artifacts directory could not be created.
    #[error("cannot create artifacts directory '{}': {source}", path.display())]
    CreateDir {
        /// The directory that could not be created.
        path: PathBuf,
        /// The underlying IO failure.
        #[source]
        source: std::io::Error,
    },
}

/// The main error type for pipeline runs.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The run configuration is invalid or unusable.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A stage collaborator failed.
    #[error("{stage} stage failed: {source}")]
    Stage {
        /// The stage that failed.
        stage: StageKind,
        /// The translated failure.
        #[source]
        source: DiagnosticError,
    },

    /// The metrics record could not be written.
    #[error("metrics persistence failed: {0}")]
    Persistence(#[source] DiagnosticError),
}

impl PipelineError {
    /// Returns the diagnostic carried by stage and persistence failures.
    #[must_use]
    pub fn diagnostic(&self) -> Option<&DiagnosticError> {
        match self {
            Self::Config(_) => None,
            Self::Stage { source, .. } | Self::Persistence(source) => Some(source),
        }
    }

    /// Returns the failed stage, if the failure came from a collaborator.
    #[must_use]
    pub fn stage(&self) -> Option<StageKind> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context as _;
    use std::error::Error as _;
    use std::io;

    #[test]
    fn test_diagnostic_message_with_location() {
        let err = DiagnosticError::at(
            SourceLocation::new("foo.py", 10),
            io::Error::new(io::ErrorKind::Other, "boom"),
        );

        assert_eq!(
            err.to_string(),
            "Error occurred in script [foo.py] line number [10] error message [boom]"
        );
        assert_eq!(err.source_file(), Some("foo.py"));
        assert_eq!(err.line_number(), Some(10));
        assert_eq!(err.message(), "boom");
    }

    #[test]
    fn test_diagnostic_keeps_original_cause() {
        let err = DiagnosticError::at(
            SourceLocation::new("foo.py", 10),
            io::Error::new(io::ErrorKind::InvalidData, "boom"),
        );

        let original = err.downcast_ref::<io::Error>().unwrap();
        assert_eq!(original.kind(), io::ErrorKind::InvalidData);
        assert_eq!(original.to_string(), "boom");

        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "boom");
        assert!(source.downcast_ref::<io::Error>().is_some());
        assert_eq!(err.original_cause().to_string(), "boom");

        let cause = err.into_cause();
        assert_eq!(
            cause.downcast::<io::Error>().unwrap().kind(),
            io::ErrorKind::InvalidData
        );
    }

    #[test]
    fn test_detached_diagnostic() {
        let err = DiagnosticError::detached(anyhow::anyhow!("x"));

        assert_eq!(err.to_string(), "error message [x]");
        assert!(err.location().is_none());
        assert!(err.line_number().is_none());
    }

    #[test]
    fn test_capture_records_call_site() {
        let line = line!() + 1;
        let err = DiagnosticError::capture(anyhow::anyhow!("boom"));

        assert_eq!(err.line_number(), Some(line));
        assert!(err.source_file().unwrap().ends_with("errors.rs"));
        assert!(err.to_string().ends_with("error message [boom]"));
    }

    #[test]
    fn test_capture_does_not_double_wrap() {
        let inner = DiagnosticError::at(SourceLocation::new("inner.rs", 3), anyhow::anyhow!("boom"));
        let outer = DiagnosticError::capture(inner);

        assert_eq!(outer.source_file(), Some("inner.rs"));
        assert_eq!(outer.line_number(), Some(3));
        assert_eq!(outer.message(), "boom");
    }

    #[test]
    fn test_capture_keeps_context_added_over_diagnostic() {
        let inner = DiagnosticError::at(
            SourceLocation::new("inner.rs", 3),
            anyhow::anyhow!("inner failure"),
        );
        let result: anyhow::Result<()> =
            Err(anyhow::Error::new(inner)).context("loading train split failed");

        let line = line!() + 1;
        let err = result.diagnose().unwrap_err();

        assert_eq!(err.line_number(), Some(line));
        assert_eq!(err.message(), "loading train split failed");
        let chain: Vec<String> = std::iter::successors(err.source(), |&e| e.source())
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            chain,
            vec![
                "loading train split failed".to_string(),
                "Error occurred in script [inner.rs] line number [3] error message [inner failure]"
                    .to_string(),
                "inner failure".to_string(),
            ]
        );
        assert_eq!(
            err.downcast_ref::<DiagnosticError>().unwrap().source_file(),
            Some("inner.rs")
        );
    }

    #[test]
    fn test_diagnose_extension() {
        let result: Result<(), io::Error> = Err(io::Error::new(io::ErrorKind::NotFound, "missing"));
        let line = line!() + 1;
        let err = result.diagnose().unwrap_err();

        assert_eq!(err.line_number(), Some(line));
        assert_eq!(err.message(), "missing");
        assert!(err.downcast_ref::<io::Error>().is_some());
    }

    #[test]
    fn test_diagnostic_to_json() {
        let err = DiagnosticError::at(SourceLocation::new("foo.py", 10), anyhow::anyhow!("boom"));
        let json = err.to_json();

        assert_eq!(json["source_location"], "foo.py");
        assert_eq!(json["line_number"], 10);
        assert_eq!(json["message"], "boom");
    }

    #[test]
    fn test_pipeline_error_accessors() {
        let err = PipelineError::Stage {
            stage: StageKind::Training,
            source: DiagnosticError::detached(anyhow::anyhow!("diverged")),
        };

        assert_eq!(err.stage(), Some(StageKind::Training));
        assert_eq!(err.diagnostic().unwrap().message(), "diverged");
        assert_eq!(
            err.to_string(),
            "training stage failed: error message [diverged]"
        );

        let config = PipelineError::from(ConfigError::InvalidTestSize(1.5));
        assert!(config.diagnostic().is_none());
        assert!(config.stage().is_none());
        assert!(config.to_string().contains("1.5"));
    }
}
