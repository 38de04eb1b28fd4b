//! Metrics record persistence.
//!
//! The metrics record is the canonical output of a run: one flat JSON object
//! of metric name to number, pretty-printed with two-space indentation.
//! Writes go to a temporary sibling first and are renamed into place, so a
//! failed write never leaves a partial record and never touches an existing
//! one.

use crate::core::Metrics;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while reading or writing a metrics record.
#[derive(Debug, Error)]
pub enum PersistError {
    /// A metric value has no JSON representation.
    #[error("metric '{name}' is not a finite number: {value}")]
    NonFinite {
        /// The metric name.
        name: String,
        /// The offending value.
        value: f64,
    },

    /// The metrics path has no file name component.
    #[error("metrics path '{}' does not name a file", path.display())]
    InvalidPath {
        /// The offending path.
        path: PathBuf,
    },

    /// Reading or writing the record failed.
    #[error("IO error on '{}': {source}", path.display())]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying IO failure.
        #[source]
        source: io::Error,
    },

    /// The record could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Writes `metrics` to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns an error if a value is not finite or the file cannot be written.
/// On error any existing file at `path` is left untouched.
pub fn persist_metrics(path: &Path, metrics: &Metrics) -> Result<(), PersistError> {
    if let Some((name, value)) = metrics.iter().find(|(_, v)| !v.is_finite()) {
        return Err(PersistError::NonFinite {
            name: name.clone(),
            value: *value,
        });
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| PersistError::InvalidPath {
            path: path.to_path_buf(),
        })?
        .to_string_lossy();
    let tmp_path = path.with_file_name(format!(".{file_name}.tmp"));
    let body = serde_json::to_string_pretty(metrics)?;

    if let Err(source) = write_synced(&tmp_path, body.as_bytes()) {
        let _ = fs::remove_file(&tmp_path);
        return Err(PersistError::Io {
            path: tmp_path,
            source,
        });
    }

    fs::rename(&tmp_path, path).map_err(|source| {
        let _ = fs::remove_file(&tmp_path);
        PersistError::Io {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Reads a metrics record written by [`persist_metrics`].
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a flat mapping of
/// names to numbers.
pub fn load_metrics(path: &Path) -> Result<Metrics, PersistError> {
    let body = fs::read_to_string(path).map_err(|source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&body)?)
}

fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
