//! In-memory tabular dataset with CSV persistence.

use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading, saving or splitting a [`Dataset`].
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The file could not be read or written.
    #[error("dataset I/O failed for {path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file has no header row.
    #[error("dataset {path} is empty")]
    Empty {
        /// File involved.
        path: PathBuf,
    },

    /// The header names fewer than two columns.
    #[error("dataset {path} needs at least one feature column and a target column")]
    TooFewColumns {
        /// File involved.
        path: PathBuf,
    },

    /// A row has a different number of fields than the header.
    #[error("{path}:{line}: expected {expected} fields, found {found}")]
    Ragged {
        /// File involved.
        path: PathBuf,
        /// One-based line number.
        line: usize,
        /// Fields in the header.
        expected: usize,
        /// Fields in the row.
        found: usize,
    },

    /// A field is not a finite number.
    #[error("{path}:{line}: column '{column}' has non-numeric value '{value}'")]
    Parse {
        /// File involved.
        path: PathBuf,
        /// One-based line number.
        line: usize,
        /// Column name from the header.
        column: String,
        /// Offending field.
        value: String,
    },

    /// The split would leave one side without rows.
    #[error("cannot split {rows} rows with test size {test_size}")]
    Split {
        /// Rows available.
        rows: usize,
        /// Requested test fraction.
        test_size: f64,
    },
}

/// Feature rows plus a regression target.
///
/// The last CSV column is the target, every other column is a feature.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    features: Vec<Vec<f64>>,
    targets: Vec<f64>,
}

impl Dataset {
    /// Creates a dataset from column names, feature rows and targets.
    ///
    /// `columns` names the features followed by the target.
    #[must_use]
    pub fn new(columns: Vec<String>, features: Vec<Vec<f64>>, targets: Vec<f64>) -> Self {
        debug_assert_eq!(features.len(), targets.len());
        Self {
            columns,
            features,
            targets,
        }
    }

    /// Reads a headed CSV file.
    ///
    /// # Errors
    ///
    /// Returns a [`DatasetError`] when the file is unreadable, empty, ragged
    /// or holds a non-numeric field.
    pub fn read_csv(path: &Path) -> Result<Self, DatasetError> {
        let text = fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &text)
    }

    fn parse(path: &Path, text: &str) -> Result<Self, DatasetError> {
        let mut lines = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty());

        let (_, header) = lines.next().ok_or_else(|| DatasetError::Empty {
            path: path.to_path_buf(),
        })?;
        let columns: Vec<String> = header.split(',').map(|c| c.trim().to_string()).collect();
        if columns.len() < 2 {
            return Err(DatasetError::TooFewColumns {
                path: path.to_path_buf(),
            });
        }

        let mut features = Vec::new();
        let mut targets = Vec::new();
        for (index, line) in lines {
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            if fields.len() != columns.len() {
                return Err(DatasetError::Ragged {
                    path: path.to_path_buf(),
                    line: index + 1,
                    expected: columns.len(),
                    found: fields.len(),
                });
            }

            let mut row = Vec::with_capacity(fields.len());
            for (field, column) in fields.iter().zip(&columns) {
                let value = field
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| DatasetError::Parse {
                        path: path.to_path_buf(),
                        line: index + 1,
                        column: column.clone(),
                        value: (*field).to_string(),
                    })?;
                row.push(value);
            }
            if let Some(target) = row.pop() {
                targets.push(target);
                features.push(row);
            }
        }

        Ok(Self::new(columns, features, targets))
    }

    /// Writes the dataset as a headed CSV file, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Io`] if the file cannot be written.
    pub fn write_csv(&self, path: &Path) -> Result<(), DatasetError> {
        fs::write(path, self.to_csv()).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    fn to_csv(&self) -> String {
        let mut out = self.columns.join(",");
        out.push('\n');
        for (row, target) in self.features.iter().zip(&self.targets) {
            for value in row {
                let _ = write!(out, "{value},");
            }
            let _ = writeln!(out, "{target}");
        }
        out
    }

    /// Shuffles the rows with `rng` and splits off a `test_size` fraction.
    ///
    /// The test side gets `ceil(rows * test_size)` rows, and both sides are
    /// guaranteed at least one row.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Split`] when there are fewer than two rows or
    /// `test_size` is not strictly between 0 and 1.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn split<R: Rng + ?Sized>(
        &self,
        test_size: f64,
        rng: &mut R,
    ) -> Result<(Self, Self), DatasetError> {
        let rows = self.len();
        if rows < 2 || !(test_size > 0.0 && test_size < 1.0) {
            return Err(DatasetError::Split { rows, test_size });
        }

        let mut order: Vec<usize> = (0..rows).collect();
        order.shuffle(rng);

        let test_rows = ((rows as f64 * test_size).ceil() as usize).clamp(1, rows - 1);
        let (test_idx, train_idx) = order.split_at(test_rows);
        Ok((self.select(train_idx), self.select(test_idx)))
    }

    fn select(&self, indices: &[usize]) -> Self {
        Self {
            columns: self.columns.clone(),
            features: indices.iter().map(|&i| self.features[i].clone()).collect(),
            targets: indices.iter().map(|&i| self.targets[i]).collect(),
        }
    }

    /// Returns a dataset with the same columns and targets but new features.
    #[must_use]
    pub fn with_features(&self, features: Vec<Vec<f64>>) -> Self {
        Self::new(self.columns.clone(), features, self.targets.clone())
    }

    /// Returns the column names, target last.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the feature rows.
    #[must_use]
    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    /// Returns the targets.
    #[must_use]
    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    /// Returns the number of feature columns.
    #[must_use]
    pub fn feature_count(&self) -> usize {
        self.columns.len().saturating_sub(1)
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Returns true if there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sample(rows: usize) -> Dataset {
        let features = (0..rows).map(|i| vec![i as f64, (i * 2) as f64]).collect();
        let targets = (0..rows).map(|i| i as f64 * 10.0).collect();
        Dataset::new(
            vec!["a".to_string(), "b".to_string(), "y".to_string()],
            features,
            targets,
        )
    }

    #[test]
    fn test_csv_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        let data = sample(4);

        data.write_csv(&path).unwrap();
        let loaded = Dataset::read_csv(&path).unwrap();

        assert_eq!(loaded, data);
        assert_eq!(loaded.feature_count(), 2);
    }

    #[test]
    fn test_parse_skips_blank_lines() {
        let data = Dataset::parse(Path::new("inline"), "x,y\n1,2\n\n3,4\n").unwrap();

        assert_eq!(data.features(), &[vec![1.0], vec![3.0]]);
        assert_eq!(data.targets(), &[2.0, 4.0]);
    }

    #[test]
    fn test_parse_rejects_non_numeric_field() {
        let err = Dataset::parse(Path::new("inline"), "x,y\n1,oops\n").unwrap_err();

        match err {
            DatasetError::Parse {
                line, column, value, ..
            } => {
                assert_eq!(line, 2);
                assert_eq!(column, "y");
                assert_eq!(value, "oops");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_rejects_ragged_row() {
        let err = Dataset::parse(Path::new("inline"), "x,y\n1,2,3\n").unwrap_err();
        assert!(matches!(
            err,
            DatasetError::Ragged {
                expected: 2,
                found: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_requires_target_column() {
        let err = Dataset::parse(Path::new("inline"), "only\n1\n").unwrap_err();
        assert!(matches!(err, DatasetError::TooFewColumns { .. }));

        let err = Dataset::parse(Path::new("inline"), "\n\n").unwrap_err();
        assert!(matches!(err, DatasetError::Empty { .. }));
    }

    #[test]
    fn test_split_sizes() {
        let data = sample(10);
        let (train, test) = data.split(0.2, &mut StdRng::seed_from_u64(1)).unwrap();

        assert_eq!(train.len(), 8);
        assert_eq!(test.len(), 2);

        let mut all: Vec<f64> = train.targets().iter().chain(test.targets()).copied().collect();
        all.sort_by(f64::total_cmp);
        assert_eq!(all, data.targets().to_vec());
    }

    #[test]
    fn test_split_is_deterministic_per_seed() {
        let data = sample(20);

        let first = data.split(0.25, &mut StdRng::seed_from_u64(7)).unwrap();
        let second = data.split(0.25, &mut StdRng::seed_from_u64(7)).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_split_keeps_both_sides_non_empty() {
        let data = sample(2);
        let (train, test) = data.split(0.9, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!((train.len(), test.len()), (1, 1));

        let err = sample(1).split(0.5, &mut StdRng::seed_from_u64(1)).unwrap_err();
        assert!(matches!(err, DatasetError::Split { rows: 1, .. }));
    }
}
