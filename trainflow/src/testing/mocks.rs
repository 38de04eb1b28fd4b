//! Stub collaborators for testing.

use parking_lot::Mutex;
use rand::Rng;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::{IngestionOutput, Metrics, StageKind, TransformOutput};
use crate::seeding;
use crate::stages::{Ingest, Train, Transform};

/// Dataset handle passed between the stub transformation and stub trainer.
pub type StubDataset = Vec<f64>;

/// Shared, ordered record of which stages were invoked.
pub type CallLog = Arc<Mutex<Vec<StageKind>>>;

/// Creates an empty call log.
#[must_use]
pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// What a stub saw of the seeded randomness when it was invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedObservation {
    /// The seed reported by [`seeding::current_seed`].
    pub seed: u64,
    /// The first value drawn from the seeded generator.
    pub draw: u64,
}

#[derive(Debug)]
struct Recorder {
    stage: StageKind,
    failure: Option<String>,
    calls: Mutex<usize>,
    observations: Mutex<Vec<SeedObservation>>,
    log: Option<CallLog>,
}

impl Recorder {
    fn new(stage: StageKind) -> Self {
        Self {
            stage,
            failure: None,
            calls: Mutex::new(0),
            observations: Mutex::new(Vec::new()),
            log: None,
        }
    }

    fn record(&self) -> anyhow::Result<()> {
        *self.calls.lock() += 1;
        if let Some(log) = &self.log {
            log.lock().push(self.stage);
        }
        let draw = seeding::with_rng(|rng| rng.gen::<u64>());
        self.observations.lock().push(SeedObservation {
            seed: seeding::current_seed(),
            draw,
        });

        match &self.failure {
            Some(message) => Err(anyhow::anyhow!("{message}")),
            None => Ok(()),
        }
    }

    fn call_count(&self) -> usize {
        *self.calls.lock()
    }

    fn observations(&self) -> Vec<SeedObservation> {
        self.observations.lock().clone()
    }
}

/// An ingestion stub returning fixed locators.
#[derive(Debug)]
pub struct StubIngestion {
    output: IngestionOutput,
    recorder: Recorder,
}

impl StubIngestion {
    /// Creates a stub returning the given locators.
    #[must_use]
    pub fn new(train_path: impl Into<PathBuf>, test_path: impl Into<PathBuf>) -> Self {
        Self {
            output: IngestionOutput::new(train_path, test_path),
            recorder: Recorder::new(StageKind::Ingestion),
        }
    }

    /// Creates a stub that fails with `message`.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        let mut stub = Self::new("train.csv", "test.csv");
        stub.recorder.failure = Some(message.into());
        stub
    }

    /// Attaches auxiliary metadata to the output.
    #[must_use]
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.output = self.output.with_metadata(metadata);
        self
    }

    /// Records invocations into `log`.
    #[must_use]
    pub fn with_call_log(mut self, log: CallLog) -> Self {
        self.recorder.log = Some(log);
        self
    }

    /// Returns the number of times the stub was invoked.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.recorder.call_count()
    }

    /// Returns the seed observations from each invocation.
    #[must_use]
    pub fn observations(&self) -> Vec<SeedObservation> {
        self.recorder.observations()
    }
}

impl Ingest for StubIngestion {
    fn initiate(&self) -> anyhow::Result<IngestionOutput> {
        self.recorder.record()?;
        Ok(self.output.clone())
    }
}

/// A transformation stub returning fixed datasets.
#[derive(Debug)]
pub struct StubTransformation {
    train: StubDataset,
    test: StubDataset,
    preprocessor_path: PathBuf,
    received: Mutex<Vec<(PathBuf, PathBuf)>>,
    recorder: Recorder,
}

impl StubTransformation {
    /// Creates a stub returning the given datasets and preprocessor location.
    #[must_use]
    pub fn new(train: StubDataset, test: StubDataset, preprocessor_path: impl Into<PathBuf>) -> Self {
        Self {
            train,
            test,
            preprocessor_path: preprocessor_path.into(),
            received: Mutex::new(Vec::new()),
            recorder: Recorder::new(StageKind::Transformation),
        }
    }

    /// Creates a stub that fails with `message`.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        let mut stub = Self::new(Vec::new(), Vec::new(), "preprocessor");
        stub.recorder.failure = Some(message.into());
        stub
    }

    /// Records invocations into `log`.
    #[must_use]
    pub fn with_call_log(mut self, log: CallLog) -> Self {
        self.recorder.log = Some(log);
        self
    }

    /// Returns the number of times the stub was invoked.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.recorder.call_count()
    }

    /// Returns the train/test locators received on each invocation.
    #[must_use]
    pub fn received(&self) -> Vec<(PathBuf, PathBuf)> {
        self.received.lock().clone()
    }
}

impl Transform for StubTransformation {
    type Dataset = StubDataset;

    fn initiate(&self, train: &Path, test: &Path) -> anyhow::Result<TransformOutput<StubDataset>> {
        self.received
            .lock()
            .push((train.to_path_buf(), test.to_path_buf()));
        self.recorder.record()?;
        Ok(TransformOutput::new(
            self.train.clone(),
            self.test.clone(),
            self.preprocessor_path.clone(),
        ))
    }
}

/// A trainer stub returning fixed metrics.
#[derive(Debug)]
pub struct StubTrainer {
    metrics: Metrics,
    received: Mutex<Vec<(StubDataset, StubDataset)>>,
    recorder: Recorder,
}

impl StubTrainer {
    /// Creates a stub returning `metrics`.
    #[must_use]
    pub fn new(metrics: Metrics) -> Self {
        Self {
            metrics,
            received: Mutex::new(Vec::new()),
            recorder: Recorder::new(StageKind::Training),
        }
    }

    /// Creates a stub returning the given `(name, value)` pairs.
    #[must_use]
    pub fn with_metrics<'a>(pairs: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        Self::new(
            pairs
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        )
    }

    /// Creates a stub that fails with `message`.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        let mut stub = Self::new(Metrics::new());
        stub.recorder.failure = Some(message.into());
        stub
    }

    /// Records invocations into `log`.
    #[must_use]
    pub fn with_call_log(mut self, log: CallLog) -> Self {
        self.recorder.log = Some(log);
        self
    }

    /// Returns the number of times the stub was invoked.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.recorder.call_count()
    }

    /// Returns the datasets received on each invocation.
    #[must_use]
    pub fn received(&self) -> Vec<(StubDataset, StubDataset)> {
        self.received.lock().clone()
    }

    /// Returns the seed observations from each invocation.
    #[must_use]
    pub fn observations(&self) -> Vec<SeedObservation> {
        self.recorder.observations()
    }
}

impl Train for StubTrainer {
    type Dataset = StubDataset;

    fn initiate(&self, train: &StubDataset, test: &StubDataset) -> anyhow::Result<Metrics> {
        self.received.lock().push((train.clone(), test.clone()));
        self.recorder.record()?;
        Ok(self.metrics.clone())
    }
}
