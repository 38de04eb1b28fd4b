//! Three-stage training pipeline orchestrator.
//!
//! Runs ingestion, transformation and training strictly in sequence, seeds
//! randomness before the first stage, times every stage and persists the
//! trainer's metrics as the canonical run record.

use super::persist::persist_metrics;
use crate::config::RunConfig;
use crate::core::{IngestionOutput, Metrics, PipelineState, RunResult, StageKind};
use crate::errors::{ConfigError, Diagnose, DiagnosticError, PipelineError};
use crate::events::{
    EventSink, LoggingEventSink, METRICS_PERSISTED, PIPELINE_COMPLETED, PIPELINE_FAILED,
    PIPELINE_STARTED, STAGE_COMPLETED, STAGE_FAILED, STAGE_STARTED,
};
use crate::observability::{SpanTimer, StageTimings};
use crate::seeding;
use crate::stages::{Ingest, Train, Transform};
use chrono::Utc;
use serde_json::json;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// Orchestrates one ingestion, transformation and training collaborator.
///
/// The trainer must consume the dataset type the transformation produces.
/// A run drives the state machine
/// `Initialized -> Ingesting -> Transforming -> Training -> Persisting ->
/// Completed`, falling into `Failed` on the first error. Failures are never
/// retried and already persisted stage artifacts are not rolled back.
pub struct TrainPipeline<I, T, M> {
    config: RunConfig,
    ingestion: I,
    transformation: T,
    trainer: M,
    events: Arc<dyn EventSink>,
    state: PipelineState,
    transitions: Vec<PipelineState>,
}

impl<I, T, M> std::fmt::Debug for TrainPipeline<I, T, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrainPipeline")
            .field("config", &self.config)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<I, T, M> TrainPipeline<I, T, M>
where
    I: Ingest,
    T: Transform,
    M: Train<Dataset = T::Dataset>,
{
    /// Prepares the artifacts directory and binds the collaborators.
    ///
    /// Creating the directory is idempotent. Events go to a
    /// [`LoggingEventSink`] until [`with_event_sink`](Self::with_event_sink)
    /// replaces it.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] if the artifacts path is an existing
    /// non-directory or cannot be created.
    pub fn initialize(
        config: RunConfig,
        ingestion: I,
        transformation: T,
        trainer: M,
    ) -> Result<Self, PipelineError> {
        ensure_artifacts_dir(config.artifacts_dir())?;

        Ok(Self {
            config,
            ingestion,
            transformation,
            trainer,
            events: Arc::new(LoggingEventSink::default()),
            state: PipelineState::Initialized,
            transitions: vec![PipelineState::Initialized],
        })
    }

    /// Replaces the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.events = sink;
        self
    }

    /// Returns the run configuration.
    #[must_use]
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Returns every state entered since the last run started.
    #[must_use]
    pub fn transitions(&self) -> &[PipelineState] {
        &self.transitions
    }

    /// Executes the pipeline once.
    ///
    /// Calling `run` again starts a fresh pass from `Initialized`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Stage`] when a collaborator fails and
    /// [`PipelineError::Persistence`] when the metrics record cannot be
    /// written. The pipeline is left in [`PipelineState::Failed`].
    pub fn run(&mut self) -> Result<RunResult, PipelineError> {
        self.state = PipelineState::Initialized;
        self.transitions = vec![PipelineState::Initialized];

        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        self.events.emit(
            PIPELINE_STARTED,
            Some(json!({
                "run_id": run_id,
                "started_at": started_at,
                "config": self.config,
            })),
        );

        match self.execute(run_id, started_at) {
            Ok(result) => {
                self.transition(PipelineState::Completed);
                self.events.emit(
                    PIPELINE_COMPLETED,
                    Some(json!({
                        "run_id": run_id,
                        "elapsed_seconds": result.elapsed_seconds(),
                        "metrics": result.metrics(),
                    })),
                );
                Ok(result)
            }
            Err(err) => {
                let failed_in = self.state;
                self.transition(PipelineState::Failed);
                self.events.emit(
                    PIPELINE_FAILED,
                    Some(json!({
                        "run_id": run_id,
                        "failed_in": failed_in,
                        "error": err.to_string(),
                    })),
                );
                Err(err)
            }
        }
    }

    fn execute(
        &mut self,
        run_id: Uuid,
        started_at: chrono::DateTime<Utc>,
    ) -> Result<RunResult, PipelineError> {
        let run_timer = SpanTimer::start(run_id.to_string());
        seeding::seed_everything(self.config.seed());
        let mut timings = StageTimings::new();

        let timer = self.enter_stage(StageKind::Ingestion);
        let ingested = self
            .ingestion
            .initiate()
            .diagnose()
            .map_err(|source| self.stage_failed(StageKind::Ingestion, source))?;
        self.stage_completed(StageKind::Ingestion, timer, &mut timings, ingestion_summary(&ingested));

        let timer = self.enter_stage(StageKind::Transformation);
        let transformed = self
            .transformation
            .initiate(&ingested.train_path, &ingested.test_path)
            .diagnose()
            .map_err(|source| self.stage_failed(StageKind::Transformation, source))?;
        self.stage_completed(
            StageKind::Transformation,
            timer,
            &mut timings,
            json!({ "preprocessor_path": transformed.preprocessor_path }),
        );

        let timer = self.enter_stage(StageKind::Training);
        let metrics = self
            .trainer
            .initiate(&transformed.train, &transformed.test)
            .diagnose()
            .map_err(|source| self.stage_failed(StageKind::Training, source))?;
        self.stage_completed(StageKind::Training, timer, &mut timings, json!({ "metrics": metrics }));

        self.transition(PipelineState::Persisting);
        self.persist(&metrics)?;
        let elapsed_seconds = run_timer.finish();

        Ok(RunResult::new(
            run_id,
            started_at,
            metrics,
            transformed.preprocessor_path,
            elapsed_seconds,
            timings.into_inner(),
        ))
    }

    fn persist(&self, metrics: &Metrics) -> Result<(), PipelineError> {
        let path = self.config.metrics_path();
        persist_metrics(path, metrics)
            .diagnose()
            .map_err(PipelineError::Persistence)?;
        self.events
            .emit(METRICS_PERSISTED, Some(json!({ "metrics_path": path })));
        Ok(())
    }

    fn transition(&mut self, next: PipelineState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} -> {}",
            self.state,
            next
        );
        self.state = next;
        self.transitions.push(next);
    }

    fn enter_stage(&mut self, stage: StageKind) -> SpanTimer {
        self.transition(stage.state());
        self.events.emit(
            STAGE_STARTED,
            Some(json!({
                "stage": stage,
                "step": stage.step(),
                "of": StageKind::ALL.len(),
            })),
        );
        SpanTimer::start(stage.as_str())
    }

    fn stage_completed(
        &self,
        stage: StageKind,
        timer: SpanTimer,
        timings: &mut StageTimings,
        mut details: serde_json::Value,
    ) {
        let seconds = timer.finish();
        timings.record(stage, seconds);
        if let Some(map) = details.as_object_mut() {
            map.insert("stage".to_string(), json!(stage));
            map.insert("duration_seconds".to_string(), json!(seconds));
        }
        self.events.emit(STAGE_COMPLETED, Some(details));
    }

    fn stage_failed(&self, stage: StageKind, source: DiagnosticError) -> PipelineError {
        let mut details = source.to_json();
        if let Some(map) = details.as_object_mut() {
            map.insert("stage".to_string(), json!(stage));
        }
        self.events.emit(STAGE_FAILED, Some(details));
        PipelineError::Stage { stage, source }
    }
}

fn ingestion_summary(output: &IngestionOutput) -> serde_json::Value {
    json!({
        "train_path": output.train_path,
        "test_path": output.test_path,
        "metadata": output.metadata,
    })
}

fn ensure_artifacts_dir(dir: &Path) -> Result<(), ConfigError> {
    if dir.exists() && !dir.is_dir() {
        return Err(ConfigError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }
    fs::create_dir_all(dir).map_err(|source| ConfigError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}
