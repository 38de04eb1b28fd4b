mod logging;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::error;
use trainflow::components::{DataIngestion, DataTransformation, IngestionConfig, ModelTrainer};
use trainflow::config::{RunConfig, DEFAULT_ARTIFACTS_DIR, DEFAULT_SEED};
use trainflow::core::Metrics;
use trainflow::errors::PipelineError;
use trainflow::events::LoggingEventSink;
use trainflow::pipeline::TrainPipeline;

use crate::logging::LogLevel;

/// Exit code for a pipeline or diagnostic failure.
const EXIT_PIPELINE_FAILURE: u8 = 1;
/// Exit code for any other failure.
const EXIT_UNEXPECTED_FAILURE: u8 = 2;

#[derive(Debug, Parser)]
#[command(
    name = "trainflow",
    version,
    about = "Ingest, transform and train a model in one reproducible run"
)]
struct Cli {
    /// Seed for every randomness source
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Root directory for all output artifacts
    #[arg(long, default_value = DEFAULT_ARTIFACTS_DIR)]
    artifacts_dir: PathBuf,

    /// Log level (DEBUG, INFO, WARNING, ERROR, CRITICAL)
    #[arg(long, value_enum, ignore_case = true, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    logging::init(cli.log_level);
    logging::install_panic_hook();

    match execute(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => ExitCode::from(report(&err)),
    }
}

fn execute(cli: &Cli) -> anyhow::Result<()> {
    let metrics = train(cli)?;
    let body = serde_json::to_string_pretty(&metrics).context("failed to render metrics")?;
    println!("{body}");
    Ok(())
}

fn train(cli: &Cli) -> Result<Metrics, PipelineError> {
    let config = RunConfig::builder()
        .with_seed(cli.seed)
        .with_artifacts_dir(&cli.artifacts_dir)
        .build()?;

    let mut pipeline = TrainPipeline::initialize(
        config.clone(),
        DataIngestion::new(IngestionConfig::from_run_config(&config)),
        DataTransformation::from_run_config(&config),
        ModelTrainer::from_run_config(&config),
    )?
    .with_event_sink(Arc::new(LoggingEventSink::info()));

    Ok(pipeline.run()?.into_metrics())
}

/// Logs `err` and returns the process exit code it maps to.
fn report(err: &anyhow::Error) -> u8 {
    if let Some(pipeline_err) = err.downcast_ref::<PipelineError>() {
        error!(error = %pipeline_err, "Training pipeline failed");
        EXIT_PIPELINE_FAILURE
    } else {
        error!("Unexpected failure: {err:?}");
        EXIT_UNEXPECTED_FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;
    use trainflow::components::DATASET_ENV;
    use trainflow::errors::ConfigError;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["trainflow"]).unwrap();

        assert_eq!(cli.seed, 42);
        assert_eq!(cli.artifacts_dir, PathBuf::from("artifacts"));
        assert_eq!(cli.log_level, LogLevel::Info);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "trainflow",
            "--seed",
            "7",
            "--artifacts-dir",
            "out",
            "--log-level",
            "WARNING",
        ])
        .unwrap();

        assert_eq!(cli.seed, 7);
        assert_eq!(cli.artifacts_dir, PathBuf::from("out"));
        assert_eq!(cli.log_level, LogLevel::Warning);
    }

    #[test]
    fn test_log_level_ignores_case() {
        let cli = Cli::try_parse_from(["trainflow", "--log-level", "critical"]).unwrap();
        assert_eq!(cli.log_level, LogLevel::Critical);
    }

    #[test]
    fn test_rejects_bad_arguments() {
        assert!(Cli::try_parse_from(["trainflow", "--log-level", "TRACE"]).is_err());
        assert!(Cli::try_parse_from(["trainflow", "--seed", "-1"]).is_err());
    }

    #[test]
    fn test_pipeline_errors_exit_with_one() {
        let err = anyhow::Error::new(PipelineError::from(ConfigError::InvalidTestSize(2.0)));
        assert_eq!(report(&err), EXIT_PIPELINE_FAILURE);
    }

    #[test]
    fn test_other_errors_exit_with_two() {
        let err = anyhow::anyhow!("disk on fire");
        assert_eq!(report(&err), EXIT_UNEXPECTED_FAILURE);
    }

    #[test]
    fn test_missing_dataset_is_a_pipeline_failure() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var(DATASET_ENV, dir.path().join("missing.csv"));
        let out = dir.path().join("out");
        let cli = Cli::try_parse_from([
            OsStr::new("trainflow"),
            OsStr::new("--artifacts-dir"),
            out.as_os_str(),
        ])
        .unwrap();

        let err = execute(&cli).unwrap_err();

        assert_eq!(report(&err), EXIT_PIPELINE_FAILURE);
        assert!(out.is_dir());
        assert!(!out.join("metrics.json").exists());
    }
}
