//! Reference trainer: linear regression fitted by batch gradient descent.

use super::dataset::Dataset;
use crate::config::RunConfig;
use crate::core::Metrics;
use crate::seeding;
use crate::stages::Train;
use anyhow::{bail, ensure, Context};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

/// Default optimizer step size.
pub const DEFAULT_LEARNING_RATE: f64 = 0.05;

/// Default number of passes over the training split.
pub const DEFAULT_EPOCHS: usize = 500;

/// A fitted linear model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    weights: Vec<f64>,
    bias: f64,
}

impl LinearModel {
    /// Predicts the target for one feature row.
    #[must_use]
    pub fn predict(&self, row: &[f64]) -> f64 {
        self.bias
            + self
                .weights
                .iter()
                .zip(row)
                .map(|(w, x)| w * x)
                .sum::<f64>()
    }

    /// Returns the feature weights.
    #[must_use]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Returns the intercept.
    #[must_use]
    pub fn bias(&self) -> f64 {
        self.bias
    }
}

/// Regression metrics for `model` on `data`: `rmse`, `mae` and `r2`.
///
/// A constant target scores `r2 = 1` on a perfect fit and `0` otherwise.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn evaluate(model: &LinearModel, data: &Dataset) -> Metrics {
    let rows = data.len().max(1) as f64;
    let mean = data.targets().iter().sum::<f64>() / rows;

    let (mut ss_res, mut abs_err, mut ss_tot) = (0.0, 0.0, 0.0);
    for (row, target) in data.features().iter().zip(data.targets()) {
        let residual = target - model.predict(row);
        ss_res += residual * residual;
        abs_err += residual.abs();
        ss_tot += (target - mean).powi(2);
    }

    let r2 = if ss_tot > f64::EPSILON {
        1.0 - ss_res / ss_tot
    } else if ss_res > f64::EPSILON {
        0.0
    } else {
        1.0
    };

    Metrics::from([
        ("rmse".to_string(), (ss_res / rows).sqrt()),
        ("mae".to_string(), abs_err / rows),
        ("r2".to_string(), r2),
    ])
}

/// Trains a [`LinearModel`] and reports test-split metrics.
#[derive(Debug, Clone)]
pub struct ModelTrainer {
    model_path: PathBuf,
    learning_rate: f64,
    epochs: usize,
}

impl ModelTrainer {
    /// Creates a trainer persisting its model at `model_path`.
    #[must_use]
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            learning_rate: DEFAULT_LEARNING_RATE,
            epochs: DEFAULT_EPOCHS,
        }
    }

    /// Creates a trainer from a run configuration.
    #[must_use]
    pub fn from_run_config(config: &RunConfig) -> Self {
        Self::new(config.model_path())
    }

    /// Sets the step size.
    #[must_use]
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Sets the number of epochs.
    #[must_use]
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    /// Fits a model on `data`, starting from small seeded weights.
    ///
    /// # Errors
    ///
    /// Fails on an empty dataset, a non-positive learning rate, or when the
    /// weights diverge to non-finite values.
    #[allow(clippy::cast_precision_loss)]
    pub fn fit(&self, data: &Dataset) -> anyhow::Result<LinearModel> {
        ensure!(!data.is_empty(), "cannot train on an empty dataset");
        ensure!(
            self.learning_rate > 0.0 && self.learning_rate.is_finite(),
            "learning rate must be positive, got {}",
            self.learning_rate
        );

        let width = data.feature_count();
        let mut model = seeding::with_rng(|rng| LinearModel {
            weights: (0..width).map(|_| rng.gen_range(-0.01..0.01)).collect(),
            bias: 0.0,
        });

        let rows = data.len() as f64;
        for epoch in 0..self.epochs {
            let mut grad_w = vec![0.0; width];
            let mut grad_b = 0.0;
            for (row, target) in data.features().iter().zip(data.targets()) {
                let error = model.predict(row) - target;
                for (g, x) in grad_w.iter_mut().zip(row) {
                    *g += error * x;
                }
                grad_b += error;
            }

            for (w, g) in model.weights.iter_mut().zip(&grad_w) {
                *w -= self.learning_rate * g / rows;
            }
            model.bias -= self.learning_rate * grad_b / rows;

            if !model.bias.is_finite() || model.weights.iter().any(|w| !w.is_finite()) {
                bail!("training diverged at epoch {epoch}; lower the learning rate");
            }
        }

        Ok(model)
    }
}

impl Train for ModelTrainer {
    type Dataset = Dataset;

    fn initiate(&self, train: &Dataset, test: &Dataset) -> anyhow::Result<Metrics> {
        debug!(
            rows = train.len(),
            features = train.feature_count(),
            epochs = self.epochs,
            "Fitting linear model"
        );
        let model = self.fit(train)?;

        let body = serde_json::to_string_pretty(&model)?;
        fs::write(&self.model_path, body)
            .with_context(|| format!("failed to write model to {}", self.model_path.display()))?;
        info!(path = %self.model_path.display(), "Saved model");

        Ok(evaluate(&model, test))
    }
}
