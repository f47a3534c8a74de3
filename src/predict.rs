//! Home-win prediction with a random forest, and a linear forecast of future results.

use std::fmt::Display;
use std::time::{Duration, Instant};

use aprender::metrics::classification::accuracy;
use aprender::model_selection::{train_test_split, StratifiedKFold};
use aprender::preprocessing::StandardScaler;
use aprender::Transformer;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::dataset::Dataset;
use crate::predict::features::Samples;
use crate::predict::forest::{Forest, ForestOptions};
use crate::predict::metrics::ClassificationReport;

pub mod features;
pub mod forest;
pub mod metrics;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PredictError {
    #[error("no data available to train the model on {0}")]
    EmptyDataset(String),

    #[error("at least {required} samples are required, but only {actual} are available")]
    InsufficientSamples { required: usize, actual: usize },

    #[error("model error: {0}")]
    Model(String),
}

fn model_error(err: impl Display) -> PredictError {
    PredictError::Model(err.to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainOptions {
    pub forest: ForestOptions,
    pub test_fraction: f64,
    pub folds: usize,
    pub seed: u64,
}
impl TrainOptions {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.forest.validate()?;
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            anyhow::bail!("test fraction must lie strictly between 0 and 1");
        }
        if self.folds < 2 {
            anyhow::bail!("at least two folds are required");
        }
        Ok(())
    }

    fn required_samples(&self) -> usize {
        self.folds.max(2)
    }
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            forest: ForestOptions::default(),
            test_fraction: 0.2,
            folds: 5,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingReport {
    /// Accuracy of the model on the held-out split.
    pub accuracy: f64,

    /// Mean accuracy across the cross-validation folds, computed on unscaled features.
    pub cv_accuracy: f64,

    /// Evaluated on the held-out split.
    pub report: ClassificationReport,

    pub train_samples: usize,
    pub test_samples: usize,
    pub elapsed: Duration,
}

#[derive(Debug)]
pub struct Trained {
    pub model: Forest,
    pub scaler: StandardScaler,
    pub report: TrainingReport,
}

/// Trains a forest to predict home wins on the dataset's matches.
///
/// The samples are split into training and held-out sets; features are standardised using the
/// training statistics, the forest is fitted to the scaled training set, and evaluated on the
/// scaled held-out set. Separately, a stratified k-fold cross-validation is run over all samples
/// on the raw, unscaled features.
pub fn train(dataset: &Dataset, options: &TrainOptions) -> Result<Trained, PredictError> {
    let start_time = Instant::now();
    let samples = Samples::from_matches(&dataset.matches);
    if samples.is_empty() {
        return Err(PredictError::EmptyDataset(dataset.label.clone()));
    }
    let required = options.required_samples();
    if samples.len() < required {
        return Err(PredictError::InsufficientSamples {
            required,
            actual: samples.len(),
        });
    }
    let test_samples = (samples.len() as f32 * options.test_fraction as f32).round() as usize;
    if test_samples == 0 || test_samples == samples.len() {
        return Err(PredictError::InsufficientSamples {
            required: samples.len() + 1,
            actual: samples.len(),
        });
    }

    let (train_features, test_features, train_labels, test_labels) = train_test_split(
        &samples.features,
        &samples.encoded_labels(),
        options.test_fraction as f32,
        Some(options.seed),
    )
    .map_err(model_error)?;
    let train = Samples::from_encoded(train_features, &train_labels);
    let test = Samples::from_encoded(test_features, &test_labels);
    debug!(
        "training on {} samples, testing on {} samples of {}",
        train.len(),
        test.len(),
        dataset.name
    );

    let mut scaler = StandardScaler::new();
    let scaled_train = scaler.fit_transform(&train.features).map_err(model_error)?;
    let model = Forest::fit(&scaled_train, &train.labels, &options.forest)?;
    let predicted = model.predict(&scaler.transform(&test.features).map_err(model_error)?);
    let report = ClassificationReport::compute(&test.labels, &predicted);
    let accuracy = f64::from(report.accuracy);
    let cv_accuracy = cross_val_accuracy(&samples, options.folds, &options.forest)?;

    let elapsed = start_time.elapsed();
    info!(
        "trained on {}: accuracy {accuracy:.3}, cross-validated accuracy {cv_accuracy:.3}, took {:.3}s",
        dataset.name,
        elapsed.as_millis() as f64 / 1_000.
    );
    Ok(Trained {
        model,
        scaler,
        report: TrainingReport {
            accuracy,
            cv_accuracy,
            report,
            train_samples: train.len(),
            test_samples: test.len(),
            elapsed,
        },
    })
}

/// Mean held-out accuracy of forests fitted to each of `folds` stratified training folds. Folds
/// left without training or test samples are skipped.
pub fn cross_val_accuracy(samples: &Samples, folds: usize, options: &ForestOptions) -> Result<f64, PredictError> {
    let mut scores = Vec::with_capacity(folds);
    for (mut train_indexes, mut test_indexes) in StratifiedKFold::new(folds).split(&samples.encoded_labels()) {
        if train_indexes.is_empty() || test_indexes.is_empty() {
            continue;
        }
        train_indexes.sort_unstable();
        test_indexes.sort_unstable();
        let (train, test) = (samples.select(&train_indexes), samples.select(&test_indexes));
        let model = Forest::fit(&train.features, &train.labels, options)?;
        scores.push(f64::from(accuracy(&model.predict(&test.features), &test.labels)));
    }
    debug!("cross-validation scores: {scores:?}");
    if scores.is_empty() {
        Ok(0.0)
    } else {
        Ok(scores.iter().sum::<f64>() / scores.len() as f64)
    }
}

/// Totals expected over a number of future games, extrapolated from per-match averages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    pub games: u32,
    pub home_goals: f64,
    pub away_goals: f64,
    pub home_wins: f64,
}

pub fn forecast(dataset: &Dataset, games: u32) -> Result<Forecast, PredictError> {
    if dataset.is_empty() {
        return Err(PredictError::EmptyDataset(dataset.label.clone()));
    }
    let rows = dataset.len() as f64;
    let mean_home = dataset.matches.iter().map(|m| m.home_goal).sum::<f64>() / rows;
    let mean_away = dataset.matches.iter().map(|m| m.away_goal).sum::<f64>() / rows;
    let home_win_rate = dataset.matches.iter().filter(|m| m.is_home_win()).count() as f64 / rows;
    let games_f64 = games as f64;
    Ok(Forecast {
        games,
        home_goals: mean_home * games_f64,
        away_goals: mean_away * games_f64,
        home_wins: home_win_rate * games_f64,
    })
}
