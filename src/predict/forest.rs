//! Random forest configuration, and majority voting over a fitted [RandomForestClassifier].

use aprender::primitives::Matrix;
use aprender::tree::RandomForestClassifier;
use serde::{Deserialize, Serialize};

use crate::predict::PredictError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestOptions {
    pub trees: usize,

    /// Seeds the first tree's bootstrap sample; tree `i` is seeded with `seed + i`.
    pub seed: u64,

    /// Unbounded when `None`.
    pub max_depth: Option<usize>,
}
impl ForestOptions {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.trees == 0 {
            anyhow::bail!("at least one tree is required");
        }
        if self.max_depth == Some(0) {
            anyhow::bail!("max_depth must be at least 1");
        }
        Ok(())
    }

    fn classifier(&self) -> RandomForestClassifier {
        let classifier = RandomForestClassifier::new(self.trees).with_random_state(self.seed);
        match self.max_depth {
            None => classifier,
            Some(max_depth) => classifier.with_max_depth(max_depth),
        }
    }
}

impl Default for ForestOptions {
    fn default() -> Self {
        Self {
            trees: 100,
            seed: 42,
            max_depth: None,
        }
    }
}

/// A fitted forest. Predictions are the class with the most tree votes, the lowest such class
/// when votes are tied.
#[derive(Debug, Clone)]
pub struct Forest {
    classifier: RandomForestClassifier,
    trees: usize,
}
impl Forest {
    pub fn fit(features: &Matrix<f32>, labels: &[usize], options: &ForestOptions) -> Result<Self, PredictError> {
        let mut classifier = options.classifier();
        classifier
            .fit(features, labels)
            .map_err(|err| PredictError::Model(err.to_string()))?;
        Ok(Self {
            classifier,
            trees: options.trees,
        })
    }

    pub fn trees(&self) -> usize {
        self.trees
    }

    pub fn predict_row(&self, row: &[f32]) -> usize {
        let mut single = Matrix::zeros(1, row.len());
        for (col, &value) in row.iter().enumerate() {
            single.set(0, col, value);
        }
        let proportions = self.classifier.predict_proba(&single);
        majority(proportions.row(0).as_slice())
    }

    pub fn predict(&self, features: &Matrix<f32>) -> Vec<usize> {
        (0..features.n_rows())
            .map(|row| self.predict_row(features.row(row).as_slice()))
            .collect()
    }
}

fn majority(proportions: &[f32]) -> usize {
    let mut best = 0;
    for (class, &proportion) in proportions.iter().enumerate() {
        if proportion > proportions[best] {
            best = class;
        }
    }
    best
}
