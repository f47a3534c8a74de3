//! Feature extraction from match records.

use serde::Serialize;
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{Display, EnumCount, EnumIter};

use aprender::primitives::{Matrix, Vector};

use crate::dataset::Match;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumCount, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    HomeGoal,
    AwayGoal,
    GoalDifference,
    TotalGoals,
}
impl Feature {
    pub fn extract(self, m: &Match) -> f32 {
        let value = match self {
            Feature::HomeGoal => m.home_goal,
            Feature::AwayGoal => m.away_goal,
            Feature::GoalDifference => m.home_goal - m.away_goal,
            Feature::TotalGoals => m.home_goal + m.away_goal,
        };
        value as f32
    }
}

/// Class label of a match won by the home side.
pub const HOME_WIN: usize = 1;

/// Class label of a draw or an away win.
pub const NOT_HOME_WIN: usize = 0;

pub fn label(m: &Match) -> usize {
    if m.is_home_win() {
        HOME_WIN
    } else {
        NOT_HOME_WIN
    }
}

/// A feature matrix with one row per match, columns in [Feature] order, and the matching labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Samples {
    pub features: Matrix<f32>,
    pub labels: Vec<usize>,
}
impl Samples {
    pub fn from_matches(matches: &[Match]) -> Self {
        let mut features = Matrix::zeros(matches.len(), Feature::COUNT);
        for (row, m) in matches.iter().enumerate() {
            for (col, feature) in Feature::iter().enumerate() {
                features.set(row, col, feature.extract(m));
            }
        }
        let labels = matches.iter().map(label).collect();
        Self { features, labels }
    }

    /// Pairs a feature matrix with labels in the `f32` encoding the model selection routines use.
    pub fn from_encoded(features: Matrix<f32>, labels: &Vector<f32>) -> Self {
        let labels = labels.as_slice().iter().map(|&label| label as usize).collect();
        Self { features, labels }
    }

    pub fn encoded_labels(&self) -> Vector<f32> {
        Vector::from_vec(self.labels.iter().map(|&label| label as f32).collect())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// The subset of samples at `indexes`, in that order.
    pub fn select(&self, indexes: &[usize]) -> Samples {
        let cols = self.features.n_cols();
        let mut features = Matrix::zeros(indexes.len(), cols);
        for (row, &index) in indexes.iter().enumerate() {
            for col in 0..cols {
                features.set(row, col, self.features.get(index, col));
            }
        }
        Samples {
            features,
            labels: indexes.iter().map(|&index| self.labels[index]).collect(),
        }
    }
}
