//! Bagged regression trees.
//!
//! Each tree is grown on a bootstrap sample drawn from a seeded generator, so
//! identical inputs produce identical forests.

mod split;
mod tree;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

pub use split::{mean_squared_error, train_holdout_split, Partition};
pub use tree::{RegressionTree, TreeNode};

/// Trees per forest
pub const DEFAULT_N_ESTIMATORS: usize = 100;

/// Seed shared by the split and the bootstrap draws
pub const DEFAULT_RANDOM_STATE: u64 = 42;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ForestError {
    #[error("cannot fit with zero samples")]
    EmptyDataset,

    #[error("number of rows ({rows}) and labels ({labels}) must match")]
    ShapeMismatch { rows: usize, labels: usize },

    #[error("row {row} has {actual} features, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("forest needs at least one estimator")]
    NoEstimators,

    #[error("expected {expected} features, got {actual}")]
    FeatureWidth { expected: usize, actual: usize },
}

/// Mean of `n_estimators` regression trees, each fit on a bootstrap sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaggedForest {
    trees: Vec<RegressionTree>,
    n_features: usize,
    random_state: u64,
}

impl BaggedForest {
    /// Fits a forest on `x` (one row per sample) against `y`
    pub fn fit(
        x: &[Vec<f64>],
        y: &[f64],
        n_estimators: usize,
        random_state: u64,
    ) -> Result<Self, ForestError> {
        if n_estimators == 0 {
            return Err(ForestError::NoEstimators);
        }
        if x.len() != y.len() {
            return Err(ForestError::ShapeMismatch {
                rows: x.len(),
                labels: y.len(),
            });
        }
        let Some(first) = x.first() else {
            return Err(ForestError::EmptyDataset);
        };

        let n_features = first.len();
        if let Some((row, bad)) = x.iter().enumerate().find(|(_, r)| r.len() != n_features) {
            return Err(ForestError::RaggedRow {
                row,
                expected: n_features,
                actual: bad.len(),
            });
        }

        let trees = (0..n_estimators)
            .map(|i| {
                let indices = bootstrap_sample(x.len(), random_state.wrapping_add(i as u64));
                RegressionTree::fit(x, y, &indices)
            })
            .collect();

        Ok(Self {
            trees,
            n_features,
            random_state,
        })
    }

    /// Averages the trees' predictions for one row
    pub fn predict(&self, row: &[f64]) -> Result<f64, ForestError> {
        if row.len() != self.n_features {
            return Err(ForestError::FeatureWidth {
                expected: self.n_features,
                actual: row.len(),
            });
        }
        if self.trees.is_empty() {
            return Err(ForestError::NoEstimators);
        }

        let total: f64 = self.trees.iter().map(|tree| tree.predict(row)).sum();
        Ok(total / self.trees.len() as f64)
    }

    pub fn n_estimators(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn random_state(&self) -> u64 {
        self.random_state
    }
}

/// Indices of a sample with replacement, same size as the input
fn bootstrap_sample(n_samples: usize, seed: u64) -> Vec<usize> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
}
