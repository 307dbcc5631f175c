#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Random-forest regression.
//!
//! A [`RandomForest`] averages [`RegressionTree`]s, each grown on a
//! bootstrap resample of the training rows. Trees are fitted in parallel
//! on a dedicated `rayon` pool. Tree `i` draws from its own RNG seeded
//! with `seed + i`, so a fit is reproducible regardless of how many
//! threads run it.
//!
//! Rows are plain `f64` slices; the forest knows nothing about feature
//! names. Callers own the column order.

pub mod metrics;
pub mod tree;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use tree::{RegressionTree, TreeParams};

/// Errors that can occur while fitting or evaluating a forest.
#[derive(Debug, Error)]
pub enum ForestError {
    /// No training rows were supplied.
    #[error("Cannot fit a forest on an empty dataset")]
    EmptyDataset,

    /// Row and target counts differ.
    #[error("Got {rows} rows but {targets} targets")]
    LengthMismatch {
        /// Number of rows.
        rows: usize,
        /// Number of targets.
        targets: usize,
    },

    /// A row has the wrong number of features.
    #[error("Row {row} has {actual} features, expected {expected}")]
    FeatureCount {
        /// Index of the offending row.
        row: usize,
        /// Width the forest was fitted on.
        expected: usize,
        /// Width of the offending row.
        actual: usize,
    },

    /// The hyper-parameters are unusable.
    #[error("Invalid forest parameters: {message}")]
    InvalidParams {
        /// Description of what went wrong.
        message: String,
    },

    /// The worker pool could not be created.
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Hyper-parameters for [`RandomForest::fit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForestParams {
    /// Number of trees.
    pub n_estimators: usize,
    /// Maximum tree depth (`None` = unlimited).
    pub max_depth: Option<usize>,
    /// Minimum rows in a node before it may split.
    pub min_samples_split: usize,
    /// Minimum rows on each side of a split.
    pub min_samples_leaf: usize,
    /// Features considered per split (`None` = all).
    pub max_features: Option<usize>,
    /// Base seed; tree `i` uses `seed + i`.
    pub seed: u64,
    /// Worker threads for fitting (`0` = one per core).
    pub n_threads: usize,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 80,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 42,
            n_threads: 0,
        }
    }
}

impl ForestParams {
    const fn tree_params(&self) -> TreeParams {
        TreeParams {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            max_features: self.max_features,
        }
    }
}

/// A fitted bagged ensemble of regression trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    n_features: usize,
    trees: Vec<RegressionTree>,
}

impl RandomForest {
    /// Fits a forest on row-major `rows` against `targets`.
    ///
    /// # Errors
    ///
    /// * [`ForestError::EmptyDataset`] if `rows` is empty
    /// * [`ForestError::LengthMismatch`] if `rows` and `targets` differ in length
    /// * [`ForestError::FeatureCount`] if `rows` is not rectangular
    /// * [`ForestError::InvalidParams`] if `n_estimators` is zero
    /// * [`ForestError::ThreadPool`] if the fitting pool cannot start
    pub fn fit(
        rows: &[Vec<f64>],
        targets: &[f64],
        params: &ForestParams,
    ) -> Result<Self, ForestError> {
        if rows.is_empty() {
            return Err(ForestError::EmptyDataset);
        }
        if rows.len() != targets.len() {
            return Err(ForestError::LengthMismatch {
                rows: rows.len(),
                targets: targets.len(),
            });
        }
        if params.n_estimators == 0 {
            return Err(ForestError::InvalidParams {
                message: "n_estimators must be at least 1".to_string(),
            });
        }

        let n_features = rows[0].len();
        check_widths(rows, n_features)?;

        let pool = ThreadPoolBuilder::new()
            .num_threads(params.n_threads)
            .build()?;

        log::debug!(
            "Fitting {} trees on {} rows x {} features ({} threads)",
            params.n_estimators,
            rows.len(),
            n_features,
            pool.current_num_threads()
        );

        let tree_params = params.tree_params();
        let n_rows = rows.len();

        let trees = pool.install(|| {
            (0..params.n_estimators)
                .into_par_iter()
                .map(|i| {
                    let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(i as u64));
                    let bootstrap: Vec<usize> =
                        (0..n_rows).map(|_| rng.random_range(0..n_rows)).collect();
                    RegressionTree::fit(rows, targets, bootstrap, &tree_params, &mut rng)
                })
                .collect::<Vec<_>>()
        });

        Ok(Self { n_features, trees })
    }

    /// Predicts every row, averaging over all trees.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::FeatureCount`] if any row's width differs
    /// from the width the forest was fitted on. No predictions are
    /// returned in that case.
    #[allow(clippy::cast_precision_loss)]
    pub fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, ForestError> {
        check_widths(rows, self.n_features)?;

        let n_trees = self.trees.len() as f64;
        Ok(rows
            .iter()
            .map(|row| {
                self.trees
                    .iter()
                    .map(|tree| tree.predict_row(row))
                    .sum::<f64>()
                    / n_trees
            })
            .collect())
    }

    /// Number of features every row must have.
    #[must_use]
    pub const fn n_features(&self) -> usize {
        self.n_features
    }

    /// Number of trees in the ensemble.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

fn check_widths(rows: &[Vec<f64>], expected: usize) -> Result<(), ForestError> {
    match rows.iter().position(|row| row.len() != expected) {
        Some(row) => Err(ForestError::FeatureCount {
            row,
            expected,
            actual: rows[row].len(),
        }),
        None => Ok(()),
    }
}
