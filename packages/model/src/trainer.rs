//! Trains the demand model on synthetic history and persists it.
//!
//! The held-out partition is scored and logged, but the score does not
//! decide whether the model is saved: training always ends with a write.

use std::path::Path;

use foodlink_demand_models::{FeatureName, HistoricalSample};
use foodlink_forest::{ForestParams, RandomForest, metrics};
use foodlink_synthetic::SyntheticConfig;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::{LoadedModel, ModelError, artifact};

/// Everything needed to reproduce one training run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainerConfig {
    /// Dataset to generate.
    pub synthetic: SyntheticConfig,
    /// Fraction of samples held out from fitting, in `(0, 1)`.
    pub test_fraction: f64,
    /// Seed for the train/held-out shuffle.
    pub split_seed: u64,
    /// Estimator hyper-parameters.
    pub forest: ForestParams,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            synthetic: SyntheticConfig::default(),
            test_fraction: 0.15,
            split_seed: 42,
            forest: ForestParams::default(),
        }
    }
}

/// Summary of a training run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingReport {
    /// Rows the forest was fitted on.
    pub train_rows: usize,
    /// Rows held out for evaluation.
    pub test_rows: usize,
    /// Held-out root mean squared error.
    pub rmse: f64,
    /// Held-out mean absolute error.
    pub mae: f64,
    /// Held-out coefficient of determination.
    pub r2: f64,
}

/// Splits `0..n` into shuffled `(train, test)` index sets.
///
/// The test set holds `ceil(n * test_fraction)` indices.
///
/// # Errors
///
/// Returns [`ModelError::InvalidConfig`] if `test_fraction` is outside
/// `(0, 1)` or the split would leave no training rows.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn split_indices(
    n: usize,
    test_fraction: f64,
    seed: u64,
) -> Result<(Vec<usize>, Vec<usize>), ModelError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(ModelError::InvalidConfig {
            message: format!("test_fraction must be in (0, 1), got {test_fraction}"),
        });
    }

    let n_test = (n as f64 * test_fraction).ceil() as usize;
    if n_test >= n {
        return Err(ModelError::InvalidConfig {
            message: format!("{n} samples leave nothing to train on after holding out {n_test}"),
        });
    }

    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));
    let train = indices.split_off(n_test);

    Ok((train, indices))
}

fn to_rows(samples: &[HistoricalSample], indices: &[usize]) -> (Vec<Vec<f64>>, Vec<f64>) {
    indices
        .iter()
        .map(|&i| {
            let sample = &samples[i];
            (sample.features.project(&FeatureName::ALL), sample.demand)
        })
        .unzip()
}

/// Generates data, fits the forest, and scores the held-out rows without
/// writing anything to disk.
///
/// # Errors
///
/// Returns an error if data generation, the split, or fitting fails.
pub fn fit(config: &TrainerConfig) -> Result<(LoadedModel, TrainingReport), ModelError> {
    let samples = foodlink_synthetic::generate(&config.synthetic)?;
    let (train_idx, test_idx) =
        split_indices(samples.len(), config.test_fraction, config.split_seed)?;

    let (train_rows, train_targets) = to_rows(&samples, &train_idx);
    let (test_rows, test_targets) = to_rows(&samples, &test_idx);

    log::info!(
        "Training demand model on {} rows ({} held out, {} trees)",
        train_rows.len(),
        test_rows.len(),
        config.forest.n_estimators
    );

    let forest = RandomForest::fit(&train_rows, &train_targets, &config.forest)?;
    let predictions = forest.predict(&test_rows)?;

    let report = TrainingReport {
        train_rows: train_rows.len(),
        test_rows: test_rows.len(),
        rmse: metrics::rmse(&predictions, &test_targets),
        mae: metrics::mae(&predictions, &test_targets),
        r2: metrics::r2(&predictions, &test_targets),
    };

    log::info!(
        "Held-out RMSE={:.4} MAE={:.4} R2={:.4}",
        report.rmse,
        report.mae,
        report.r2
    );

    let model = LoadedModel::new(FeatureName::ALL.to_vec(), forest)?;
    Ok((model, report))
}

/// Trains a model and persists it at `artifact_path`, overwriting any
/// previous artifact.
///
/// # Errors
///
/// Returns an error if training fails or the artifact cannot be written.
pub fn train(config: &TrainerConfig, artifact_path: &Path) -> Result<LoadedModel, ModelError> {
    let (model, _report) = fit(config)?;
    artifact::write(artifact_path, &model)?;
    log::info!("Model trained and saved to {}", artifact_path.display());
    Ok(model)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::BTreeSet;

    use crate::DemandModel as _;

    use super::*;

    /// A configuration small enough to train in unit tests.
    pub(crate) fn quick_config() -> TrainerConfig {
        TrainerConfig {
            synthetic: SyntheticConfig {
                samples: 300,
                ..SyntheticConfig::default()
            },
            forest: ForestParams {
                n_estimators: 8,
                ..ForestParams::default()
            },
            ..TrainerConfig::default()
        }
    }

    #[test]
    fn split_sizes_follow_ceiling_rule() {
        let (train, test) = split_indices(2500, 0.15, 42).unwrap();
        assert_eq!(test.len(), 375);
        assert_eq!(train.len(), 2125);

        let (train, test) = split_indices(10, 0.15, 42).unwrap();
        assert_eq!(test.len(), 2);
        assert_eq!(train.len(), 8);
    }

    #[test]
    fn split_partitions_every_index_once() {
        let (train, test) = split_indices(100, 0.15, 7).unwrap();
        let all: BTreeSet<usize> = train.iter().chain(&test).copied().collect();
        assert_eq!(all.len(), 100);
        assert_eq!(all.into_iter().collect::<Vec<_>>(), (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn split_is_seeded() {
        assert_eq!(
            split_indices(50, 0.2, 1).unwrap(),
            split_indices(50, 0.2, 1).unwrap()
        );
        assert_ne!(
            split_indices(50, 0.2, 1).unwrap(),
            split_indices(50, 0.2, 2).unwrap()
        );
    }

    #[test]
    fn split_rejects_bad_fractions() {
        assert!(split_indices(10, 0.0, 1).is_err());
        assert!(split_indices(10, 1.0, 1).is_err());
        assert!(split_indices(10, f64::NAN, 1).is_err());
        assert!(split_indices(1, 0.5, 1).is_err());
    }

    #[test]
    fn fit_records_canonical_feature_order() {
        let (model, report) = fit(&quick_config()).unwrap();
        assert_eq!(model.features(), &FeatureName::ALL);
        assert_eq!(model.forest().n_trees(), 8);
        assert_eq!(report.test_rows, 45);
        assert_eq!(report.train_rows, 255);
        assert!(report.rmse.is_finite());
    }

    #[test]
    fn fit_is_reproducible() {
        let (a, _) = fit(&quick_config()).unwrap();
        let (b, _) = fit(&quick_config()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn train_persists_artifact() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("demand_model.msgpack");

        let model = train(&quick_config(), &path).unwrap();

        assert!(path.is_file());
        assert_eq!(artifact::read(&path).unwrap(), model);
    }
}
