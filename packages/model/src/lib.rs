#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Demand model lifecycle: training, persistence, and startup loading.
//!
//! The process bootstrap builds a [`loader::ModelLoader`] and calls
//! [`loader::ModelLoader::initialize`] exactly once. That either decodes
//! the persisted artifact or trains a fresh model and persists it. The
//! resulting [`LoadedModel`] is immutable and is shared read-only with
//! every scoring request through the [`DemandModel`] trait.

pub mod artifact;
pub mod loader;
pub mod paths;
pub mod trainer;

use foodlink_demand_models::FeatureName;
use foodlink_forest::{ForestError, RandomForest};
use foodlink_synthetic::SyntheticError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use loader::{LoadOutcome, ModelLoader};
pub use trainer::{TrainerConfig, TrainingReport};

/// Errors that can occur while training, persisting, loading, or
/// evaluating the demand model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The artifact could not be serialized.
    #[error("Artifact encode error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    /// The artifact could not be deserialized.
    #[error("Artifact decode error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    /// Synthetic training data could not be generated.
    #[error("Synthetic data error: {0}")]
    Synthetic(#[from] SyntheticError),

    /// The estimator failed to fit or predict.
    #[error("Estimator error: {0}")]
    Forest(#[from] ForestError),

    /// The configuration or feature list is unusable.
    #[error("Invalid model configuration: {message}")]
    InvalidConfig {
        /// Description of what went wrong.
        message: String,
    },
}

/// A fitted regression model that scores feature rows.
///
/// Rows passed to [`Self::predict`] must be laid out in the order
/// returned by [`Self::features`].
pub trait DemandModel: Send + Sync {
    /// Feature names in the order the model was trained on.
    fn features(&self) -> &[FeatureName];

    /// Scores a batch of rows.
    ///
    /// # Errors
    ///
    /// Returns an error if any row does not match the model's input width.
    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, ModelError>;
}

/// The process-wide demand model: a fitted forest and the ordered feature
/// names its columns correspond to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedModel {
    features: Vec<FeatureName>,
    forest: RandomForest,
}

impl LoadedModel {
    /// Pairs a fitted forest with its column names.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidConfig`] if the number of names does
    /// not match the forest's input width.
    pub fn new(features: Vec<FeatureName>, forest: RandomForest) -> Result<Self, ModelError> {
        if features.len() != forest.n_features() {
            return Err(ModelError::InvalidConfig {
                message: format!(
                    "{} feature names for a forest with {} inputs",
                    features.len(),
                    forest.n_features()
                ),
            });
        }
        Ok(Self { features, forest })
    }

    /// The underlying estimator.
    #[must_use]
    pub const fn forest(&self) -> &RandomForest {
        &self.forest
    }
}

impl DemandModel for LoadedModel {
    fn features(&self) -> &[FeatureName] {
        &self.features
    }

    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, ModelError> {
        Ok(self.forest.predict(rows)?)
    }
}

#[cfg(test)]
mod tests {
    use foodlink_forest::ForestParams;

    use super::*;

    fn forest_with_width(width: usize) -> RandomForest {
        let rows: Vec<Vec<f64>> = (0..10).map(|i| vec![f64::from(i); width]).collect();
        let targets: Vec<f64> = (0..10).map(f64::from).collect();
        RandomForest::fit(
            &rows,
            &targets,
            &ForestParams {
                n_estimators: 2,
                ..ForestParams::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn new_rejects_mismatched_feature_count() {
        let err = LoadedModel::new(vec![FeatureName::Lat], forest_with_width(2)).unwrap_err();
        assert!(matches!(err, ModelError::InvalidConfig { .. }));
    }

    #[test]
    fn predict_surfaces_width_errors() {
        let model =
            LoadedModel::new(vec![FeatureName::Lat, FeatureName::Lon], forest_with_width(2))
                .unwrap();
        assert_eq!(model.predict(&[vec![1.0, 2.0]]).unwrap().len(), 1);
        assert!(matches!(
            model.predict(&[vec![1.0]]),
            Err(ModelError::Forest(ForestError::FeatureCount { .. }))
        ));
    }
}
