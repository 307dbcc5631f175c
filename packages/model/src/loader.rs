//! Startup model resolution.
//!
//! A [`ModelLoader`] is the uninitialized model: it knows where the
//! artifact lives and how to train one. [`ModelLoader::initialize`]
//! consumes it and yields the ready [`LoadedModel`]. There is no way back
//! and no way to reload, so the model is fixed for the life of the process.

use std::path::{Path, PathBuf};

use crate::trainer::{self, TrainerConfig};
use crate::{DemandModel as _, LoadedModel, ModelError, artifact, paths};

/// How the ready model was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// An existing artifact was decoded.
    Loaded,
    /// No artifact existed, so a model was trained and persisted.
    Trained,
}

/// Resolves the process-wide demand model exactly once.
#[derive(Debug, Clone)]
pub struct ModelLoader {
    artifact_path: PathBuf,
    trainer: TrainerConfig,
}

impl Default for ModelLoader {
    fn default() -> Self {
        Self::new(paths::default_model_path())
    }
}

impl ModelLoader {
    /// Creates a loader for the artifact at `artifact_path` using the
    /// default training configuration.
    #[must_use]
    pub fn new(artifact_path: impl Into<PathBuf>) -> Self {
        Self {
            artifact_path: artifact_path.into(),
            trainer: TrainerConfig::default(),
        }
    }

    /// Overrides the configuration used if training is needed.
    #[must_use]
    pub fn with_trainer_config(mut self, trainer: TrainerConfig) -> Self {
        self.trainer = trainer;
        self
    }

    /// Where the artifact is read from and written to.
    #[must_use]
    pub fn artifact_path(&self) -> &Path {
        &self.artifact_path
    }

    /// Loads the persisted model, or trains and persists one if no
    /// artifact exists yet.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Decode`] if an existing artifact is corrupt;
    /// it is never silently retrained over. Training and write failures
    /// are returned as-is.
    pub fn initialize(self) -> Result<(LoadedModel, LoadOutcome), ModelError> {
        if self.artifact_path.is_file() {
            log::info!("Loading demand model from {}", self.artifact_path.display());
            let model = artifact::read(&self.artifact_path)?;
            log::info!(
                "Loaded demand model ({} trees, features: {})",
                model.forest().n_trees(),
                model
                    .features()
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(",")
            );
            return Ok((model, LoadOutcome::Loaded));
        }

        log::info!(
            "No demand model at {}, training a new one",
            self.artifact_path.display()
        );
        let model = trainer::train(&self.trainer, &self.artifact_path)?;
        Ok((model, LoadOutcome::Trained))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trainer::tests::quick_config;

    #[test]
    fn trains_when_artifact_is_missing_then_loads_it() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("models").join("demand_model.msgpack");

        let (trained, outcome) = ModelLoader::new(&path)
            .with_trainer_config(quick_config())
            .initialize()
            .unwrap();
        assert_eq!(outcome, LoadOutcome::Trained);
        assert!(path.is_file());

        let (loaded, outcome) = ModelLoader::new(&path)
            .with_trainer_config(quick_config())
            .initialize()
            .unwrap();
        assert_eq!(outcome, LoadOutcome::Loaded);
        assert_eq!(loaded, trained);
    }

    #[test]
    fn existing_artifact_short_circuits_training() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("demand_model.msgpack");
        trainer::train(&quick_config(), &path).unwrap();
        let before = std::fs::read(&path).unwrap();

        // A config that would fail to train proves training is skipped.
        let mut broken = quick_config();
        broken.test_fraction = 2.0;
        let (_, outcome) = ModelLoader::new(&path)
            .with_trainer_config(broken)
            .initialize()
            .unwrap();

        assert_eq!(outcome, LoadOutcome::Loaded);
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[test]
    fn corrupt_artifact_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("demand_model.msgpack");
        std::fs::write(&path, b"garbage").unwrap();

        let err = ModelLoader::new(&path)
            .with_trainer_config(quick_config())
            .initialize()
            .unwrap_err();

        assert!(matches!(err, ModelError::Decode(_)));
        assert_eq!(std::fs::read(&path).unwrap(), b"garbage");
    }

    #[test]
    fn default_loader_targets_data_models() {
        assert_eq!(
            ModelLoader::default().artifact_path(),
            paths::default_model_path()
        );
    }
}
