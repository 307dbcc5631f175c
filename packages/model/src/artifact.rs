//! On-disk model artifact.
//!
//! A single `MessagePack` file holding the ordered feature list and the
//! fitted forest. The file carries no schema version: an artifact written
//! with a different feature set is only caught if it no longer decodes.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write as _};
use std::path::Path;

use crate::{DemandModel as _, LoadedModel, ModelError};

/// Writes `model` to `path`, replacing any existing artifact.
///
/// The bytes go to a sibling temporary file first and are renamed into
/// place, so a crash mid-write never leaves a truncated artifact behind.
///
/// # Errors
///
/// Returns [`ModelError::Io`] if the file cannot be written or
/// [`ModelError::Encode`] if serialization fails.
pub fn write(path: &Path, model: &LoadedModel) -> Result<(), ModelError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension("msgpack.tmp");
    {
        let mut writer = BufWriter::new(File::create(&tmp_path)?);
        rmp_serde::encode::write_named(&mut writer, model)?;
        writer.flush()?;
    }
    std::fs::rename(&tmp_path, path)?;

    log::debug!("Wrote model artifact to {}", path.display());
    Ok(())
}

/// Reads the artifact at `path`.
///
/// # Errors
///
/// Returns [`ModelError::Io`] if the file cannot be opened or
/// [`ModelError::Decode`] if its contents are not a valid artifact.
pub fn read(path: &Path) -> Result<LoadedModel, ModelError> {
    let reader = BufReader::new(File::open(path)?);
    let model: LoadedModel = rmp_serde::decode::from_read(reader)?;

    log::debug!(
        "Read model artifact from {} ({} features, {} trees)",
        path.display(),
        model.features().len(),
        model.forest().n_trees()
    );
    Ok(model)
}
