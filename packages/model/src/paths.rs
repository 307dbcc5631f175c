//! Where the demand model artifact lives on disk.

use std::path::{Path, PathBuf};

/// File name of the persisted demand model.
pub const MODEL_FILE_NAME: &str = "demand_model.msgpack";

/// Workspace root, two levels above this crate's manifest.
///
/// # Panics
///
/// Panics if the crate is built outside a `packages/<name>` layout.
#[must_use]
pub fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .expect("crate manifest is not nested under the workspace root")
        .to_path_buf()
}

/// `<root>/data/models/demand_model.msgpack`.
#[must_use]
pub fn default_model_path() -> PathBuf {
    project_root()
        .join("data")
        .join("models")
        .join(MODEL_FILE_NAME)
}
