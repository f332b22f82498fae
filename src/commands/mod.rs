//! Command handlers dispatched from `main`.

pub mod aggregate;
pub mod process;


use crate::error::RinkError;
use std::path::PathBuf;

/// Bridge storage-layer failures into the domain error.
pub(crate) fn storage_err(err: anyhow::Error) -> RinkError {
    RinkError::Storage {
        message: err.to_string(),
    }
}

/// The raw-bundle directory is required whenever games have to be
/// processed rather than read back from the cache.
pub(crate) fn require_input_dir(input_dir: Option<PathBuf>) -> crate::error::Result<PathBuf> {
    input_dir.ok_or_else(|| RinkError::Config {
        message: "--input-dir is required to process raw games".to_string(),
    })
}
