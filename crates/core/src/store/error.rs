//! Error types for the result store.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The results file exists but does not hold valid records.
    #[error("Results file {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    /// Failed to write the results file.
    #[error("Failed to write {path}: {error}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    #[error("Failed to serialize results: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn write_failed(path: PathBuf, error: std::io::Error) -> Self {
        Self::WriteFailed { path, error }
    }
}
