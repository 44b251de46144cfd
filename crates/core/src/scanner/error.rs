//! Error types for the scanner module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that end a scan run.
#[derive(Debug, Error)]
pub enum ScanError {
    /// A scan is already in progress on this scanner.
    #[error("A scan is already in progress")]
    AlreadyScanning,

    /// A configured media folder does not exist or is not a directory.
    #[error("Media folder not found: {path}")]
    FolderNotFound { path: PathBuf },

    /// Reading a directory or file failed for a reason other than permissions.
    #[error("Failed to read {path}: {error}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// The scan was aborted.
    #[error("Scan aborted")]
    Aborted,
}

impl ScanError {
    /// Creates a read failed error.
    pub fn read_failed(path: impl Into<PathBuf>, error: std::io::Error) -> Self {
        Self::ReadFailed {
            path: path.into(),
            error,
        }
    }
}
