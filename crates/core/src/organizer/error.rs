//! Error types for the organizer module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while organizing files.
///
/// Only `AlreadyOrganizing` and `Aborted` end a run. Everything else is
/// recorded on the affected item and the batch continues.
#[derive(Debug, Error)]
pub enum OrganizerError {
    /// Another organize run is in progress.
    #[error("An organize run is already in progress")]
    AlreadyOrganizing,

    /// The run was aborted.
    #[error("Organize aborted")]
    Aborted,

    /// Failed to create destination directory.
    #[error("Failed to create directory {path}: {error}")]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// Failed to copy file.
    #[error("Failed to copy {from} to {to}: {error}")]
    CopyFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// Failed to move/rename file.
    #[error("Failed to move {from} to {to}: {error}")]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// Failed to create a hard link.
    #[error("Failed to hardlink {from} to {to}: {error}")]
    HardlinkFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// Failed to delete a file.
    #[error("Failed to remove {path}: {error}")]
    RemoveFailed {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// Checksum verification failed.
    #[error("Checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    /// Every numbered alternative was taken.
    #[error("No free name for {path} after {attempts} attempts")]
    NoFreeName { path: PathBuf, attempts: u32 },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl OrganizerError {
    /// Creates a copy failed error.
    pub fn copy_failed(from: PathBuf, to: PathBuf, error: std::io::Error) -> Self {
        Self::CopyFailed { from, to, error }
    }

    /// Creates a move failed error.
    pub fn move_failed(from: PathBuf, to: PathBuf, error: std::io::Error) -> Self {
        Self::MoveFailed { from, to, error }
    }

    /// Creates a hardlink failed error.
    pub fn hardlink_failed(from: PathBuf, to: PathBuf, error: std::io::Error) -> Self {
        Self::HardlinkFailed { from, to, error }
    }

    /// Creates a remove failed error.
    pub fn remove_failed(path: PathBuf, error: std::io::Error) -> Self {
        Self::RemoveFailed { path, error }
    }
}
