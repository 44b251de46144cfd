//! Error types for the verify module.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerifyError {
    /// Path does not exist.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// ffprobe binary is not installed.
    #[error("ffprobe not found at '{path}'")]
    FfprobeNotFound { path: String },

    /// ffprobe ran but failed.
    #[error("Probe failed: {reason}")]
    ProbeFailed { reason: String },

    /// ffprobe did not finish in time.
    #[error("Probe timed out after {timeout_secs} seconds")]
    ProbeTimeout { timeout_secs: u64 },

    /// ffprobe output could not be parsed.
    #[error("Failed to parse probe output: {reason}")]
    ParseError { reason: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl VerifyError {
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    pub fn probe_failed(reason: impl Into<String>) -> Self {
        Self::ProbeFailed {
            reason: reason.into(),
        }
    }
}
