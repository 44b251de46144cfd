//! Error types for the queue module.

use thiserror::Error;

use crate::store::StoreError;
use crate::verify::VerifyError;

#[derive(Debug, Error)]
pub enum QueueError {
    /// The job's checks could not run.
    #[error(transparent)]
    Verify(#[from] VerifyError),

    /// The runner task panicked or was cancelled.
    #[error("Verification task aborted: {reason}")]
    RunnerAborted { reason: String },

    #[error("Invalid job: {reason}")]
    InvalidJob { reason: String },

    #[error("Result store error: {0}")]
    Store(#[from] StoreError),
}

impl QueueError {
    pub fn invalid_job(reason: impl Into<String>) -> Self {
        Self::InvalidJob {
            reason: reason.into(),
        }
    }
}
