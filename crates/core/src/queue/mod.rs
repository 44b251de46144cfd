//! Background verification job queue.
//!
//! Jobs are checked by a [`JobRunner`] (normally [`MediaVerifier`]) with at
//! most `max_concurrent` running at once. Higher priority jobs are picked
//! first; equal priorities run in submission order. Completed reports are
//! written to a [`crate::store::ResultStore`].
//!
//! A job whose checks ran is `completed` even when the file was rejected;
//! `failed` is reserved for jobs whose checks could not run.

mod error;
mod runner;
mod types;
mod verify_queue;

pub use error::QueueError;
pub use runner::{JobRunner, MediaVerifier};
pub use types::{
    BatchEntry, JobOptions, JobRequest, JobStatus, JobType, QueueConfig, QueueStatus, VerifyJob,
    VerifyMode, DEFAULT_PRIORITY,
};
pub use verify_queue::{Subscription, VerifyQueue};
