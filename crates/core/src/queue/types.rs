//! Types for the verification job queue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

use crate::verify::{ContentVerifyOptions, VerifyReport};

/// Priority used when a request does not name one.
pub const DEFAULT_PRIORITY: u8 = 5;

/// Scheduling parameters for [`super::VerifyQueue`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueConfig {
    /// Jobs allowed to run at once.
    pub max_concurrent: usize,
    /// Longest the scheduler sleeps before re-checking without being woken.
    pub poll_interval: Duration,
    pub cleanup_interval: Duration,
    /// Finished jobs older than this are dropped by housekeeping.
    pub max_job_age: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 2,
            poll_interval: Duration::from_millis(500),
            cleanup_interval: Duration::from_secs(3600),
            max_job_age: Duration::from_secs(24 * 3600),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobType {
    File,
    Folder,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::File => "file",
            JobType::Folder => "folder",
        }
    }
}

/// Which checks a job runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerifyMode {
    Content,
    Security,
    #[default]
    Both,
}

impl VerifyMode {
    pub fn includes_content(&self) -> bool {
        matches!(self, VerifyMode::Content | VerifyMode::Both)
    }

    pub fn includes_security(&self) -> bool {
        matches!(self, VerifyMode::Security | VerifyMode::Both)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobOptions {
    #[serde(default)]
    pub mode: VerifyMode,
    /// Descend into subfolders for folder jobs.
    #[serde(default = "default_recursive")]
    pub recursive: bool,
    #[serde(default)]
    pub content: ContentVerifyOptions,
}

impl Default for JobOptions {
    fn default() -> Self {
        Self {
            mode: VerifyMode::default(),
            recursive: default_recursive(),
            content: ContentVerifyOptions::default(),
        }
    }
}

fn default_recursive() -> bool {
    true
}

fn default_priority() -> u8 {
    DEFAULT_PRIORITY
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    /// Listing order: running, queued, completed, failed.
    pub(crate) fn rank(&self) -> u8 {
        match self {
            JobStatus::Running => 0,
            JobStatus::Queued => 1,
            JobStatus::Completed => 2,
            JobStatus::Failed => 3,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// A verification request tracked by the queue.
///
/// `Completed` means the checks ran; the verdict is in `result.passed`.
/// `Failed` means the checks could not run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyJob {
    pub id: Uuid,
    pub job_type: JobType,
    pub path: PathBuf,
    pub options: JobOptions,
    pub status: JobStatus,
    pub priority: u8,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<VerifyReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    /// Insertion order, breaks ties between equal timestamps.
    #[serde(skip)]
    pub(crate) seq: u64,
}

/// Body of an enqueue request.
#[derive(Debug, Clone, Deserialize)]
pub struct JobRequest {
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub path: PathBuf,
    #[serde(default)]
    pub options: JobOptions,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    #[serde(default = "default_priority")]
    pub priority: u8,
}

/// One path of a batch request.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchEntry {
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStatus {
    pub queued: usize,
    pub running: usize,
    pub completed: usize,
    pub failed: usize,
    pub total: usize,
    /// Whether the scheduling loop is active.
    pub processing: bool,
    pub max_concurrent: usize,
}
