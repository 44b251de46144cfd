//! Types for the file organizer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::naming::NamingConfig;
use crate::parser::MediaType;

/// Filesystem operation used to place a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrganizeOperation {
    #[default]
    Move,
    Copy,
    Hardlink,
}

impl fmt::Display for OrganizeOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrganizeOperation::Move => "move",
            OrganizeOperation::Copy => "copy",
            OrganizeOperation::Hardlink => "hardlink",
        };
        f.write_str(name)
    }
}

/// What to do when the destination already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictResolution {
    /// Leave both files alone and report a conflict.
    #[default]
    Skip,
    /// Pick the first free "name (N).ext".
    Rename,
    /// Delete the existing destination first.
    Overwrite,
}

impl fmt::Display for ConflictResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConflictResolution::Skip => "skip",
            ConflictResolution::Rename => "rename",
            ConflictResolution::Overwrite => "overwrite",
        };
        f.write_str(name)
    }
}

/// Destination root per media type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destinations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movies: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub books: Option<PathBuf>,
}

impl Destinations {
    /// Root for a media type, if one is configured.
    pub fn for_type(&self, media_type: MediaType) -> Option<&Path> {
        match media_type {
            MediaType::Movie => self.movies.as_deref(),
            MediaType::Series => self.series.as_deref(),
            MediaType::Music => self.music.as_deref(),
            MediaType::Book => self.books.as_deref(),
            MediaType::Unknown => None,
        }
    }

    /// Configured roots with their media type.
    pub fn iter(&self) -> impl Iterator<Item = (MediaType, &Path)> {
        [
            (MediaType::Movie, self.movies.as_deref()),
            (MediaType::Series, self.series.as_deref()),
            (MediaType::Music, self.music.as_deref()),
            (MediaType::Book, self.books.as_deref()),
        ]
        .into_iter()
        .filter_map(|(media_type, root)| root.map(|root| (media_type, root)))
    }
}

/// Settings for one organize run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganizeOptions {
    #[serde(default)]
    pub destinations: Destinations,
    #[serde(default)]
    pub naming: NamingConfig,
    #[serde(default)]
    pub operation: OrganizeOperation,
    #[serde(default)]
    pub conflict_resolution: ConflictResolution,
    #[serde(default)]
    pub cleanup_empty_folders: bool,
    #[serde(default)]
    pub verify_checksums: bool,
    #[serde(default)]
    pub dry_run: bool,
}

/// Outcome of organizing one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
    Success,
    Skipped,
    Failed,
    Conflict,
    #[serde(rename = "dry-run")]
    DryRun,
}

impl ResultStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultStatus::Success => "success",
            ResultStatus::Skipped => "skipped",
            ResultStatus::Failed => "failed",
            ResultStatus::Conflict => "conflict",
            ResultStatus::DryRun => "dry-run",
        }
    }
}

/// Per-item organize result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizeResult {
    pub source_path: PathBuf,
    /// Absent when no destination root is configured for the item's type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_path: Option<PathBuf>,
    /// Operation actually performed. A hardlink that fell back to a copy reports `copy`.
    pub operation: OrganizeOperation,
    pub status: ResultStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict_action: Option<ConflictResolution>,
}

impl OrganizeResult {
    pub(crate) fn new(
        source_path: PathBuf,
        destination_path: Option<PathBuf>,
        operation: OrganizeOperation,
        status: ResultStatus,
    ) -> Self {
        Self {
            source_path,
            destination_path,
            operation,
            status,
            error: None,
            conflict_action: None,
        }
    }

    pub(crate) fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub(crate) fn with_conflict_action(mut self, action: Option<ConflictResolution>) -> Self {
        self.conflict_action = action;
        self
    }
}

/// Aggregate counts for a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizeSummary {
    pub total: usize,
    pub moved: usize,
    pub copied: usize,
    pub hardlinked: usize,
    pub skipped: usize,
    pub conflicts: usize,
    pub dry_run: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub results: Vec<OrganizeResult>,
}

impl OrganizeSummary {
    /// Derives the counters from per-item outcomes.
    pub fn from_results(results: Vec<OrganizeResult>, duration_ms: u64) -> Self {
        let mut summary = Self {
            total: results.len(),
            duration_ms,
            ..Default::default()
        };
        for result in &results {
            match (result.status, result.operation) {
                (ResultStatus::Success, OrganizeOperation::Move) => summary.moved += 1,
                (ResultStatus::Success, OrganizeOperation::Copy) => summary.copied += 1,
                (ResultStatus::Success, OrganizeOperation::Hardlink) => summary.hardlinked += 1,
                (ResultStatus::Skipped, _) => summary.skipped += 1,
                (ResultStatus::Conflict, _) => summary.conflicts += 1,
                (ResultStatus::DryRun, _) => summary.dry_run += 1,
                (ResultStatus::Failed, _) => summary.failed += 1,
            }
        }
        summary.results = results;
        summary
    }
}

/// Lifecycle of an organize run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrganizerStatus {
    #[default]
    Idle,
    Organizing,
    Completed,
    Failed,
}

/// Snapshot of organize progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizeProgress {
    pub status: OrganizerStatus,
    pub total: usize,
    pub processed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Notifications published while organizing.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrganizeEvent {
    Progress(OrganizeProgress),
    Item(OrganizeResult),
    Complete {
        total: usize,
        failed: usize,
        duration_ms: u64,
    },
    Error {
        message: String,
    },
}
