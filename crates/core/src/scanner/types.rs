//! Types for the directory scanner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::parser::ParsedMedia;

/// A library root to scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaFolder {
    pub path: PathBuf,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl MediaFolder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            enabled: true,
        }
    }
}

/// A media file discovered during a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannedItem {
    pub file_path: PathBuf,
    /// Library root the file was found under.
    pub folder: PathBuf,
    pub parsed: ParsedMedia,
    pub file_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

/// Lifecycle of a scan run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    #[default]
    Idle,
    Scanning,
    Completed,
    Failed,
}

/// Snapshot of scan progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanProgress {
    pub status: ScanStatus,
    /// Media files found in the counting pass.
    pub total_files: u64,
    pub scanned_files: u64,
    pub found_items: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_path: Option<PathBuf>,
    /// Warnings and the terminal error, in the order they happened.
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl ScanProgress {
    pub(crate) fn started() -> Self {
        Self {
            status: ScanStatus::Scanning,
            started_at: Some(Utc::now()),
            ..Default::default()
        }
    }
}

/// Outcome of a successful scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    pub items: Vec<ScannedItem>,
    pub errors: Vec<String>,
    pub duration_ms: u64,
}

/// Notifications published while scanning.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScanEvent {
    Progress(ScanProgress),
    Item(ScannedItem),
    Complete {
        items_found: u64,
        errors: Vec<String>,
        duration_ms: u64,
    },
    Error {
        message: String,
    },
}
