//! Types for content and security verification.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How a [`MediaInfo`] was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeSource {
    Ffprobe,
    /// Guessed from the filename only.
    Heuristic,
    Mock,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub codec: String,
    pub width: u32,
    pub height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate_kbps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framerate: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioTrack {
    pub codec: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channels: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate_kbps: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleTrack {
    pub codec: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default)]
    pub forced: bool,
}

/// Container and stream details of a media file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    pub container: String,
    /// Seconds. `None` when unknown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
    pub size_bytes: u64,
    /// Overall bitrate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate_kbps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<VideoInfo>,
    #[serde(default)]
    pub audio_tracks: Vec<AudioTrack>,
    #[serde(default)]
    pub subtitle_tracks: Vec<SubtitleTrack>,
    pub source: ProbeSource,
}

/// Issue severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    /// Whether an issue of this severity fails verification.
    pub fn is_failure(&self) -> bool {
        *self >= Severity::Error
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    // Content
    Missing,
    Empty,
    HeaderMismatch,
    Executable,
    TooSmall,
    ProbeFailed,
    ZeroDuration,
    NoVideo,
    NoAudio,
    LowResolution,
    LowBitrate,
    DurationMismatch,
    TooShort,
    MissingAudioLanguage,
    MissingSubtitleLanguage,
    HeuristicProbe,
    // Security
    DangerousExtension,
    DoubleExtension,
    ExecutableContent,
    Archive,
    Shortcut,
    SuspiciousName,
    TinyMedia,
}

/// A single finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyIssue {
    pub kind: IssueKind,
    pub severity: Severity,
    pub message: String,
}

impl VerifyIssue {
    pub fn new(kind: IssueKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            message: message.into(),
        }
    }
}

/// True when no issue is an error or worse.
pub fn issues_pass(issues: &[VerifyIssue]) -> bool {
    !issues.iter().any(|issue| issue.severity.is_failure())
}

/// Expectations checked by content verification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentVerifyOptions {
    /// Expected runtime. Deviations above 10% are reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_duration_secs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_duration_secs: Option<f64>,
    /// Overrides the quality parsed from the filename, e.g. "1080p".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_quality: Option<String>,
    /// Treat a video without audio as an error instead of a warning.
    #[serde(default)]
    pub require_audio: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_audio_languages: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_subtitle_languages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentVerifyResult {
    pub path: PathBuf,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_info: Option<MediaInfo>,
    pub issues: Vec<VerifyIssue>,
}

/// Existence, size and header checks without probing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickVerifyResult {
    pub path: PathBuf,
    pub passed: bool,
    pub size_bytes: u64,
    /// MIME type recognized from the file header.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_type: Option<String>,
    pub issues: Vec<VerifyIssue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityScanResult {
    pub path: PathBuf,
    pub safe: bool,
    pub issues: Vec<VerifyIssue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryScanResult {
    pub path: PathBuf,
    pub safe: bool,
    pub files_scanned: usize,
    /// Files with at least one issue.
    pub flagged: Vec<SecurityScanResult>,
    /// Entries that could not be read. Any entry here makes the folder unsafe.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// Filename-only safety verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickSafetyResult {
    pub filename: String,
    pub safe: bool,
    pub issues: Vec<VerifyIssue>,
}

/// Combined outcome of verifying a file or folder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerifyReport {
    pub passed: bool,
    pub files_checked: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<ContentVerifyResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<SecurityScanResult>,
}
