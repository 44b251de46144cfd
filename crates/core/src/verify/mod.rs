//! Content and security verification.
//!
//! All checks are read-only. Every result carries a verdict (`passed` or
//! `safe`) and a list of [`VerifyIssue`]s; the verdict is false exactly when
//! an issue is [`Severity::Error`] or worse.
//!
//! Stream details come from a [`MediaProber`]. [`FallbackProber`] uses
//! ffprobe and falls back to filename heuristics when ffprobe is missing.

mod content;
mod error;
mod header;
mod prober;
mod security;
mod types;
mod walk;

pub use content::{quick_verify, verify_content};
pub use error::VerifyError;
pub use prober::{
    resolution_for_quality, FallbackProber, FfprobeProber, HeuristicProber, MediaProber,
};
pub use security::{quick_safety_check, scan_directory, scan_file};
pub use types::{
    issues_pass, AudioTrack, ContentVerifyOptions, ContentVerifyResult, DirectoryScanResult,
    IssueKind, MediaInfo, ProbeSource, QuickSafetyResult, QuickVerifyResult, SecurityScanResult,
    Severity, SubtitleTrack, VerifyIssue, VerifyReport, VideoInfo,
};
pub use walk::list_files;
