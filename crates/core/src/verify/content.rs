//! Content integrity and quality checks.

use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;
use tracing::debug;

use super::header::{detect_mime, header_matches, is_executable, read_header};
use super::prober::{resolution_for_quality, MediaProber};
use super::types::{
    issues_pass, ContentVerifyOptions, ContentVerifyResult, IssueKind, MediaInfo, ProbeSource,
    QuickVerifyResult, Severity, VerifyIssue,
};
use crate::parser::{media_type_for_extension, parse, MediaType};

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;

/// Allowed relative deviation from the expected duration.
const DURATION_TOLERANCE: f64 = 0.10;

/// Result of the checks that need no probing.
struct FileChecks {
    size_bytes: u64,
    detected_type: Option<String>,
    issues: Vec<VerifyIssue>,
    /// Probing would be pointless or unsafe.
    fatal: bool,
}

pub(crate) fn media_type_of(path: &Path) -> MediaType {
    path.extension()
        .map(|ext| media_type_for_extension(&ext.to_string_lossy().to_ascii_lowercase()))
        .unwrap_or(MediaType::Unknown)
}

fn is_video(media_type: MediaType) -> bool {
    matches!(media_type, MediaType::Movie | MediaType::Series)
}

fn size_issue(media_type: MediaType, size: u64) -> Option<VerifyIssue> {
    let (error_below, warn_below) = match media_type {
        MediaType::Movie | MediaType::Series => (MIB, 20 * MIB),
        MediaType::Music => (8 * KIB, 64 * KIB),
        MediaType::Book => (0, KIB),
        MediaType::Unknown => return None,
    };
    if size < error_below {
        Some(VerifyIssue::new(
            IssueKind::TooSmall,
            Severity::Error,
            format!("File is implausibly small for {} ({} bytes)", media_type, size),
        ))
    } else if size < warn_below {
        Some(VerifyIssue::new(
            IssueKind::TooSmall,
            Severity::Warning,
            format!("File is unusually small for {} ({} bytes)", media_type, size),
        ))
    } else {
        None
    }
}

async fn check_file(path: &Path) -> FileChecks {
    let mut checks = FileChecks {
        size_bytes: 0,
        detected_type: None,
        issues: Vec::new(),
        fatal: true,
    };

    let metadata = match fs::metadata(path).await {
        Ok(metadata) if metadata.is_file() => metadata,
        Ok(_) => {
            checks.issues.push(VerifyIssue::new(
                IssueKind::Missing,
                Severity::Critical,
                "Path is not a regular file",
            ));
            return checks;
        }
        Err(e) => {
            let message = if e.kind() == ErrorKind::NotFound {
                "File does not exist".to_string()
            } else {
                format!("File cannot be accessed: {}", e)
            };
            checks
                .issues
                .push(VerifyIssue::new(IssueKind::Missing, Severity::Critical, message));
            return checks;
        }
    };

    checks.size_bytes = metadata.len();
    if checks.size_bytes == 0 {
        checks
            .issues
            .push(VerifyIssue::new(IssueKind::Empty, Severity::Critical, "File is empty"));
        return checks;
    }

    let header = match read_header(path).await {
        Ok(header) => header,
        Err(e) => {
            checks.issues.push(VerifyIssue::new(
                IssueKind::Missing,
                Severity::Critical,
                format!("File cannot be read: {}", e),
            ));
            return checks;
        }
    };
    checks.detected_type = detect_mime(&header);

    if is_executable(&header) {
        checks.issues.push(VerifyIssue::new(
            IssueKind::Executable,
            Severity::Critical,
            "File content is an executable",
        ));
        return checks;
    }

    let media_type = media_type_of(path);
    if !header_matches(media_type, &header) {
        checks.issues.push(VerifyIssue::new(
            IssueKind::HeaderMismatch,
            Severity::Error,
            format!(
                "File header ({}) does not match its extension",
                checks.detected_type.as_deref().unwrap_or("unknown")
            ),
        ));
    }
    checks.issues.extend(size_issue(media_type, checks.size_bytes));
    checks.fatal = false;
    checks
}

/// Existence, size and header checks. Does not run the prober.
pub async fn quick_verify(path: &Path) -> QuickVerifyResult {
    let checks = check_file(path).await;
    QuickVerifyResult {
        path: path.to_path_buf(),
        passed: issues_pass(&checks.issues),
        size_bytes: checks.size_bytes,
        detected_type: checks.detected_type,
        issues: checks.issues,
    }
}

/// Full verification: file checks, then probing and stream checks.
pub async fn verify_content<P: MediaProber + ?Sized>(
    prober: &P,
    path: &Path,
    options: &ContentVerifyOptions,
) -> ContentVerifyResult {
    let checks = check_file(path).await;
    let mut issues = checks.issues;

    let media_info = if checks.fatal {
        None
    } else {
        match prober.probe(path).await {
            Ok(info) => {
                issues.extend(stream_issues(path, &info, options));
                Some(info)
            }
            Err(e) => {
                debug!(path = %path.display(), prober = prober.name(), error = %e, "Probe failed");
                issues.push(VerifyIssue::new(
                    IssueKind::ProbeFailed,
                    Severity::Error,
                    format!("Could not read media streams: {}", e),
                ));
                None
            }
        }
    };

    ContentVerifyResult {
        path: path.to_path_buf(),
        passed: issues_pass(&issues),
        media_info,
        issues,
    }
}

/// Minimum plausible video bitrate, keyed on frame width so letterboxed
/// encodes are judged by their nominal resolution.
/// True when `actual` is more than 10% under `claimed`. Cropped encodes get the slack.
fn below_claimed(actual: u32, claimed: u32) -> bool {
    u64::from(actual) * 10 < u64::from(claimed) * 9
}

fn bitrate_floor_kbps(width: u32) -> u32 {
    match width {
        w if w >= 3400 => 8_000,
        w if w >= 1700 => 2_000,
        w if w >= 1150 => 1_000,
        _ => 400,
    }
}

fn stream_issues(path: &Path, info: &MediaInfo, options: &ContentVerifyOptions) -> Vec<VerifyIssue> {
    let mut issues = Vec::new();
    let media_type = media_type_of(path);
    let heuristic = info.source == ProbeSource::Heuristic;

    if heuristic {
        issues.push(VerifyIssue::new(
            IssueKind::HeuristicProbe,
            Severity::Info,
            "Stream details were estimated from the filename",
        ));
    } else {
        if info.duration_secs.is_some_and(|d| d <= 0.0) {
            issues.push(VerifyIssue::new(
                IssueKind::ZeroDuration,
                Severity::Error,
                "Media reports zero duration",
            ));
        }

        if is_video(media_type) && info.video.is_none() {
            issues.push(VerifyIssue::new(
                IssueKind::NoVideo,
                Severity::Error,
                "Video file has no video stream",
            ));
        }

        if (is_video(media_type) || media_type == MediaType::Music) && info.audio_tracks.is_empty()
        {
            let severity = if options.require_audio || media_type == MediaType::Music {
                Severity::Error
            } else {
                Severity::Warning
            };
            issues.push(VerifyIssue::new(IssueKind::NoAudio, severity, "No audio track found"));
        }
    }

    if let Some(video) = info.video.as_ref().filter(|v| v.width > 0) {
        let claimed = options.expected_quality.clone().or_else(|| {
            let filename = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            parse(&filename).quality
        });

        if let Some((quality, (width, height))) = claimed
            .as_deref()
            .and_then(|q| resolution_for_quality(q).map(|res| (q, res)))
        {
            if below_claimed(video.width, width) && below_claimed(video.height, height) {
                issues.push(VerifyIssue::new(
                    IssueKind::LowResolution,
                    Severity::Warning,
                    format!(
                        "Resolution {}x{} is below the claimed {}",
                        video.width, video.height, quality
                    ),
                ));
            }
        }

        if let Some(bitrate) = video.bitrate_kbps.or(info.bitrate_kbps) {
            let floor = bitrate_floor_kbps(video.width);
            if bitrate < floor {
                issues.push(VerifyIssue::new(
                    IssueKind::LowBitrate,
                    Severity::Warning,
                    format!(
                        "Bitrate {} kbps is low for {}x{} (expected at least {} kbps)",
                        bitrate, video.width, video.height, floor
                    ),
                ));
            }
        }
    }

    if let Some(duration) = info.duration_secs.filter(|d| *d > 0.0) {
        if let Some(expected) = options.expected_duration_secs.filter(|e| *e > 0.0) {
            if (duration - expected).abs() > expected * DURATION_TOLERANCE {
                issues.push(VerifyIssue::new(
                    IssueKind::DurationMismatch,
                    Severity::Warning,
                    format!(
                        "Duration {:.0}s differs from the expected {:.0}s",
                        duration, expected
                    ),
                ));
            }
        }
        if let Some(min) = options.min_duration_secs {
            if duration < min {
                issues.push(VerifyIssue::new(
                    IssueKind::TooShort,
                    Severity::Error,
                    format!("Duration {:.0}s is below the minimum {:.0}s", duration, min),
                ));
            }
        }
    }

    if !heuristic {
        for language in &options.required_audio_languages {
            let present = info.audio_tracks.iter().any(|track| {
                track
                    .language
                    .as_deref()
                    .is_some_and(|l| l.eq_ignore_ascii_case(language))
            });
            if !present {
                issues.push(VerifyIssue::new(
                    IssueKind::MissingAudioLanguage,
                    Severity::Warning,
                    format!("No audio track in language '{}'", language),
                ));
            }
        }
        for language in &options.required_subtitle_languages {
            let present = info.subtitle_tracks.iter().any(|track| {
                track
                    .language
                    .as_deref()
                    .is_some_and(|l| l.eq_ignore_ascii_case(language))
            });
            if !present {
                issues.push(VerifyIssue::new(
                    IssueKind::MissingSubtitleLanguage,
                    Severity::Warning,
                    format!("No subtitle track in language '{}'", language),
                ));
            }
        }
    }

    issues
}
