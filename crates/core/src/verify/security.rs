//! Security checks for downloaded files.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use std::path::Path;
use tokio::fs;

use super::content::media_type_of;
use super::error::VerifyError;
use super::header::{is_executable, read_header};
use super::types::{
    issues_pass, DirectoryScanResult, IssueKind, QuickSafetyResult, SecurityScanResult, Severity,
    VerifyIssue,
};
use super::walk::list_files;
use crate::parser::{is_media_extension, MediaType};

const DANGEROUS_EXTENSIONS: &[&str] = &[
    "exe", "bat", "cmd", "com", "scr", "pif", "msi", "msp", "vbs", "vbe", "js", "jse", "wsf",
    "wsh", "ps1", "psm1", "jar", "hta", "cpl", "reg", "dll", "sh", "app", "apk", "run",
];

const ARCHIVE_EXTENSIONS: &[&str] = &["zip", "rar", "7z", "tar", "gz", "tgz", "bz2", "xz", "iso", "dmg"];

const SHORTCUT_EXTENSIONS: &[&str] = &["lnk", "url", "desktop", "webloc", "scf"];

static SUSPICIOUS_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:keygen|crack(?:ed)?|activator|serial|setup|installer|password|codec[\s._-]?pack|click[\s._-]?here|free[\s._-]?download)\b",
    )
    .expect("suspicious name pattern must compile")
});

/// Tiny media files are usually bait or placeholders.
fn tiny_media_threshold(media_type: MediaType) -> Option<u64> {
    match media_type {
        MediaType::Movie | MediaType::Series => Some(1024 * 1024),
        MediaType::Music => Some(16 * 1024),
        _ => None,
    }
}

/// Checks that only look at the name.
fn filename_issues(filename: &str) -> Vec<VerifyIssue> {
    let mut issues = Vec::new();
    let parts: Vec<String> = filename
        .split('.')
        .map(|part| part.trim().to_ascii_lowercase())
        .collect();

    if parts.len() >= 2 {
        let last = parts[parts.len() - 1].as_str();
        if DANGEROUS_EXTENSIONS.contains(&last) {
            let hidden = parts[1..parts.len() - 1]
                .iter()
                .rev()
                .find(|part| is_media_extension(part));
            match hidden {
                Some(media) => issues.push(VerifyIssue::new(
                    IssueKind::DoubleExtension,
                    Severity::Critical,
                    format!("Executable .{} disguised as .{}", last, media),
                )),
                None => issues.push(VerifyIssue::new(
                    IssueKind::DangerousExtension,
                    Severity::Critical,
                    format!("Dangerous file type .{}", last),
                )),
            }
        } else if ARCHIVE_EXTENSIONS.contains(&last) {
            issues.push(VerifyIssue::new(
                IssueKind::Archive,
                Severity::Warning,
                format!("Archive .{} in a media download", last),
            ));
        } else if SHORTCUT_EXTENSIONS.contains(&last) {
            issues.push(VerifyIssue::new(
                IssueKind::Shortcut,
                Severity::Warning,
                format!("Shortcut .{} in a media download", last),
            ));
        }
    }

    if let Some(keyword) = SUSPICIOUS_NAME.find(filename) {
        issues.push(VerifyIssue::new(
            IssueKind::SuspiciousName,
            Severity::Warning,
            format!("Suspicious keyword '{}' in filename", keyword.as_str()),
        ));
    }

    issues
}

/// Filename-only safety verdict.
pub fn quick_safety_check(filename: &str) -> QuickSafetyResult {
    let issues = filename_issues(filename);
    QuickSafetyResult {
        filename: filename.to_string(),
        safe: issues_pass(&issues),
        issues,
    }
}

/// Name, size and header checks for one file.
pub async fn scan_file(path: &Path) -> Result<SecurityScanResult, VerifyError> {
    let metadata = fs::metadata(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            VerifyError::not_found(path)
        } else {
            VerifyError::Io(e)
        }
    })?;

    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut issues = filename_issues(&filename);

    if metadata.is_file() {
        let declared_executable = issues.iter().any(|issue| {
            matches!(
                issue.kind,
                IssueKind::DangerousExtension | IssueKind::DoubleExtension
            )
        });
        if !declared_executable && metadata.len() > 0 {
            let header = read_header(path).await?;
            if is_executable(&header) {
                issues.push(VerifyIssue::new(
                    IssueKind::ExecutableContent,
                    Severity::Critical,
                    "File contains executable code",
                ));
            }
        }

        if let Some(threshold) = tiny_media_threshold(media_type_of(path)) {
            if metadata.len() < threshold {
                issues.push(VerifyIssue::new(
                    IssueKind::TinyMedia,
                    Severity::Warning,
                    format!("Media file is only {} bytes", metadata.len()),
                ));
            }
        }
    }

    Ok(SecurityScanResult {
        path: path.to_path_buf(),
        safe: issues_pass(&issues),
        issues,
    })
}

/// Anything that could not be read counts against the folder.
fn directory_safe(flagged: &[SecurityScanResult], errors: &[String]) -> bool {
    errors.is_empty() && flagged.iter().all(|result| result.safe)
}

/// Runs [`scan_file`] over every file in a directory.
pub async fn scan_directory(path: &Path, recursive: bool) -> Result<DirectoryScanResult, VerifyError> {
    let (files, mut errors) = list_files(path, recursive).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            VerifyError::not_found(path)
        } else {
            VerifyError::Io(e)
        }
    })?;

    let mut flagged = Vec::new();
    for file in &files {
        match scan_file(file).await {
            Ok(result) if !result.issues.is_empty() => flagged.push(result),
            Ok(_) => {}
            Err(e) => errors.push(format!("{}: {}", file.display(), e)),
        }
    }

    Ok(DirectoryScanResult {
        path: path.to_path_buf(),
        safe: directory_safe(&flagged, &errors),
        files_scanned: files.len(),
        flagged,
        errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;
    use tempfile::TempDir;

    fn kinds(issues: &[VerifyIssue]) -> Vec<IssueKind> {
        issues.iter().map(|issue| issue.kind).collect()
    }

    #[test]
    fn test_quick_safety_check() {
        let result = quick_safety_check("Inception.2010.1080p.BluRay.x264.mkv");
        assert!(result.safe);
        assert!(result.issues.is_empty());

        let result = quick_safety_check("Inception.2010.1080p.mkv.exe");
        assert!(!result.safe);
        assert_eq!(kinds(&result.issues), vec![IssueKind::DoubleExtension]);

        let result = quick_safety_check("movie.avi   .scr");
        assert_eq!(kinds(&result.issues), vec![IssueKind::DoubleExtension]);

        let result = quick_safety_check("setup.exe");
        assert_eq!(
            kinds(&result.issues),
            vec![IssueKind::DangerousExtension, IssueKind::SuspiciousName]
        );

        let result = quick_safety_check("Movie.2010.rar");
        assert!(result.safe);
        assert_eq!(kinds(&result.issues), vec![IssueKind::Archive]);

        let result = quick_safety_check("Watch Online.url");
        assert_eq!(kinds(&result.issues), vec![IssueKind::Shortcut]);

        let result = quick_safety_check("Movie.2010.KEYGEN.txt");
        assert!(result.safe);
        assert_eq!(kinds(&result.issues), vec![IssueKind::SuspiciousName]);
    }

    #[tokio::test]
    async fn test_scan_file_detects_executable_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sample.mkv");
        let mut bytes = b"MZ".to_vec();
        bytes.resize(2 * 1024 * 1024, 0);
        std::fs::write(&path, &bytes).unwrap();

        let result = scan_file(&path).await.unwrap();
        assert!(!result.safe);
        assert_eq!(kinds(&result.issues), vec![IssueKind::ExecutableContent]);
    }

    #[tokio::test]
    async fn test_scan_file_tiny_media_is_a_warning() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Movie.2010.mkv");
        std::fs::write(&path, vec![0u8; 100]).unwrap();

        let result = scan_file(&path).await.unwrap();
        assert!(result.safe);
        assert_eq!(kinds(&result.issues), vec![IssueKind::TinyMedia]);
    }

    #[tokio::test]
    async fn test_scan_file_missing() {
        let err = scan_file(Path::new("/nonexistent/file.mkv")).await.unwrap_err();
        assert!(matches!(err, VerifyError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_scan_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("extras")).unwrap();
        std::fs::write(dir.path().join("readme.txt"), b"hello").unwrap();
        std::fs::write(dir.path().join("extras/movie.mp4.exe"), b"x").unwrap();

        let flat = scan_directory(dir.path(), false).await.unwrap();
        assert!(flat.safe);
        assert_eq!(flat.files_scanned, 1);
        assert!(flat.flagged.is_empty());

        let deep = scan_directory(dir.path(), true).await.unwrap();
        assert!(!deep.safe);
        assert_eq!(deep.files_scanned, 2);
        assert_eq!(deep.flagged.len(), 1);
        assert_eq!(
            kinds(&deep.flagged[0].issues),
            vec![IssueKind::DoubleExtension]
        );
    }

    #[test]
    fn test_unreadable_entries_make_directory_unsafe() {
        let warning = SecurityScanResult {
            path: "Movie.rar".into(),
            safe: true,
            issues: vec![VerifyIssue::new(IssueKind::Archive, Severity::Warning, "archive")],
        };
        assert!(directory_safe(&[], &[]));
        assert!(directory_safe(&[warning.clone()], &[]));
        assert!(!directory_safe(
            &[warning],
            &["/dl/locked: Permission denied".to_string()]
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_scan_directory_with_locked_subdirectory() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("readme.txt"), b"hello").unwrap();
        let locked = dir.path().join("locked");
        std::fs::create_dir_all(&locked).unwrap();
        std::fs::write(locked.join("hidden.mkv"), b"x").unwrap();
        if !fixtures::lock_directory(&locked).unwrap() {
            // Permissions are not enforced for this user.
            return;
        }

        let result = scan_directory(dir.path(), true).await;
        fixtures::unlock_directory(&locked).unwrap();
        let result = result.unwrap();

        assert!(!result.safe);
        assert!(result.flagged.is_empty());
        assert_eq!(result.files_scanned, 1);
        assert_eq!(result.errors.len(), 1);
    }

    #[tokio::test]
    async fn test_scan_directory_missing() {
        let dir = TempDir::new().unwrap();
        let err = scan_directory(&dir.path().join("gone"), true).await.unwrap_err();
        assert!(matches!(err, VerifyError::NotFound { .. }));
    }
}
