//! Scan-then-organize integration tests.
//!
//! These tests run the directory scanner over a download folder and feed the
//! result to the file organizer:
//! - Default naming lands files in the expected library layout
//! - Conflicts are resolved per the configured strategy
//! - Dry runs and previews agree on destinations
//! - Scanner and organizer are reusable across runs

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tokio_test::assert_ok;

use mediashelf_core::{
    organizer::{
        ConflictResolution, Destinations, OrganizeOperation, OrganizeOptions, OrganizerStatus,
        ResultStatus,
    },
    preview_organization,
    scanner::ScanStatus,
    DirectoryScanner, FileOrganizer, MediaFolder, MediaType,
};

struct TestHarness {
    downloads: TempDir,
    library: TempDir,
    scanner: DirectoryScanner,
    organizer: FileOrganizer,
}

impl TestHarness {
    fn new() -> Self {
        Self {
            downloads: TempDir::new().expect("Failed to create downloads dir"),
            library: TempDir::new().expect("Failed to create library dir"),
            scanner: DirectoryScanner::new(),
            organizer: FileOrganizer::new(),
        }
    }

    fn write_download(&self, relative: &str, contents: &[u8]) -> PathBuf {
        let path = self.downloads.path().join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn options(&self, operation: OrganizeOperation) -> OrganizeOptions {
        OrganizeOptions {
            destinations: Destinations {
                movies: Some(self.library.path().join("Movies")),
                series: Some(self.library.path().join("TV")),
                music: Some(self.library.path().join("Music")),
                books: Some(self.library.path().join("Books")),
            },
            operation,
            cleanup_empty_folders: true,
            ..Default::default()
        }
    }

    fn library_path(&self, relative: &str) -> PathBuf {
        self.library.path().join(relative)
    }

    fn folders(&self) -> Vec<MediaFolder> {
        vec![MediaFolder::new(self.downloads.path())]
    }
}

fn read(path: &Path) -> Vec<u8> {
    std::fs::read(path).unwrap_or_else(|e| panic!("{}: {}", path.display(), e))
}

#[tokio::test]
async fn test_scan_and_move_into_library() {
    let harness = TestHarness::new();
    harness.write_download(
        "Inception.2010.1080p.BluRay.x264-GROUP/Inception.2010.1080p.BluRay.x264-GROUP.mkv",
        b"movie",
    );
    harness.write_download(
        "Breaking.Bad.S01E01.Pilot.720p.BluRay.x264-DEMAND.mkv",
        b"episode",
    );
    harness.write_download("Some Author - Some Book.epub", b"book");
    harness.write_download("notes.txt", b"ignored");

    let scan = assert_ok!(harness.scanner.scan(&harness.folders()).await);
    assert_eq!(scan.items.len(), 3);
    assert!(scan.errors.is_empty());
    assert_eq!(harness.scanner.progress().await.status, ScanStatus::Completed);

    let summary = harness
        .organizer
        .organize(&scan.items, &harness.options(OrganizeOperation::Move))
        .await
        .unwrap();

    assert_eq!(summary.total, 3);
    assert_eq!(summary.moved, 3);
    assert_eq!(summary.failed, 0);
    assert_eq!(
        read(&harness.library_path("Movies/Inception (2010)/Inception (2010) [1080p].mkv")),
        b"movie"
    );
    assert_eq!(
        read(&harness.library_path(
            "TV/Breaking Bad/Season 01/Breaking Bad - S01E01 - Pilot [720p].mkv"
        )),
        b"episode"
    );
    assert!(!harness
        .downloads
        .path()
        .join("Inception.2010.1080p.BluRay.x264-GROUP")
        .exists());
    assert!(harness.downloads.path().join("notes.txt").exists());
    assert_eq!(
        harness.organizer.progress().await.status,
        OrganizerStatus::Completed
    );
}

#[tokio::test]
async fn test_preview_matches_dry_run_and_real_run() {
    let harness = TestHarness::new();
    harness.write_download("Inception.2010.1080p.BluRay.x264-GROUP.mkv", b"movie");
    harness.write_download("Breaking.Bad.S01E02.720p.HDTV.mkv", b"episode");

    let scan = assert_ok!(harness.scanner.scan(&harness.folders()).await);
    let mut options = harness.options(OrganizeOperation::Copy);

    let preview = preview_organization(&scan.items, &options);
    assert!(preview.iter().all(|r| r.status == ResultStatus::DryRun));

    options.dry_run = true;
    let dry = assert_ok!(harness.organizer.organize(&scan.items, &options).await);
    assert_eq!(dry.dry_run, 2);
    assert!(!harness.library_path("Movies").exists());

    options.dry_run = false;
    let real = assert_ok!(harness.organizer.organize(&scan.items, &options).await);
    assert_eq!(real.copied, 2);

    for (previewed, placed) in preview.iter().zip(real.results.iter()) {
        assert_eq!(previewed.source_path, placed.source_path);
        assert_eq!(previewed.destination_path, placed.destination_path);
        assert!(placed.destination_path.as_ref().unwrap().exists());
        assert!(placed.source_path.exists());
    }
}

#[tokio::test]
async fn test_conflict_strategies_across_runs() {
    let harness = TestHarness::new();
    harness.write_download("Inception.2010.1080p.mkv", b"first");
    let scan = assert_ok!(harness.scanner.scan(&harness.folders()).await);
    let target = harness.library_path("Movies/Inception (2010)/Inception (2010) [1080p].mkv");

    let mut options = harness.options(OrganizeOperation::Copy);
    assert_ok!(harness.organizer.organize(&scan.items, &options).await);
    assert_eq!(read(&target), b"first");

    harness.write_download("Inception.2010.1080p.mkv", b"second");

    options.conflict_resolution = ConflictResolution::Skip;
    let skipped = assert_ok!(harness.organizer.organize(&scan.items, &options).await);
    assert_eq!(skipped.conflicts, 1);
    assert_eq!(skipped.results[0].status, ResultStatus::Conflict);
    assert_eq!(read(&target), b"first");

    options.conflict_resolution = ConflictResolution::Rename;
    let renamed = assert_ok!(harness.organizer.organize(&scan.items, &options).await);
    assert_eq!(
        renamed.results[0].destination_path.as_deref(),
        Some(
            harness
                .library_path("Movies/Inception (2010)/Inception (2010) [1080p] (1).mkv")
                .as_path()
        )
    );
    assert_eq!(read(&target), b"first");

    options.conflict_resolution = ConflictResolution::Overwrite;
    let overwritten = assert_ok!(harness.organizer.organize(&scan.items, &options).await);
    assert_eq!(overwritten.results[0].status, ResultStatus::Success);
    assert_eq!(read(&target), b"second");
}

#[tokio::test]
async fn test_unconfigured_types_are_skipped() {
    let harness = TestHarness::new();
    harness.write_download("Artist - Album - 03 - Title.flac", b"song");
    harness.write_download("Inception.2010.1080p.mkv", b"movie");

    let scan = assert_ok!(harness.scanner.scan(&harness.folders()).await);
    let music: Vec<_> = scan
        .items
        .iter()
        .filter(|item| item.parsed.media_type == MediaType::Music)
        .collect();
    assert_eq!(music.len(), 1);

    let mut options = harness.options(OrganizeOperation::Move);
    options.destinations.music = None;

    let summary = assert_ok!(harness.organizer.organize(&scan.items, &options).await);
    assert_eq!(summary.moved, 1);
    assert_eq!(summary.skipped, 1);
    assert!(harness
        .downloads
        .path()
        .join("Artist - Album - 03 - Title.flac")
        .exists());
}

#[tokio::test]
async fn test_hardlink_keeps_source() {
    let harness = TestHarness::new();
    let source = harness.write_download("Inception.2010.1080p.mkv", b"movie");

    let scan = assert_ok!(harness.scanner.scan(&harness.folders()).await);
    let summary = harness
        .organizer
        .organize(&scan.items, &harness.options(OrganizeOperation::Hardlink))
        .await
        .unwrap();

    assert_eq!(summary.hardlinked, 1);
    assert!(source.exists());
    assert_eq!(
        read(&harness.library_path("Movies/Inception (2010)/Inception (2010) [1080p].mkv")),
        b"movie"
    );
}
