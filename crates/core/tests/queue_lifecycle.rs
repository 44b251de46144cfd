//! Verification queue integration tests.
//!
//! These tests drive the queue with the real media verifier and a JSON file
//! store, using a mock prober in place of ffprobe:
//! - File and folder jobs end with reports on the job
//! - Completed reports survive a store reopen
//! - Unsafe downloads are rejected without failing the job
//! - Missing paths fail the job and are not persisted

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;
use uuid::Uuid;

use mediashelf_core::{
    queue::{
        BatchEntry, JobOptions, JobStatus, JobType, QueueConfig, VerifyMode, DEFAULT_PRIORITY,
    },
    store::ResultStore,
    testing::{fixtures, MockProber},
    JsonFileStore, MediaVerifier, VerifyQueue,
};

struct TestHarness {
    queue: VerifyQueue,
    prober: Arc<MockProber>,
    store_path: PathBuf,
    media: TempDir,
    _data: TempDir,
}

impl TestHarness {
    async fn new() -> Self {
        let data = TempDir::new().expect("Failed to create data dir");
        let media = TempDir::new().expect("Failed to create media dir");
        let store_path = data.path().join("results/verify-results.json");

        let store = JsonFileStore::open(&store_path)
            .await
            .expect("Failed to open result store");
        let prober = Arc::new(MockProber::new());
        let runner = MediaVerifier::new(Arc::clone(&prober));
        let config = QueueConfig {
            poll_interval: Duration::from_millis(20),
            ..Default::default()
        };

        Self {
            queue: VerifyQueue::new(config, Arc::new(runner), Arc::new(store)),
            prober,
            store_path,
            media,
            _data: data,
        }
    }

    /// Creates a sparse file of `size` bytes.
    fn media_file(&self, relative: &str, size: u64) -> PathBuf {
        let path = self.media.path().join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::File::create(&path).unwrap().set_len(size).unwrap();
        path
    }

    async fn wait_for(&self, id: Uuid) -> mediashelf_core::VerifyJob {
        for _ in 0..500 {
            if let Some(job) = self.queue.job(id).await {
                if job.status.is_terminal() {
                    return job;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("job {} did not finish", id);
    }
}

const MIB: u64 = 1024 * 1024;

fn path_str(path: &Path) -> String {
    path.display().to_string()
}

#[tokio::test]
async fn test_file_job_is_verified_and_persisted() {
    let harness = TestHarness::new().await;
    let movie = harness.media_file("Inception.2010.1080p.BluRay.mkv", 40 * MIB);
    harness
        .prober
        .set_info(&movie, fixtures::media_info_1080p(8880.0));

    let id = harness
        .queue
        .add_job(
            JobType::File,
            &movie,
            JobOptions::default(),
            Some(json!({ "kind": "download", "id": "abc123" })),
            DEFAULT_PRIORITY,
        )
        .await;
    let job = harness.wait_for(id).await;

    assert_eq!(job.status, JobStatus::Completed);
    let report = job.result.unwrap();
    assert!(report.passed, "{:?}", report);
    assert_eq!(report.content.len(), 1);
    assert_eq!(report.security.len(), 1);

    let reopened = JsonFileStore::open(&harness.store_path).await.unwrap();
    let stored = reopened.get("download:abc123").await.unwrap().unwrap();
    assert_eq!(stored.job_id, id);
    assert_eq!(path_str(&stored.path), path_str(&movie));
    assert!(stored.passed);
}

#[tokio::test]
async fn test_unsafe_folder_is_rejected_not_failed() {
    let harness = TestHarness::new().await;
    let movie = harness.media_file("Release/Movie.2020.1080p.mkv", 40 * MIB);
    harness.media_file("Release/Movie.2020.1080p.mkv.exe", 1024);
    harness
        .prober
        .set_info(&movie, fixtures::media_info_1080p(6000.0));

    let id = harness
        .queue
        .add_job(
            JobType::Folder,
            harness.media.path().join("Release"),
            JobOptions::default(),
            None,
            DEFAULT_PRIORITY,
        )
        .await;
    let job = harness.wait_for(id).await;

    assert_eq!(job.status, JobStatus::Completed);
    let report = job.result.unwrap();
    assert!(!report.passed);
    assert_eq!(report.files_checked, 2);
    assert_eq!(report.security.len(), 1);

    let results = harness.queue.results().await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].key, format!("job:{}", id));
    assert!(!results[0].passed);
}

#[tokio::test]
async fn test_missing_path_fails_job() {
    let harness = TestHarness::new().await;

    let id = harness
        .queue
        .add_job(
            JobType::File,
            harness.media.path().join("gone.mkv"),
            JobOptions::default(),
            None,
            DEFAULT_PRIORITY,
        )
        .await;
    let job = harness.wait_for(id).await;

    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.error.unwrap().contains("gone.mkv"));
    assert!(job.result.is_none());
    assert!(harness.queue.results().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_security_only_batch_skips_probing() {
    let harness = TestHarness::new().await;
    let a = harness.media_file("a/Show.S01E01.mkv", 40 * MIB);
    let b = harness.media_file("b/Show.S01E02.mkv", 40 * MIB);

    let options = JobOptions {
        mode: VerifyMode::Security,
        ..Default::default()
    };
    let ids = harness
        .queue
        .add_batch(
            vec![
                BatchEntry { job_type: JobType::File, path: a },
                BatchEntry { job_type: JobType::Folder, path: b.parent().unwrap().to_path_buf() },
            ],
            options,
            None,
            DEFAULT_PRIORITY,
        )
        .await;

    for id in ids {
        let job = harness.wait_for(id).await;
        assert_eq!(job.status, JobStatus::Completed);
        let report = job.result.unwrap();
        assert!(report.passed);
        assert!(report.content.is_empty());
    }
    assert_eq!(harness.prober.probe_count(), 0);

    let status = harness.queue.status().await;
    assert_eq!(status.completed, 2);
    assert_eq!(status.max_concurrent, 2);
    assert_eq!(harness.queue.clear_completed().await, 2);
    assert_eq!(harness.queue.status().await.total, 0);
}
