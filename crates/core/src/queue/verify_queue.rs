//! Priority queue that runs verification jobs in the background.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::{broadcast, Notify, RwLock};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::error::QueueError;
use super::runner::JobRunner;
use super::types::{
    BatchEntry, JobOptions, JobStatus, JobType, QueueConfig, QueueStatus, VerifyJob,
};
use crate::metrics;
use crate::store::{ResultStore, StoredResult};
use crate::verify::VerifyReport;

type Callback = Arc<dyn Fn(&VerifyJob) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: AtomicU64,
    entries: Mutex<Vec<(u64, Callback)>>,
}

impl Listeners {
    fn snapshot(&self) -> Vec<Callback> {
        match self.entries.lock() {
            Ok(entries) => entries.iter().map(|(_, cb)| Arc::clone(cb)).collect(),
            Err(poisoned) => poisoned
                .into_inner()
                .iter()
                .map(|(_, cb)| Arc::clone(cb))
                .collect(),
        }
    }
}

/// Handle returned by [`VerifyQueue::on_job_complete`].
///
/// Dropping it keeps the callback registered; call [`Subscription::unsubscribe`]
/// to remove it. Unsubscribing twice, or after the queue is gone, does nothing.
pub struct Subscription {
    id: u64,
    listeners: Weak<Listeners>,
}

impl Subscription {
    pub fn unsubscribe(&self) {
        if let Some(listeners) = self.listeners.upgrade() {
            let mut entries = match listeners.entries.lock() {
                Ok(entries) => entries,
                Err(poisoned) => poisoned.into_inner(),
            };
            entries.retain(|(id, _)| *id != self.id);
        }
    }
}

struct QueueInner {
    config: QueueConfig,
    runner: Arc<dyn JobRunner>,
    store: Arc<dyn ResultStore>,
    jobs: RwLock<HashMap<Uuid, VerifyJob>>,
    next_seq: AtomicU64,
    running: AtomicUsize,
    processing: AtomicBool,
    wake: Notify,
    listeners: Arc<Listeners>,
    housekeeping: AtomicBool,
    shutdown_tx: broadcast::Sender<()>,
}

/// Verification job queue.
///
/// Jobs are picked highest priority first, oldest first among equals, and at
/// most `max_concurrent` run at once. Cloning yields another handle to the
/// same queue.
#[derive(Clone)]
pub struct VerifyQueue {
    inner: Arc<QueueInner>,
}

impl VerifyQueue {
    /// A `max_concurrent` of zero is raised to one.
    pub fn new(
        mut config: QueueConfig,
        runner: Arc<dyn JobRunner>,
        store: Arc<dyn ResultStore>,
    ) -> Self {
        if config.max_concurrent == 0 {
            warn!("max_concurrent is 0, running one job at a time");
            config.max_concurrent = 1;
        }
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            inner: Arc::new(QueueInner {
                config,
                runner,
                store,
                jobs: RwLock::new(HashMap::new()),
                next_seq: AtomicU64::new(0),
                running: AtomicUsize::new(0),
                processing: AtomicBool::new(false),
                wake: Notify::new(),
                listeners: Arc::new(Listeners::default()),
                housekeeping: AtomicBool::new(false),
                shutdown_tx,
            }),
        }
    }

    pub fn config(&self) -> &QueueConfig {
        &self.inner.config
    }

    /// Enqueues a job and makes sure the scheduler is running.
    pub async fn add_job(
        &self,
        job_type: JobType,
        path: impl Into<PathBuf>,
        options: JobOptions,
        metadata: Option<serde_json::Value>,
        priority: u8,
    ) -> Uuid {
        let job = self.inner.new_job(job_type, path.into(), options, metadata, priority);
        let id = job.id;
        debug!(job_id = %id, path = %job.path.display(), priority, "Job queued");

        {
            let mut jobs = self.inner.jobs.write().await;
            jobs.insert(id, job);
            update_depth(&jobs);
        }

        self.ensure_processing();
        id
    }

    /// Enqueues one job per entry, all sharing the same options and metadata.
    pub async fn add_batch(
        &self,
        entries: Vec<BatchEntry>,
        options: JobOptions,
        metadata: Option<serde_json::Value>,
        priority: u8,
    ) -> Vec<Uuid> {
        let batch: Vec<VerifyJob> = entries
            .into_iter()
            .map(|entry| {
                self.inner.new_job(
                    entry.job_type,
                    entry.path,
                    options.clone(),
                    metadata.clone(),
                    priority,
                )
            })
            .collect();
        let ids: Vec<Uuid> = batch.iter().map(|job| job.id).collect();

        {
            let mut jobs = self.inner.jobs.write().await;
            for job in batch {
                jobs.insert(job.id, job);
            }
            update_depth(&jobs);
        }
        debug!(count = ids.len(), priority, "Batch queued");

        if !ids.is_empty() {
            self.ensure_processing();
        }
        ids
    }

    pub async fn job(&self, id: Uuid) -> Option<VerifyJob> {
        self.inner.jobs.read().await.get(&id).cloned()
    }

    /// Running first, then queued, completed and failed. Within a status,
    /// higher priority first, then oldest first.
    pub async fn all_jobs(&self) -> Vec<VerifyJob> {
        let mut jobs: Vec<VerifyJob> = self.inner.jobs.read().await.values().cloned().collect();
        jobs.sort_by(|a, b| {
            a.status
                .rank()
                .cmp(&b.status.rank())
                .then(b.priority.cmp(&a.priority))
                .then(a.seq.cmp(&b.seq))
        });
        jobs
    }

    /// Newest jobs first.
    pub async fn recent_jobs(&self, limit: usize) -> Vec<VerifyJob> {
        let mut jobs: Vec<VerifyJob> = self.inner.jobs.read().await.values().cloned().collect();
        jobs.sort_by(|a, b| b.seq.cmp(&a.seq));
        jobs.truncate(limit);
        jobs
    }

    pub async fn status(&self) -> QueueStatus {
        let jobs = self.inner.jobs.read().await;
        let mut status = QueueStatus {
            total: jobs.len(),
            processing: self.inner.processing.load(Ordering::SeqCst),
            max_concurrent: self.inner.config.max_concurrent,
            ..Default::default()
        };
        for job in jobs.values() {
            match job.status {
                JobStatus::Queued => status.queued += 1,
                JobStatus::Running => status.running += 1,
                JobStatus::Completed => status.completed += 1,
                JobStatus::Failed => status.failed += 1,
            }
        }
        status
    }

    /// Removes a job that has not started yet. Returns false otherwise.
    pub async fn cancel_job(&self, id: Uuid) -> bool {
        let mut jobs = self.inner.jobs.write().await;
        match jobs.get(&id) {
            Some(job) if job.status == JobStatus::Queued => {
                jobs.remove(&id);
                update_depth(&jobs);
                debug!(job_id = %id, "Job cancelled");
                true
            }
            _ => false,
        }
    }

    /// Drops completed and failed jobs. Returns how many were removed.
    pub async fn clear_completed(&self) -> usize {
        let mut jobs = self.inner.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|_, job| !job.status.is_terminal());
        before - jobs.len()
    }

    /// Drops finished jobs that completed more than `age` ago.
    pub async fn prune_older_than(&self, age: Duration) -> usize {
        self.inner.prune_older_than(age).await
    }

    /// Calls `callback` with every job that reaches a terminal status.
    ///
    /// A panicking callback is logged and does not affect the queue.
    pub fn on_job_complete<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&VerifyJob) + Send + Sync + 'static,
    {
        let listeners = &self.inner.listeners;
        let id = listeners.next_id.fetch_add(1, Ordering::SeqCst);
        let mut entries = match listeners.entries.lock() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };
        let callback: Callback = Arc::new(callback);
        entries.push((id, callback));

        Subscription {
            id,
            listeners: Arc::downgrade(listeners),
        }
    }

    /// Persisted results, newest first.
    pub async fn results(&self) -> Result<Vec<StoredResult>, QueueError> {
        Ok(self.inner.store.all().await?)
    }

    /// Starts the periodic sweep of old finished jobs.
    pub fn start_housekeeping(&self) {
        if self.inner.housekeeping.swap(true, Ordering::SeqCst) {
            warn!("Queue housekeeping already running");
            return;
        }

        let inner = Arc::clone(&self.inner);
        let mut shutdown_rx = self.inner.shutdown_tx.subscribe();
        let interval = self.inner.config.cleanup_interval;
        let max_age = self.inner.config.max_job_age;

        tokio::spawn(async move {
            info!(
                interval_secs = interval.as_secs(),
                "Queue housekeeping started"
            );
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Queue housekeeping shutting down");
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {
                        let removed = inner.prune_older_than(max_age).await;
                        if removed > 0 {
                            info!(removed, "Pruned finished verification jobs");
                        }
                    }
                }
            }
        });
    }

    /// Stops housekeeping. Running jobs are left to finish.
    pub fn shutdown(&self) {
        if self.inner.housekeeping.swap(false, Ordering::SeqCst) {
            let _ = self.inner.shutdown_tx.send(());
        }
    }

    fn ensure_processing(&self) {
        if self.inner.processing.swap(true, Ordering::SeqCst) {
            self.inner.wake.notify_one();
            return;
        }
        let inner = Arc::clone(&self.inner);
        tokio::spawn(process_loop(inner));
    }
}

impl QueueInner {
    fn new_job(
        &self,
        job_type: JobType,
        path: PathBuf,
        options: JobOptions,
        metadata: Option<serde_json::Value>,
        priority: u8,
    ) -> VerifyJob {
        VerifyJob {
            id: Uuid::new_v4(),
            job_type,
            path,
            options,
            status: JobStatus::Queued,
            priority,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            result: None,
            error: None,
            metadata,
            seq: self.next_seq.fetch_add(1, Ordering::SeqCst),
        }
    }

    async fn has_queued(&self) -> bool {
        self.jobs
            .read()
            .await
            .values()
            .any(|job| job.status == JobStatus::Queued)
    }

    /// Marks the best queued job as running and returns a copy of it.
    async fn claim_next(&self) -> Option<VerifyJob> {
        let mut jobs = self.jobs.write().await;
        let id = jobs
            .values()
            .filter(|job| job.status == JobStatus::Queued)
            .min_by(|a, b| b.priority.cmp(&a.priority).then(a.seq.cmp(&b.seq)))
            .map(|job| job.id)?;

        let job = jobs.get_mut(&id)?;
        job.status = JobStatus::Running;
        job.started_at = Some(Utc::now());
        let claimed = job.clone();
        self.running.fetch_add(1, Ordering::SeqCst);
        update_depth(&jobs);
        Some(claimed)
    }

    async fn finish(&self, job: VerifyJob, outcome: Result<VerifyReport, QueueError>, elapsed: Duration) {
        metrics::VERIFY_JOB_DURATION
            .with_label_values(&[job.job_type.as_str()])
            .observe(elapsed.as_secs_f64());

        let (status, report, failure) = match outcome {
            Ok(report) => (JobStatus::Completed, Some(report), None),
            Err(e) => (JobStatus::Failed, None, Some(e.to_string())),
        };

        match (&report, &failure) {
            (Some(report), _) => {
                let label = if report.passed { "passed" } else { "rejected" };
                metrics::VERIFY_JOBS.with_label_values(&[label]).inc();
                info!(
                    job_id = %job.id,
                    path = %job.path.display(),
                    passed = report.passed,
                    "Verification job completed"
                );
                self.persist(&job, report).await;
            }
            (None, Some(reason)) => {
                metrics::VERIFY_JOBS.with_label_values(&["failed"]).inc();
                warn!(
                    job_id = %job.id,
                    path = %job.path.display(),
                    error = %reason,
                    "Verification job failed"
                );
            }
            (None, None) => {}
        }

        let finished = {
            let mut jobs = self.jobs.write().await;
            let finished = jobs.get_mut(&job.id).map(|stored| {
                stored.status = status;
                stored.completed_at = Some(Utc::now());
                stored.result = report;
                stored.error = failure;
                stored.clone()
            });
            update_depth(&jobs);
            finished
        };

        if let Some(finished) = finished {
            for callback in self.listeners.snapshot() {
                if catch_unwind(AssertUnwindSafe(|| callback(&finished))).is_err() {
                    error!(job_id = %finished.id, "Job completion callback panicked");
                }
            }
        }

        // The slot stays taken until listeners have run.
        self.running.fetch_sub(1, Ordering::SeqCst);
        self.wake.notify_one();
    }

    async fn persist(&self, job: &VerifyJob, report: &VerifyReport) {
        let record = StoredResult {
            key: result_key(job),
            job_id: job.id,
            path: job.path.clone(),
            passed: report.passed,
            report: report.clone(),
            metadata: job.metadata.clone(),
            stored_at: Utc::now(),
        };
        if let Err(e) = self.store.put(record).await {
            warn!(job_id = %job.id, error = %e, "Failed to store verification result");
        }
    }

    async fn prune_older_than(&self, age: Duration) -> usize {
        let now = Utc::now();
        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|_, job| {
            let expired = job.status.is_terminal()
                && job
                    .completed_at
                    .and_then(|at| (now - at).to_std().ok())
                    .map(|elapsed| elapsed > age)
                    .unwrap_or(false);
            !expired
        });
        before - jobs.len()
    }
}

/// Scheduling loop. Exits when nothing is queued or running.
async fn process_loop(inner: Arc<QueueInner>) {
    debug!("Queue processing started");
    loop {
        while inner.running.load(Ordering::SeqCst) < inner.config.max_concurrent {
            match inner.claim_next().await {
                Some(job) => dispatch(&inner, job),
                None => break,
            }
        }

        if inner.running.load(Ordering::SeqCst) == 0 && !inner.has_queued().await {
            inner.processing.store(false, Ordering::SeqCst);
            // A job added between the check and the store saw `processing`
            // still set and did not start a loop.
            if inner.has_queued().await && !inner.processing.swap(true, Ordering::SeqCst) {
                continue;
            }
            break;
        }

        let _ = tokio::time::timeout(inner.config.poll_interval, inner.wake.notified()).await;
    }
    debug!("Queue processing idle");
}

fn dispatch(inner: &Arc<QueueInner>, job: VerifyJob) {
    debug!(job_id = %job.id, path = %job.path.display(), "Dispatching verification job");
    let inner = Arc::clone(inner);

    tokio::spawn(async move {
        let started = Instant::now();
        let runner = Arc::clone(&inner.runner);
        let run_job = job.clone();

        let outcome = match tokio::spawn(async move { runner.run(&run_job).await }).await {
            Ok(outcome) => outcome,
            Err(e) if e.is_panic() => Err(QueueError::RunnerAborted {
                reason: "verification panicked".to_string(),
            }),
            Err(_) => Err(QueueError::RunnerAborted {
                reason: "verification task cancelled".to_string(),
            }),
        };

        inner.finish(job, outcome, started.elapsed()).await;
    });
}

/// Store key for a finished job.
fn result_key(job: &VerifyJob) -> String {
    let named = job.metadata.as_ref().and_then(|meta| {
        let kind = meta.get("kind")?.as_str()?;
        let id = match meta.get("id")? {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Number(n) => n.to_string(),
            _ => return None,
        };
        Some(format!("{}:{}", kind, id))
    });
    named.unwrap_or_else(|| format!("job:{}", job.id))
}

fn update_depth(jobs: &HashMap<Uuid, VerifyJob>) {
    let (mut queued, mut running) = (0i64, 0i64);
    for job in jobs.values() {
        match job.status {
            JobStatus::Queued => queued += 1,
            JobStatus::Running => running += 1,
            _ => {}
        }
    }
    metrics::VERIFY_QUEUE_DEPTH
        .with_label_values(&["queued"])
        .set(queued);
    metrics::VERIFY_QUEUE_DEPTH
        .with_label_values(&["running"])
        .set(running);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::types::DEFAULT_PRIORITY;
    use crate::store::MemoryResultStore;
    use crate::testing::MockJobRunner;
    use serde_json::json;

    fn config() -> QueueConfig {
        QueueConfig {
            poll_interval: Duration::from_millis(20),
            ..Default::default()
        }
    }

    fn queue_with(runner: Arc<MockJobRunner>) -> (VerifyQueue, Arc<MemoryResultStore>) {
        let store = Arc::new(MemoryResultStore::new());
        let queue = VerifyQueue::new(config(), runner, store.clone());
        (queue, store)
    }

    async fn wait_idle(queue: &VerifyQueue) {
        for _ in 0..500 {
            let status = queue.status().await;
            if status.queued == 0 && status.running == 0 && !status.processing {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("queue did not drain");
    }

    #[test]
    fn test_result_key() {
        let mut job = VerifyJob {
            id: Uuid::new_v4(),
            job_type: JobType::File,
            path: PathBuf::from("/x.mkv"),
            options: JobOptions::default(),
            status: JobStatus::Completed,
            priority: DEFAULT_PRIORITY,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            result: None,
            error: None,
            metadata: Some(json!({ "kind": "download", "id": 42 })),
            seq: 0,
        };
        assert_eq!(result_key(&job), "download:42");

        job.metadata = Some(json!({ "kind": "import", "id": "abc" }));
        assert_eq!(result_key(&job), "import:abc");

        job.metadata = Some(json!({ "id": "abc" }));
        assert_eq!(result_key(&job), format!("job:{}", job.id));
    }

    #[tokio::test]
    async fn test_jobs_run_and_complete() {
        let runner = Arc::new(MockJobRunner::new());
        let (queue, _) = queue_with(runner.clone());

        let id = queue
            .add_job(JobType::File, "/a.mkv", JobOptions::default(), None, DEFAULT_PRIORITY)
            .await;
        wait_idle(&queue).await;

        let job = queue.job(id).await.unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert!(job.result.as_ref().unwrap().passed);
        assert!(job.started_at.is_some());
        assert!(job.completed_at.is_some());
        assert_eq!(runner.run_count(), 1);
    }

    #[tokio::test]
    async fn test_zero_concurrency_still_runs_jobs() {
        let runner = Arc::new(MockJobRunner::new());
        let store = Arc::new(MemoryResultStore::new());
        let queue = VerifyQueue::new(
            QueueConfig {
                max_concurrent: 0,
                ..config()
            },
            runner.clone(),
            store,
        );
        assert_eq!(queue.config().max_concurrent, 1);

        let id = queue
            .add_job(JobType::File, "/a.mkv", JobOptions::default(), None, DEFAULT_PRIORITY)
            .await;
        wait_idle(&queue).await;
        assert_eq!(queue.job(id).await.unwrap().status, JobStatus::Completed);
        assert_eq!(runner.run_count(), 1);
    }

    #[tokio::test]
    async fn test_concurrency_is_capped() {
        let runner = Arc::new(MockJobRunner::new());
        runner.set_delay(Duration::from_millis(50));
        let (queue, _) = queue_with(runner.clone());

        for i in 0..6 {
            queue
                .add_job(
                    JobType::File,
                    format!("/f{}.mkv", i),
                    JobOptions::default(),
                    None,
                    DEFAULT_PRIORITY,
                )
                .await;
        }
        wait_idle(&queue).await;

        assert_eq!(runner.run_count(), 6);
        assert!(runner.max_concurrency() <= 2);
        assert_eq!(runner.max_concurrency(), 2);
    }

    #[tokio::test]
    async fn test_priority_order() {
        let runner = Arc::new(MockJobRunner::new());
        runner.set_delay(Duration::from_millis(30));
        let (queue, _) = queue_with(runner.clone());

        // Occupy both slots so the rest queue up together.
        queue.add_job(JobType::File, "/busy1", JobOptions::default(), None, 5).await;
        queue.add_job(JobType::File, "/busy2", JobOptions::default(), None, 5).await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        queue.add_job(JobType::File, "/low", JobOptions::default(), None, 1).await;
        queue.add_job(JobType::File, "/high", JobOptions::default(), None, 9).await;
        queue.add_job(JobType::File, "/mid", JobOptions::default(), None, 5).await;
        wait_idle(&queue).await;

        let order = runner.run_order();
        let tail: Vec<&str> = order[2..].iter().map(|p| p.to_str().unwrap()).collect();
        assert_eq!(tail, vec!["/high", "/mid", "/low"]);
    }

    #[tokio::test]
    async fn test_cancel_only_queued() {
        let runner = Arc::new(MockJobRunner::new());
        runner.set_delay(Duration::from_millis(100));
        let (queue, _) = queue_with(runner.clone());

        let first = queue.add_job(JobType::File, "/1", JobOptions::default(), None, 5).await;
        queue.add_job(JobType::File, "/2", JobOptions::default(), None, 5).await;
        let third = queue.add_job(JobType::File, "/3", JobOptions::default(), None, 5).await;
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(!queue.cancel_job(first).await);
        assert!(queue.cancel_job(third).await);
        assert!(queue.job(third).await.is_none());
        assert!(!queue.cancel_job(third).await);
        assert!(!queue.cancel_job(Uuid::new_v4()).await);

        wait_idle(&queue).await;
        assert_eq!(runner.run_count(), 2);
        assert!(!queue.cancel_job(first).await);
        assert_eq!(queue.job(first).await.unwrap().status, JobStatus::Completed);
    }

    #[tokio::test]
    async fn test_failures_and_panics_are_recorded() {
        let runner = Arc::new(MockJobRunner::new());
        runner.fail_path("/broken.mkv", "probe exploded");
        runner.panic_path("/panic.mkv");
        let (queue, _) = queue_with(runner.clone());

        let broken = queue.add_job(JobType::File, "/broken.mkv", JobOptions::default(), None, 5).await;
        let panicked = queue.add_job(JobType::File, "/panic.mkv", JobOptions::default(), None, 5).await;
        let fine = queue.add_job(JobType::File, "/fine.mkv", JobOptions::default(), None, 5).await;
        wait_idle(&queue).await;

        let job = queue.job(broken).await.unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.error.unwrap().contains("probe exploded"));

        let job = queue.job(panicked).await.unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.error.is_some());

        assert_eq!(queue.job(fine).await.unwrap().status, JobStatus::Completed);

        let status = queue.status().await;
        assert_eq!(status.failed, 2);
        assert_eq!(status.completed, 1);
    }

    #[tokio::test]
    async fn test_rejected_job_is_completed_not_failed() {
        let runner = Arc::new(MockJobRunner::new());
        runner.reject_path("/bad.mkv");
        let (queue, store) = queue_with(runner);

        let id = queue.add_job(JobType::File, "/bad.mkv", JobOptions::default(), None, 5).await;
        wait_idle(&queue).await;

        let job = queue.job(id).await.unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert!(!job.result.unwrap().passed);
        let stored = store.get(&format!("job:{}", id)).await.unwrap().unwrap();
        assert!(!stored.passed);
    }

    #[tokio::test]
    async fn test_results_are_persisted_by_metadata_key() {
        let runner = Arc::new(MockJobRunner::new());
        runner.fail_path("/broken.mkv", "nope");
        let (queue, store) = queue_with(runner);

        queue
            .add_job(
                JobType::File,
                "/a.mkv",
                JobOptions::default(),
                Some(json!({ "kind": "download", "id": 7 })),
                5,
            )
            .await;
        queue.add_job(JobType::File, "/broken.mkv", JobOptions::default(), None, 5).await;
        wait_idle(&queue).await;

        let stored = store.get("download:7").await.unwrap().unwrap();
        assert_eq!(stored.path, PathBuf::from("/a.mkv"));
        assert!(stored.passed);

        let results = queue.results().await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_clear_and_prune() {
        let runner = Arc::new(MockJobRunner::new());
        let (queue, _) = queue_with(runner);

        let ids = queue
            .add_batch(
                vec![
                    BatchEntry { job_type: JobType::File, path: "/a".into() },
                    BatchEntry { job_type: JobType::Folder, path: "/b".into() },
                ],
                JobOptions::default(),
                None,
                5,
            )
            .await;
        assert_eq!(ids.len(), 2);
        wait_idle(&queue).await;

        assert_eq!(queue.prune_older_than(Duration::from_secs(3600)).await, 0);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(queue.prune_older_than(Duration::from_millis(5)).await, 2);
        assert_eq!(queue.status().await.total, 0);

        queue.add_job(JobType::File, "/c", JobOptions::default(), None, 5).await;
        wait_idle(&queue).await;
        assert_eq!(queue.clear_completed().await, 1);
        assert!(queue.all_jobs().await.is_empty());
    }

    #[tokio::test]
    async fn test_all_jobs_ordering() {
        let runner = Arc::new(MockJobRunner::new());
        runner.set_delay(Duration::from_millis(200));
        let (queue, _) = queue_with(runner);

        queue.add_job(JobType::File, "/r1", JobOptions::default(), None, 5).await;
        queue.add_job(JobType::File, "/r2", JobOptions::default(), None, 5).await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        queue.add_job(JobType::File, "/q-low", JobOptions::default(), None, 1).await;
        queue.add_job(JobType::File, "/q-high", JobOptions::default(), None, 8).await;
        tokio::time::sleep(Duration::from_millis(30)).await;

        let paths: Vec<PathBuf> = queue.all_jobs().await.into_iter().map(|j| j.path).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/r1"),
                PathBuf::from("/r2"),
                PathBuf::from("/q-high"),
                PathBuf::from("/q-low"),
            ]
        );

        let recent = queue.recent_jobs(1).await;
        assert_eq!(recent[0].path, PathBuf::from("/q-high"));
    }

    #[tokio::test]
    async fn test_subscription() {
        let runner = Arc::new(MockJobRunner::new());
        let (queue, _) = queue_with(runner);
        let seen = Arc::new(AtomicUsize::new(0));

        let counter = seen.clone();
        let subscription = queue.on_job_complete(move |job| {
            assert!(job.status.is_terminal());
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let _noisy = queue.on_job_complete(|_| panic!("listener bug"));

        queue.add_job(JobType::File, "/a", JobOptions::default(), None, 5).await;
        wait_idle(&queue).await;
        assert_eq!(seen.load(Ordering::SeqCst), 1);

        subscription.unsubscribe();
        subscription.unsubscribe();
        queue.add_job(JobType::File, "/b", JobOptions::default(), None, 5).await;
        wait_idle(&queue).await;
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(queue.status().await.completed, 2);
    }

    #[tokio::test]
    async fn test_processing_flag_resets_when_idle() {
        let runner = Arc::new(MockJobRunner::new());
        let (queue, _) = queue_with(runner.clone());

        queue.add_job(JobType::File, "/a", JobOptions::default(), None, 5).await;
        assert!(queue.status().await.processing);
        wait_idle(&queue).await;
        assert!(!queue.status().await.processing);

        queue.add_job(JobType::File, "/b", JobOptions::default(), None, 5).await;
        wait_idle(&queue).await;
        assert_eq!(runner.run_count(), 2);
    }
}
