//! Mock job runner for queue tests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::queue::{JobRunner, QueueError, VerifyJob};
use crate::verify::{VerifyError, VerifyReport};

#[derive(Debug, Default)]
struct Behaviour {
    delay: Duration,
    failures: HashMap<PathBuf, String>,
    panics: HashSet<PathBuf>,
    rejections: HashSet<PathBuf>,
}

/// Mock implementation of the JobRunner trait.
///
/// Provides controllable behavior for testing:
/// - Simulated run time
/// - Per-path failures, panics and rejected verdicts
/// - Run order and peak concurrency for assertions
#[derive(Debug, Default)]
pub struct MockJobRunner {
    behaviour: Mutex<Behaviour>,
    order: Mutex<Vec<PathBuf>>,
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl MockJobRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// How long each run takes.
    pub fn set_delay(&self, delay: Duration) {
        self.behaviour().delay = delay;
    }

    /// Jobs for `path` return an error with `reason`.
    pub fn fail_path(&self, path: impl AsRef<Path>, reason: impl Into<String>) {
        self.behaviour()
            .failures
            .insert(path.as_ref().to_path_buf(), reason.into());
    }

    /// Jobs for `path` panic.
    pub fn panic_path(&self, path: impl AsRef<Path>) {
        self.behaviour().panics.insert(path.as_ref().to_path_buf());
    }

    /// Jobs for `path` complete with a failing report.
    pub fn reject_path(&self, path: impl AsRef<Path>) {
        self.behaviour().rejections.insert(path.as_ref().to_path_buf());
    }

    /// Paths in the order their runs started.
    pub fn run_order(&self) -> Vec<PathBuf> {
        lock(&self.order).clone()
    }

    pub fn run_count(&self) -> usize {
        lock(&self.order).len()
    }

    /// Most runs observed in flight at the same time.
    pub fn max_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn behaviour(&self) -> MutexGuard<'_, Behaviour> {
        lock(&self.behaviour)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Decrements the in-flight counter even when the run panics.
struct ActiveGuard<'a>(&'a AtomicUsize);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl JobRunner for MockJobRunner {
    async fn run(&self, job: &VerifyJob) -> Result<VerifyReport, QueueError> {
        lock(&self.order).push(job.path.clone());
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        let _active = ActiveGuard(&self.active);

        let (delay, failure, panics, rejected) = {
            let behaviour = self.behaviour();
            (
                behaviour.delay,
                behaviour.failures.get(&job.path).cloned(),
                behaviour.panics.contains(&job.path),
                behaviour.rejections.contains(&job.path),
            )
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if panics {
            panic!("mock runner panic for {}", job.path.display());
        }
        if let Some(reason) = failure {
            return Err(VerifyError::probe_failed(reason).into());
        }

        Ok(VerifyReport {
            passed: !rejected,
            files_checked: 1,
            ..Default::default()
        })
    }
}
