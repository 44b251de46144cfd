//! Mock media prober for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::verify::{MediaInfo, MediaProber, VerifyError};

/// Mock implementation of the MediaProber trait.
///
/// Answers with whatever was registered for a path. Unregistered paths fail
/// to probe unless a default was set.
///
/// # Example
///
/// ```rust,ignore
/// use mediashelf_core::testing::{fixtures, MockProber};
///
/// let prober = MockProber::new();
/// prober.set_info("/media/movie.mkv", fixtures::media_info_1080p(7200.0));
/// prober.fail_probe("/media/broken.mkv", "moov atom not found");
/// ```
#[derive(Debug, Default)]
pub struct MockProber {
    responses: Mutex<HashMap<PathBuf, Result<MediaInfo, String>>>,
    default_info: Mutex<Option<MediaInfo>>,
    probes: AtomicUsize,
}

impl MockProber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the probe result for a specific path.
    pub fn set_info(&self, path: impl AsRef<Path>, info: MediaInfo) {
        self.lock_responses()
            .insert(path.as_ref().to_path_buf(), Ok(info));
    }

    /// Make probing `path` fail with `reason`.
    pub fn fail_probe(&self, path: impl AsRef<Path>, reason: impl Into<String>) {
        self.lock_responses()
            .insert(path.as_ref().to_path_buf(), Err(reason.into()));
    }

    /// Result for paths without a registered response.
    pub fn set_default_info(&self, info: MediaInfo) {
        let mut default_info = match self.default_info.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *default_info = Some(info);
    }

    /// Number of probe calls made so far.
    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    fn lock_responses(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, Result<MediaInfo, String>>> {
        match self.responses.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl MediaProber for MockProber {
    fn name(&self) -> &str {
        "mock"
    }

    async fn probe(&self, path: &Path) -> Result<MediaInfo, VerifyError> {
        self.probes.fetch_add(1, Ordering::SeqCst);

        if let Some(response) = self.lock_responses().get(path).cloned() {
            return response.map_err(VerifyError::probe_failed);
        }

        let default_info = match self.default_info.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        default_info.ok_or_else(|| {
            VerifyError::probe_failed(format!("no mock response for {}", path.display()))
        })
    }
}
