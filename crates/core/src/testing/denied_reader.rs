//! Directory reader that refuses access to chosen paths.

use async_trait::async_trait;
use std::collections::HashSet;
use std::fs::Metadata;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::scanner::{DirectoryReader, EntryKind, LocalDirectoryReader};

/// [`LocalDirectoryReader`] that fails with permission denied for the
/// denied paths, regardless of the process's privileges.
#[derive(Debug, Default)]
pub struct DeniedDirectoryReader {
    inner: LocalDirectoryReader,
    denied: Mutex<HashSet<PathBuf>>,
}

impl DeniedDirectoryReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Denies listing (for directories) or metadata (for files) of `path`.
    pub fn deny(&self, path: impl Into<PathBuf>) {
        self.lock_denied().insert(path.into());
    }

    fn lock_denied(&self) -> MutexGuard<'_, HashSet<PathBuf>> {
        match self.denied.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn check(&self, path: &Path) -> std::io::Result<()> {
        if self.lock_denied().contains(path) {
            return Err(std::io::Error::new(
                ErrorKind::PermissionDenied,
                format!("access to {} denied", path.display()),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl DirectoryReader for DeniedDirectoryReader {
    async fn list(&self, dir: &Path) -> std::io::Result<Vec<(PathBuf, EntryKind)>> {
        self.check(dir)?;
        self.inner.list(dir).await
    }

    async fn metadata(&self, path: &Path) -> std::io::Result<Metadata> {
        self.check(path)?;
        self.inner.metadata(path).await
    }
}
