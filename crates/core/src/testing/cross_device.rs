//! File operations that behave like two separate filesystems.

use async_trait::async_trait;
use std::path::Path;

use crate::organizer::{FileOps, LocalFileOps};

/// EXDEV on Linux.
const CROSS_DEVICE_ERRNO: i32 = 18;

/// [`LocalFileOps`] whose renames and hard links always fail with a
/// cross-device error, forcing the copy fallbacks.
#[derive(Debug, Default)]
pub struct CrossDeviceFileOps {
    inner: LocalFileOps,
}

impl CrossDeviceFileOps {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FileOps for CrossDeviceFileOps {
    async fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path).await
    }

    async fn create_dir_all(&self, path: &Path) -> std::io::Result<()> {
        self.inner.create_dir_all(path).await
    }

    async fn rename(&self, _from: &Path, _to: &Path) -> std::io::Result<()> {
        Err(std::io::Error::from_raw_os_error(CROSS_DEVICE_ERRNO))
    }

    async fn copy(&self, from: &Path, to: &Path) -> std::io::Result<u64> {
        self.inner.copy(from, to).await
    }

    async fn hard_link(&self, _from: &Path, _to: &Path) -> std::io::Result<()> {
        Err(std::io::Error::from_raw_os_error(CROSS_DEVICE_ERRNO))
    }

    async fn remove_file(&self, path: &Path) -> std::io::Result<()> {
        self.inner.remove_file(path).await
    }

    async fn remove_dir(&self, path: &Path) -> std::io::Result<()> {
        self.inner.remove_dir(path).await
    }

    async fn is_dir_empty(&self, path: &Path) -> std::io::Result<bool> {
        self.inner.is_dir_empty(path).await
    }

    async fn sha256(&self, path: &Path) -> std::io::Result<String> {
        self.inner.sha256(path).await
    }
}
