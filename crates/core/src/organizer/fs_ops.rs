//! Filesystem primitives used by the organizer.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader, BufWriter};

const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Filesystem operations the organizer performs.
///
/// Swapped out in tests to simulate cross-device errors.
#[async_trait]
pub trait FileOps: Send + Sync {
    async fn exists(&self, path: &Path) -> bool;

    async fn create_dir_all(&self, path: &Path) -> std::io::Result<()>;

    async fn rename(&self, from: &Path, to: &Path) -> std::io::Result<()>;

    /// Copies file contents, returning the number of bytes written.
    async fn copy(&self, from: &Path, to: &Path) -> std::io::Result<u64>;

    async fn hard_link(&self, from: &Path, to: &Path) -> std::io::Result<()>;

    async fn remove_file(&self, path: &Path) -> std::io::Result<()>;

    async fn remove_dir(&self, path: &Path) -> std::io::Result<()>;

    async fn is_dir_empty(&self, path: &Path) -> std::io::Result<bool>;

    /// Hex-encoded SHA-256 of the file contents.
    async fn sha256(&self, path: &Path) -> std::io::Result<String>;
}

/// [`FileOps`] backed by the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalFileOps {
    buffer_size: usize,
}

impl Default for LocalFileOps {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl LocalFileOps {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            buffer_size: buffer_size.max(1),
        }
    }
}

#[async_trait]
impl FileOps for LocalFileOps {
    async fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).await.is_ok()
    }

    async fn create_dir_all(&self, path: &Path) -> std::io::Result<()> {
        fs::create_dir_all(path).await
    }

    async fn rename(&self, from: &Path, to: &Path) -> std::io::Result<()> {
        fs::rename(from, to).await
    }

    async fn copy(&self, from: &Path, to: &Path) -> std::io::Result<u64> {
        let source = File::open(from).await?;
        let dest = File::create(to).await?;

        let mut reader = BufReader::with_capacity(self.buffer_size, source);
        let mut writer = BufWriter::with_capacity(self.buffer_size, dest);
        let mut buffer = vec![0u8; self.buffer_size];
        let mut total_bytes = 0u64;

        loop {
            let bytes_read = reader.read(&mut buffer).await?;
            if bytes_read == 0 {
                break;
            }
            writer.write_all(&buffer[..bytes_read]).await?;
            total_bytes += bytes_read as u64;
        }

        writer.flush().await?;
        Ok(total_bytes)
    }

    async fn hard_link(&self, from: &Path, to: &Path) -> std::io::Result<()> {
        fs::hard_link(from, to).await
    }

    async fn remove_file(&self, path: &Path) -> std::io::Result<()> {
        fs::remove_file(path).await
    }

    async fn remove_dir(&self, path: &Path) -> std::io::Result<()> {
        fs::remove_dir(path).await
    }

    async fn is_dir_empty(&self, path: &Path) -> std::io::Result<bool> {
        let mut entries = fs::read_dir(path).await?;
        Ok(entries.next_entry().await?.is_none())
    }

    async fn sha256(&self, path: &Path) -> std::io::Result<String> {
        let file = File::open(path).await?;
        let mut reader = BufReader::with_capacity(self.buffer_size, file);
        let mut buffer = vec![0u8; self.buffer_size];
        let mut hasher = Sha256::new();

        loop {
            let bytes_read = reader.read(&mut buffer).await?;
            if bytes_read == 0 {
                break;
            }
            hasher.update(&buffer[..bytes_read]);
        }

        Ok(format!("{:x}", hasher.finalize()))
    }
}

/// Whether an error means source and destination are on different filesystems.
pub fn is_cross_device(e: &std::io::Error) -> bool {
    // EXDEV is 18 on Linux and macOS
    e.kind() == ErrorKind::CrossesDevices || e.raw_os_error() == Some(18)
}
