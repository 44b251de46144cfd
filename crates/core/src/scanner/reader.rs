//! Filesystem access used by the scanner.

use async_trait::async_trait;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use tokio::fs;

/// What a directory entry is, after resolving file symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
    Other,
}

/// Directory listing and metadata lookups performed by the scanner.
///
/// Swapped out in tests to simulate unreadable folders.
#[async_trait]
pub trait DirectoryReader: Send + Sync {
    /// Entries of `dir`, sorted by path.
    async fn list(&self, dir: &Path) -> std::io::Result<Vec<(PathBuf, EntryKind)>>;

    async fn metadata(&self, path: &Path) -> std::io::Result<Metadata>;
}

/// [`DirectoryReader`] backed by the local filesystem.
///
/// Symlinked files count as files, symlinked directories are not followed.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalDirectoryReader;

#[async_trait]
impl DirectoryReader for LocalDirectoryReader {
    async fn list(&self, dir: &Path) -> std::io::Result<Vec<(PathBuf, EntryKind)>> {
        let mut reader = fs::read_dir(dir).await?;
        let mut entries = Vec::new();

        while let Some(entry) = reader.next_entry().await? {
            let file_type = entry.file_type().await?;
            let kind = if file_type.is_dir() {
                EntryKind::Directory
            } else if file_type.is_file() {
                EntryKind::File
            } else if file_type.is_symlink() {
                match fs::metadata(entry.path()).await {
                    Ok(target) if target.is_file() => EntryKind::File,
                    _ => EntryKind::Other,
                }
            } else {
                EntryKind::Other
            };
            entries.push((entry.path(), kind));
        }

        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries)
    }

    async fn metadata(&self, path: &Path) -> std::io::Result<Metadata> {
        fs::metadata(path).await
    }
}
