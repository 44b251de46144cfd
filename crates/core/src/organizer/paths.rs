//! Path helpers for placement decisions.

use std::path::{Component, Path, PathBuf};

use super::error::OrganizerError;
use super::fs_ops::FileOps;

/// Highest suffix tried when renaming around a conflict.
pub const MAX_RENAME_ATTEMPTS: u32 = 100;

/// Lexically resolves `.` and `..` without touching the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// `dir/stem (n).ext` for a destination `dir/stem.ext`.
pub fn numbered_path(path: &Path, n: u32) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{} ({}).{}", stem, n, ext.to_string_lossy()),
        None => format!("{} ({})", stem, n),
    };
    path.with_file_name(name)
}

/// First `name (N).ext` with N in 1..=100 that does not exist yet.
pub async fn next_free_path<F: FileOps + ?Sized>(
    ops: &F,
    path: &Path,
) -> Result<PathBuf, OrganizerError> {
    for n in 1..=MAX_RENAME_ATTEMPTS {
        let candidate = numbered_path(path, n);
        if !ops.exists(&candidate).await {
            return Ok(candidate);
        }
    }
    Err(OrganizerError::NoFreeName {
        path: path.to_path_buf(),
        attempts: MAX_RENAME_ATTEMPTS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::organizer::LocalFileOps;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(Path::new("/media/./movies/../movies/a.mkv")),
            PathBuf::from("/media/movies/a.mkv")
        );
        assert_eq!(normalize_path(Path::new("a/b/../../c")), PathBuf::from("c"));
    }

    #[test]
    fn test_numbered_path() {
        assert_eq!(
            numbered_path(Path::new("/lib/Movie (2010).mkv"), 3),
            PathBuf::from("/lib/Movie (2010) (3).mkv")
        );
        assert_eq!(
            numbered_path(Path::new("/lib/README"), 1),
            PathBuf::from("/lib/README (1)")
        );
    }

    #[tokio::test]
    async fn test_next_free_path_skips_taken_names() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("Movie.mkv");
        std::fs::write(&target, b"").unwrap();
        std::fs::write(dir.path().join("Movie (1).mkv"), b"").unwrap();

        let free = next_free_path(&LocalFileOps::default(), &target)
            .await
            .unwrap();
        assert_eq!(free, dir.path().join("Movie (2).mkv"));
        assert!(!free.exists());
    }

    #[tokio::test]
    async fn test_next_free_path_gives_up_after_limit() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("Movie.mkv");
        for n in 1..=MAX_RENAME_ATTEMPTS {
            std::fs::write(numbered_path(&target, n), b"").unwrap();
        }

        let err = next_free_path(&LocalFileOps::default(), &target)
            .await
            .unwrap_err();
        assert!(matches!(err, OrganizerError::NoFreeName { attempts: 100, .. }));
    }
}
