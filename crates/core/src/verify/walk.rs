//! Recursive file listing for folder checks.

use std::path::{Path, PathBuf};
use tokio::fs;

/// Regular files below `root`, sorted by path.
///
/// Unreadable subdirectories are reported in the second element instead of
/// failing the listing. Symlinked directories are not followed.
pub async fn list_files(
    root: &Path,
    recursive: bool,
) -> std::io::Result<(Vec<PathBuf>, Vec<String>)> {
    let mut files = Vec::new();
    let mut errors = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut reader = match fs::read_dir(&dir).await {
            Ok(reader) => reader,
            Err(e) if dir == root => return Err(e),
            Err(e) => {
                errors.push(format!("{}: {}", dir.display(), e));
                continue;
            }
        };

        while let Some(entry) = reader.next_entry().await? {
            let path = entry.path();
            let file_type = entry.file_type().await?;
            if file_type.is_dir() {
                if recursive {
                    pending.push(path);
                }
            } else if file_type.is_file() {
                files.push(path);
            } else if file_type.is_symlink() {
                if let Ok(target) = fs::metadata(&path).await {
                    if target.is_file() {
                        files.push(path);
                    }
                }
            }
        }
    }

    files.sort();
    Ok((files, errors))
}
