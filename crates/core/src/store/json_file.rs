//! JSON file backed result store.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use super::error::StoreError;
use super::traits::ResultStore;
use super::types::StoredResult;

type Records = BTreeMap<String, StoredResult>;

fn newest_first(records: &Records) -> Vec<StoredResult> {
    let mut all: Vec<StoredResult> = records.values().cloned().collect();
    all.sort_by(|a, b| b.stored_at.cmp(&a.stored_at));
    all
}

/// Keeps every record in memory and rewrites one JSON object on each change.
///
/// Writes go to a sibling temp file that is renamed over the target, so a
/// crash never leaves a half-written file behind.
pub struct JsonFileStore {
    path: PathBuf,
    records: Mutex<Records>,
}

impl JsonFileStore {
    /// Opens the store, loading existing records. A missing file is an empty store.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records = match fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => Records::new(),
            Ok(content) => {
                serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
                    path: path.clone(),
                    reason: e.to_string(),
                })?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Records::new(),
            Err(e) => return Err(StoreError::Io(e)),
        };

        info!(path = %path.display(), records = records.len(), "Opened result store");
        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn write(&self, records: &Records) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::write_failed(parent.to_path_buf(), e))?;
        }

        let json = serde_json::to_vec_pretty(records)?;
        let mut temp_name = self.path.as_os_str().to_owned();
        temp_name.push(".tmp");
        let temp_path = PathBuf::from(temp_name);

        fs::write(&temp_path, json)
            .await
            .map_err(|e| StoreError::write_failed(temp_path.clone(), e))?;
        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| StoreError::write_failed(self.path.clone(), e))?;

        debug!(path = %self.path.display(), records = records.len(), "Saved result store");
        Ok(())
    }
}

#[async_trait]
impl ResultStore for JsonFileStore {
    async fn put(&self, record: StoredResult) -> Result<(), StoreError> {
        // Held across the write so concurrent saves cannot reorder.
        let mut records = self.records.lock().await;
        let key = record.key.clone();
        let previous = records.insert(key.clone(), record);
        if let Err(e) = self.write(&records).await {
            match previous {
                Some(previous) => records.insert(key, previous),
                None => records.remove(&key),
            };
            return Err(e);
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<StoredResult>, StoreError> {
        Ok(self.records.lock().await.get(key).cloned())
    }

    async fn all(&self) -> Result<Vec<StoredResult>, StoreError> {
        Ok(newest_first(&*self.records.lock().await))
    }

    async fn remove(&self, key: &str) -> Result<bool, StoreError> {
        let mut records = self.records.lock().await;
        let Some(removed) = records.remove(key) else {
            return Ok(false);
        };
        if let Err(e) = self.write(&records).await {
            records.insert(key.to_string(), removed);
            return Err(e);
        }
        Ok(true)
    }
}

/// In-memory store for tests and ephemeral setups.
#[derive(Default)]
pub struct MemoryResultStore {
    records: RwLock<Records>,
}

impl MemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResultStore for MemoryResultStore {
    async fn put(&self, record: StoredResult) -> Result<(), StoreError> {
        self.records.write().await.insert(record.key.clone(), record);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<StoredResult>, StoreError> {
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn all(&self) -> Result<Vec<StoredResult>, StoreError> {
        Ok(newest_first(&*self.records.read().await))
    }

    async fn remove(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.records.write().await.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verify::VerifyReport;
    use chrono::{Duration, Utc};
    use tempfile::TempDir;
    use uuid::Uuid;

    fn record(key: &str, passed: bool) -> StoredResult {
        StoredResult {
            key: key.to_string(),
            job_id: Uuid::new_v4(),
            path: PathBuf::from("/media/file.mkv"),
            passed,
            report: VerifyReport {
                passed,
                files_checked: 1,
                ..Default::default()
            },
            metadata: None,
            stored_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data/results.json");

        let store = JsonFileStore::open(&path).await.unwrap();
        store.put(record("movie:1", true)).await.unwrap();
        store.put(record("movie:2", false)).await.unwrap();
        assert!(path.exists());
        assert!(!dir.path().join("data/results.json.tmp").exists());

        let reopened = JsonFileStore::open(&path).await.unwrap();
        assert_eq!(reopened.all().await.unwrap().len(), 2);
        assert!(!reopened.get("movie:2").await.unwrap().unwrap().passed);
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path().join("r.json")).await.unwrap();
        store.put(record("episode:7", false)).await.unwrap();
        store.put(record("episode:7", true)).await.unwrap();

        let all = store.all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert!(all[0].passed);
    }

    #[tokio::test]
    async fn test_remove() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("r.json");
        let store = JsonFileStore::open(&path).await.unwrap();
        store.put(record("job:a", true)).await.unwrap();

        assert!(store.remove("job:a").await.unwrap());
        assert!(!store.remove("job:a").await.unwrap());
        let reopened = JsonFileStore::open(&path).await.unwrap();
        assert!(reopened.get("job:a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_write_leaves_records_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data/r.json");
        let store = JsonFileStore::open(&path).await.unwrap();
        store.put(record("movie:1", true)).await.unwrap();

        // A file where the data directory should be makes every write fail.
        std::fs::remove_dir_all(dir.path().join("data")).unwrap();
        std::fs::write(dir.path().join("data"), b"not a directory").unwrap();

        let err = store.put(record("movie:2", true)).await.unwrap_err();
        assert!(matches!(err, StoreError::WriteFailed { .. }));
        assert!(store.get("movie:2").await.unwrap().is_none());

        let err = store.put(record("movie:1", false)).await.unwrap_err();
        assert!(matches!(err, StoreError::WriteFailed { .. }));
        assert!(store.get("movie:1").await.unwrap().unwrap().passed);

        assert!(store.remove("movie:1").await.is_err());
        assert!(store.get("movie:1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("r.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = JsonFileStore::open(&path).await.err().unwrap();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn test_memory_store_orders_newest_first() {
        let store = MemoryResultStore::new();
        let mut older = record("a", true);
        older.stored_at = Utc::now() - Duration::minutes(5);
        store.put(older).await.unwrap();
        store.put(record("b", true)).await.unwrap();

        let keys: Vec<String> = store.all().await.unwrap().into_iter().map(|r| r.key).collect();
        assert_eq!(keys, vec!["b", "a"]);
    }
}
