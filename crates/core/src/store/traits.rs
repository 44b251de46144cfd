//! Trait definitions for the store module.

use async_trait::async_trait;

use super::error::StoreError;
use super::types::StoredResult;

/// Key-value persistence for verification results. Last write wins.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Inserts or replaces the record under `record.key`.
    async fn put(&self, record: StoredResult) -> Result<(), StoreError>;

    async fn get(&self, key: &str) -> Result<Option<StoredResult>, StoreError>;

    /// All records, newest first.
    async fn all(&self) -> Result<Vec<StoredResult>, StoreError>;

    /// Returns whether a record was removed.
    async fn remove(&self, key: &str) -> Result<bool, StoreError>;
}
