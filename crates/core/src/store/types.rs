//! Stored verification records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use crate::verify::VerifyReport;

/// A verification outcome kept for later lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredResult {
    /// `"{kind}:{id}"` from the job metadata, or `"job:{job_id}"`.
    pub key: String,
    pub job_id: Uuid,
    pub path: PathBuf,
    pub passed: bool,
    pub report: VerifyReport,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    pub stored_at: DateTime<Utc>,
}
