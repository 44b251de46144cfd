//! Persistence for verification results.
//!
//! Records are keyed by `"{kind}:{id}"` (or `"job:{job_id}"` when the job
//! carries no such metadata). Writing a key again replaces the old record.

mod error;
mod json_file;
mod traits;
mod types;

pub use error::StoreError;
pub use json_file::{JsonFileStore, MemoryResultStore};
pub use traits::ResultStore;
pub use types::StoredResult;
