//! File organizer.
//!
//! Places scanned media into the library layout produced by the naming
//! templates. Supports move, copy and hardlink, with cross-filesystem
//! fallbacks to copying, conflict handling and optional SHA-256
//! verification of copies.
//!
//! # Example
//!
//! ```ignore
//! use mediashelf_core::organizer::{FileOrganizer, OrganizeOptions};
//!
//! let organizer = FileOrganizer::new();
//! let summary = organizer.organize(&items, &options).await?;
//! println!("{} moved, {} failed", summary.moved, summary.failed);
//! ```

mod error;
mod file_organizer;
mod fs_ops;
mod paths;
mod types;

pub use error::OrganizerError;
pub use file_organizer::{preview_organization, FileOrganizer};
pub use fs_ops::{is_cross_device, FileOps, LocalFileOps};
pub use paths::{next_free_path, normalize_path, numbered_path, MAX_RENAME_ATTEMPTS};
pub use types::{
    ConflictResolution, Destinations, OrganizeEvent, OrganizeOperation, OrganizeOptions,
    OrganizeProgress, OrganizeResult, OrganizeSummary, OrganizerStatus, ResultStatus,
};
