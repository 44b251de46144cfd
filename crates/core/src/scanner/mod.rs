//! Directory scanner for media libraries.
//!
//! Walks the configured media folders twice: once to count media files for
//! progress reporting, then again to parse each file into a [`ScannedItem`].
//! Well-known system and trash folders are skipped. Permission problems are
//! recorded as warnings, any other I/O error fails the run.
//!
//! # Example
//!
//! ```ignore
//! use mediashelf_core::scanner::{DirectoryScanner, MediaFolder};
//!
//! let scanner = DirectoryScanner::new();
//! let mut events = scanner.subscribe();
//!
//! let result = scanner.scan(&[MediaFolder::new("/media/downloads")]).await?;
//! println!("Found {} items", result.items.len());
//! ```

mod directory;
mod error;
mod filter;
mod reader;
mod types;

pub use directory::DirectoryScanner;
pub use error::ScanError;
pub use filter::should_skip_directory;
pub use reader::{DirectoryReader, EntryKind, LocalDirectoryReader};
pub use types::{MediaFolder, ScanEvent, ScanProgress, ScanResult, ScanStatus, ScannedItem};
