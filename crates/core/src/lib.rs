pub mod config;
pub mod metrics;
pub mod naming;
pub mod organizer;
pub mod parser;
pub mod queue;
pub mod scanner;
pub mod store;
pub mod testing;
mod throttle;
pub mod verify;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError,
};
pub use naming::{preview_organized_path, NamingConfig, OrganizedPath};
pub use organizer::{
    preview_organization, FileOrganizer, OrganizeOptions, OrganizeResult, OrganizeSummary,
    OrganizerError,
};
pub use parser::{parse, MediaType, ParsedMedia};
pub use queue::{JobRunner, MediaVerifier, QueueError, VerifyJob, VerifyQueue};
pub use scanner::{DirectoryScanner, MediaFolder, ScanError, ScanResult, ScannedItem};
pub use store::{JsonFileStore, MemoryResultStore, ResultStore, StoreError, StoredResult};
pub use verify::{MediaProber, VerifyError, VerifyReport};
