use std::sync::Arc;

use mediashelf_core::{Config, DirectoryScanner, FileOrganizer, VerifyQueue};

/// Shared application state
pub struct AppState {
    config: Config,
    scanner: Arc<DirectoryScanner>,
    organizer: Arc<FileOrganizer>,
    queue: VerifyQueue,
}

impl AppState {
    pub fn new(config: Config, queue: VerifyQueue) -> Self {
        Self {
            config,
            scanner: Arc::new(DirectoryScanner::new()),
            organizer: Arc::new(FileOrganizer::new()),
            queue,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn scanner(&self) -> &Arc<DirectoryScanner> {
        &self.scanner
    }

    pub fn organizer(&self) -> &Arc<FileOrganizer> {
        &self.organizer
    }

    pub fn queue(&self) -> &VerifyQueue {
        &self.queue
    }
}
