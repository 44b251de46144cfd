//! Directory scanner implementation.

use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

use super::error::ScanError;
use super::filter::should_skip_directory;
use super::reader::{DirectoryReader, EntryKind, LocalDirectoryReader};
use super::types::{MediaFolder, ScanEvent, ScanProgress, ScanResult, ScanStatus, ScannedItem};
use crate::metrics::{FILES_SCANNED, SCANS_TOTAL};
use crate::parser::{is_media_extension, parse};
use crate::throttle::ProgressThrottle;

/// Capacity of the event channel. Slow subscribers miss old events.
const EVENT_CAPACITY: usize = 256;

/// Walks media folders and parses every media file it finds.
///
/// One scan runs at a time. Progress and discovered items are published on
/// a broadcast channel and the last run's items stay available until the
/// next scan starts.
pub struct DirectoryScanner<R: DirectoryReader = LocalDirectoryReader> {
    reader: R,
    progress: RwLock<ScanProgress>,
    items: RwLock<Vec<ScannedItem>>,
    abort_requested: AtomicBool,
    events: broadcast::Sender<ScanEvent>,
}

impl Default for DirectoryScanner<LocalDirectoryReader> {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectoryScanner<LocalDirectoryReader> {
    /// Creates an idle scanner over the local filesystem.
    pub fn new() -> Self {
        Self::with_reader(LocalDirectoryReader)
    }
}

impl<R: DirectoryReader> DirectoryScanner<R> {
    pub fn with_reader(reader: R) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            reader,
            progress: RwLock::new(ScanProgress::default()),
            items: RwLock::new(Vec::new()),
            abort_requested: AtomicBool::new(false),
            events,
        }
    }

    /// Subscribes to scan events.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanEvent> {
        self.events.subscribe()
    }

    /// Current progress snapshot.
    pub async fn progress(&self) -> ScanProgress {
        self.progress.read().await.clone()
    }

    /// Items found by the current or most recent scan.
    pub async fn scanned_items(&self) -> Vec<ScannedItem> {
        self.items.read().await.clone()
    }

    pub async fn is_scanning(&self) -> bool {
        self.progress.read().await.status == ScanStatus::Scanning
    }

    /// Requests cancellation of the running scan.
    ///
    /// Returns false when no scan is running.
    pub async fn abort(&self) -> bool {
        if !self.is_scanning().await {
            return false;
        }
        info!("Scan abort requested");
        self.abort_requested.store(true, Ordering::SeqCst);
        true
    }

    /// Scans the enabled folders and replaces the held items.
    pub async fn scan(&self, folders: &[MediaFolder]) -> Result<ScanResult, ScanError> {
        {
            let mut progress = self.progress.write().await;
            if progress.status == ScanStatus::Scanning {
                return Err(ScanError::AlreadyScanning);
            }
            // Cleared before the status is visible so an early abort sticks.
            self.abort_requested.store(false, Ordering::SeqCst);
            *progress = ScanProgress::started();
        }
        self.items.write().await.clear();

        let start = Instant::now();
        let enabled: Vec<&MediaFolder> = folders.iter().filter(|f| f.enabled).collect();
        info!(
            folders = enabled.len(),
            skipped = folders.len() - enabled.len(),
            "Starting library scan"
        );

        let outcome = self.run(&enabled).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(()) => {
                let snapshot = {
                    let mut progress = self.progress.write().await;
                    progress.status = ScanStatus::Completed;
                    progress.completed_at = Some(Utc::now());
                    progress.current_path = None;
                    progress.clone()
                };
                let items = self.items.read().await.clone();

                SCANS_TOTAL.with_label_values(&["completed"]).inc();
                info!(
                    items = items.len(),
                    warnings = snapshot.errors.len(),
                    duration_ms,
                    "Library scan completed"
                );

                self.emit(ScanEvent::Progress(snapshot.clone()));
                self.emit(ScanEvent::Complete {
                    items_found: items.len() as u64,
                    errors: snapshot.errors.clone(),
                    duration_ms,
                });

                Ok(ScanResult {
                    items,
                    errors: snapshot.errors,
                    duration_ms,
                })
            }
            Err(e) => {
                let message = e.to_string();
                {
                    let mut progress = self.progress.write().await;
                    progress.status = ScanStatus::Failed;
                    progress.completed_at = Some(Utc::now());
                    progress.errors.push(message.clone());
                }

                let result = if matches!(e, ScanError::Aborted) {
                    "aborted"
                } else {
                    "failed"
                };
                SCANS_TOTAL.with_label_values(&[result]).inc();
                warn!(error = %message, duration_ms, "Library scan did not complete");

                self.emit(ScanEvent::Error { message });
                Err(e)
            }
        }
    }

    async fn run(&self, folders: &[&MediaFolder]) -> Result<(), ScanError> {
        for folder in folders {
            match self.reader.metadata(&folder.path).await {
                Ok(metadata) if metadata.is_dir() => {}
                _ => {
                    return Err(ScanError::FolderNotFound {
                        path: folder.path.clone(),
                    })
                }
            }
        }

        let mut total = 0;
        for folder in folders {
            total += self.count_media_files(&folder.path).await?;
        }
        self.progress.write().await.total_files = total;
        debug!(total, "Counted media files");

        let mut throttle = ProgressThrottle::default();
        for folder in folders {
            self.collect_items(&folder.path, &mut throttle).await?;
        }
        Ok(())
    }

    fn check_abort(&self) -> Result<(), ScanError> {
        if self.abort_requested.load(Ordering::SeqCst) {
            Err(ScanError::Aborted)
        } else {
            Ok(())
        }
    }

    /// First pass: size the progress denominator.
    async fn count_media_files(&self, root: &Path) -> Result<u64, ScanError> {
        let mut count = 0;
        let mut pending = vec![root.to_path_buf()];

        while let Some(dir) = pending.pop() {
            self.check_abort()?;
            let entries = match self.reader.list(&dir).await {
                Ok(entries) => entries,
                // Reported once, by the second pass.
                Err(e) if e.kind() == ErrorKind::PermissionDenied => continue,
                Err(e) => return Err(ScanError::read_failed(dir, e)),
            };

            for (path, kind) in entries {
                match kind {
                    EntryKind::Directory if !is_skipped_directory(&path) => pending.push(path),
                    EntryKind::File if has_media_extension(&path) => count += 1,
                    _ => {}
                }
            }
        }

        Ok(count)
    }

    /// Second pass: parse every media file below `root`.
    async fn collect_items(
        &self,
        root: &Path,
        throttle: &mut ProgressThrottle,
    ) -> Result<(), ScanError> {
        let mut pending = vec![root.to_path_buf()];

        while let Some(dir) = pending.pop() {
            self.check_abort()?;
            let entries = match self.reader.list(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                    self.record_warning(format!("Permission denied: {}", dir.display()))
                        .await;
                    continue;
                }
                Err(e) => return Err(ScanError::read_failed(dir, e)),
            };

            let mut subdirectories = Vec::new();
            for (path, kind) in entries {
                self.check_abort()?;
                match kind {
                    EntryKind::Directory => {
                        if is_skipped_directory(&path) {
                            debug!(path = %path.display(), "Skipping directory");
                        } else {
                            subdirectories.push(path);
                        }
                    }
                    EntryKind::File if has_media_extension(&path) => {
                        self.scan_file(root, path, throttle).await?;
                    }
                    _ => {}
                }
            }

            // Reversed so the stack pops them in sorted order.
            pending.extend(subdirectories.into_iter().rev());
        }

        Ok(())
    }

    async fn scan_file(
        &self,
        root: &Path,
        path: PathBuf,
        throttle: &mut ProgressThrottle,
    ) -> Result<(), ScanError> {
        let metadata = match self.reader.metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                self.record_warning(format!("Permission denied: {}", path.display()))
                    .await;
                self.progress.write().await.scanned_files += 1;
                return Ok(());
            }
            Err(e) => return Err(ScanError::read_failed(path, e)),
        };

        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let item = ScannedItem {
            parsed: parse(&filename),
            file_path: path.clone(),
            folder: root.to_path_buf(),
            file_size: metadata.len(),
            modified_at: metadata.modified().ok().map(DateTime::<Utc>::from),
        };

        self.items.write().await.push(item.clone());
        FILES_SCANNED.inc();

        let snapshot = {
            let mut progress = self.progress.write().await;
            progress.scanned_files += 1;
            progress.found_items += 1;
            progress.current_path = Some(path);
            throttle.ready().then(|| progress.clone())
        };

        self.emit(ScanEvent::Item(item));
        if let Some(snapshot) = snapshot {
            self.emit(ScanEvent::Progress(snapshot));
        }
        Ok(())
    }

    async fn record_warning(&self, message: String) {
        warn!("{}", message);
        self.progress.write().await.errors.push(message);
    }

    fn emit(&self, event: ScanEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

fn is_skipped_directory(path: &Path) -> bool {
    path.file_name()
        .map(|name| should_skip_directory(&name.to_string_lossy()))
        .unwrap_or(false)
}

fn has_media_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| is_media_extension(&ext.to_string_lossy()))
        .unwrap_or(false)
}
