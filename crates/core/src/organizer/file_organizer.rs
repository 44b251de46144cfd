//! File organizer implementation.

use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

use super::error::OrganizerError;
use super::fs_ops::{is_cross_device, FileOps, LocalFileOps};
use super::paths::{next_free_path, normalize_path};
use super::types::{
    ConflictResolution, OrganizeEvent, OrganizeOperation, OrganizeOptions, OrganizeProgress,
    OrganizeResult, OrganizeSummary, OrganizerStatus, ResultStatus,
};
use crate::metrics::ORGANIZE_RESULTS;
use crate::naming::preview_organized_path;
use crate::scanner::ScannedItem;
use crate::throttle::ProgressThrottle;

const EVENT_CAPACITY: usize = 256;

const CROSS_DEVICE_NOTE: &str =
    "Hardlink not possible across filesystems, file was copied instead";

enum Plan {
    Place(PathBuf),
    Done(OrganizeResult),
}

enum Outcome {
    Placed {
        destination: PathBuf,
        operation: OrganizeOperation,
        note: Option<String>,
        conflict_action: Option<ConflictResolution>,
    },
    Conflict,
}

/// Where an item would go, or why it stays put.
fn plan_item(item: &ScannedItem, options: &OrganizeOptions) -> Plan {
    let source = item.file_path.clone();
    let media_type = item.parsed.media_type;

    let Some(root) = options.destinations.for_type(media_type) else {
        return Plan::Done(
            OrganizeResult::new(source, None, options.operation, ResultStatus::Skipped)
                .with_error(format!("No destination configured for {} files", media_type)),
        );
    };

    let destination = preview_organized_path(&item.parsed, root, &options.naming).full_path;
    if normalize_path(&source) == normalize_path(&destination) {
        return Plan::Done(
            OrganizeResult::new(
                source,
                Some(destination),
                options.operation,
                ResultStatus::Skipped,
            )
            .with_error("Already in correct location"),
        );
    }

    Plan::Place(destination)
}

/// Computes where each item would be placed. Reads nothing from disk.
pub fn preview_organization(
    items: &[ScannedItem],
    options: &OrganizeOptions,
) -> Vec<OrganizeResult> {
    items
        .iter()
        .map(|item| match plan_item(item, options) {
            Plan::Done(result) => result,
            Plan::Place(destination) => OrganizeResult::new(
                item.file_path.clone(),
                Some(destination),
                options.operation,
                ResultStatus::DryRun,
            ),
        })
        .collect()
}

/// Moves, copies or hardlinks scanned items into the library layout.
///
/// One run at a time. Per-item failures are recorded in the results and
/// never stop the batch.
pub struct FileOrganizer<F: FileOps = LocalFileOps> {
    ops: F,
    progress: RwLock<OrganizeProgress>,
    results: RwLock<Vec<OrganizeResult>>,
    abort_requested: AtomicBool,
    events: broadcast::Sender<OrganizeEvent>,
}

impl Default for FileOrganizer<LocalFileOps> {
    fn default() -> Self {
        Self::new()
    }
}

impl FileOrganizer<LocalFileOps> {
    /// Creates an organizer working on the local filesystem.
    pub fn new() -> Self {
        Self::with_ops(LocalFileOps::default())
    }
}

impl<F: FileOps> FileOrganizer<F> {
    pub fn with_ops(ops: F) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            ops,
            progress: RwLock::new(OrganizeProgress::default()),
            results: RwLock::new(Vec::new()),
            abort_requested: AtomicBool::new(false),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OrganizeEvent> {
        self.events.subscribe()
    }

    pub async fn progress(&self) -> OrganizeProgress {
        self.progress.read().await.clone()
    }

    /// Results of the current or most recent run, including aborted ones.
    pub async fn results(&self) -> Vec<OrganizeResult> {
        self.results.read().await.clone()
    }

    pub async fn is_organizing(&self) -> bool {
        self.progress.read().await.status == OrganizerStatus::Organizing
    }

    /// Requests cancellation of the running batch. Returns false when idle.
    pub async fn abort(&self) -> bool {
        if !self.is_organizing().await {
            return false;
        }
        info!("Organize abort requested");
        self.abort_requested.store(true, Ordering::SeqCst);
        true
    }

    /// Organizes `items` according to `options`.
    pub async fn organize(
        &self,
        items: &[ScannedItem],
        options: &OrganizeOptions,
    ) -> Result<OrganizeSummary, OrganizerError> {
        {
            let mut progress = self.progress.write().await;
            if progress.status == OrganizerStatus::Organizing {
                return Err(OrganizerError::AlreadyOrganizing);
            }
            // Cleared before the status is visible so an early abort sticks.
            self.abort_requested.store(false, Ordering::SeqCst);
            *progress = OrganizeProgress {
                status: OrganizerStatus::Organizing,
                total: items.len(),
                started_at: Some(Utc::now()),
                ..Default::default()
            };
        }
        self.results.write().await.clear();

        let start = Instant::now();
        info!(
            items = items.len(),
            operation = %options.operation,
            dry_run = options.dry_run,
            "Starting organize run"
        );

        let mut throttle = ProgressThrottle::default();
        for item in items {
            if self.abort_requested.load(Ordering::SeqCst) {
                return Err(self.fail(OrganizerError::Aborted).await);
            }
            self.progress.write().await.current_path = Some(item.file_path.clone());

            let result = self.organize_item(item, options).await;
            ORGANIZE_RESULTS
                .with_label_values(&[result.status.as_str()])
                .inc();
            self.results.write().await.push(result.clone());

            let snapshot = {
                let mut progress = self.progress.write().await;
                progress.processed += 1;
                throttle.ready().then(|| progress.clone())
            };
            self.emit(OrganizeEvent::Item(result));
            if let Some(snapshot) = snapshot {
                self.emit(OrganizeEvent::Progress(snapshot));
            }
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        let results = self.results.read().await.clone();
        let summary = OrganizeSummary::from_results(results, duration_ms);

        let snapshot = {
            let mut progress = self.progress.write().await;
            progress.status = OrganizerStatus::Completed;
            progress.completed_at = Some(Utc::now());
            progress.current_path = None;
            progress.clone()
        };

        info!(
            total = summary.total,
            moved = summary.moved,
            copied = summary.copied,
            hardlinked = summary.hardlinked,
            skipped = summary.skipped,
            conflicts = summary.conflicts,
            failed = summary.failed,
            duration_ms,
            "Organize run completed"
        );

        self.emit(OrganizeEvent::Progress(snapshot));
        self.emit(OrganizeEvent::Complete {
            total: summary.total,
            failed: summary.failed,
            duration_ms,
        });
        Ok(summary)
    }

    async fn fail(&self, error: OrganizerError) -> OrganizerError {
        let message = error.to_string();
        {
            let mut progress = self.progress.write().await;
            progress.status = OrganizerStatus::Failed;
            progress.completed_at = Some(Utc::now());
            progress.error = Some(message.clone());
        }
        warn!(error = %message, "Organize run did not complete");
        self.emit(OrganizeEvent::Error { message });
        error
    }

    async fn organize_item(&self, item: &ScannedItem, options: &OrganizeOptions) -> OrganizeResult {
        let destination = match plan_item(item, options) {
            Plan::Done(result) => {
                debug!(
                    path = %item.file_path.display(),
                    reason = result.error.as_deref().unwrap_or_default(),
                    "Skipping item"
                );
                return result;
            }
            Plan::Place(destination) => destination,
        };
        let source = item.file_path.clone();

        if options.dry_run {
            return OrganizeResult::new(
                source,
                Some(destination),
                options.operation,
                ResultStatus::DryRun,
            );
        }

        match self.place(item, destination.clone(), options).await {
            Ok(Outcome::Placed {
                destination,
                operation,
                note,
                conflict_action,
            }) => {
                debug!(
                    from = %source.display(),
                    to = %destination.display(),
                    %operation,
                    "Placed file"
                );
                let result = OrganizeResult::new(
                    source,
                    Some(destination),
                    operation,
                    ResultStatus::Success,
                )
                .with_conflict_action(conflict_action);
                match note {
                    Some(note) => result.with_error(note),
                    None => result,
                }
            }
            Ok(Outcome::Conflict) => OrganizeResult::new(
                source,
                Some(destination),
                options.operation,
                ResultStatus::Conflict,
            )
            .with_error("Destination already exists")
            .with_conflict_action(Some(ConflictResolution::Skip)),
            Err(e) => {
                warn!(path = %source.display(), error = %e, "Failed to organize file");
                OrganizeResult::new(
                    source,
                    Some(destination),
                    options.operation,
                    ResultStatus::Failed,
                )
                .with_error(e.to_string())
            }
        }
    }

    async fn place(
        &self,
        item: &ScannedItem,
        mut destination: PathBuf,
        options: &OrganizeOptions,
    ) -> Result<Outcome, OrganizerError> {
        let source = item.file_path.as_path();
        let verify = options.verify_checksums;

        let mut conflict_action = None;
        if self.ops.exists(&destination).await {
            match options.conflict_resolution {
                ConflictResolution::Skip => return Ok(Outcome::Conflict),
                ConflictResolution::Rename => {
                    destination = next_free_path(&self.ops, &destination).await?;
                }
                ConflictResolution::Overwrite => {
                    self.ops
                        .remove_file(&destination)
                        .await
                        .map_err(|e| OrganizerError::remove_failed(destination.clone(), e))?;
                }
            }
            conflict_action = Some(options.conflict_resolution);
        }

        if let Some(parent) = destination.parent() {
            self.ops.create_dir_all(parent).await.map_err(|e| {
                OrganizerError::DirectoryCreationFailed {
                    path: parent.to_path_buf(),
                    error: e,
                }
            })?;
        }

        let (operation, note) = match options.operation {
            OrganizeOperation::Move => {
                self.move_file(source, &destination, verify).await?;
                if options.cleanup_empty_folders {
                    self.cleanup_empty_parents(source, &item.folder).await;
                }
                (OrganizeOperation::Move, None)
            }
            OrganizeOperation::Copy => {
                self.copy_file(source, &destination, verify).await?;
                (OrganizeOperation::Copy, None)
            }
            OrganizeOperation::Hardlink => match self.ops.hard_link(source, &destination).await {
                Ok(()) => (OrganizeOperation::Hardlink, None),
                Err(e) if is_cross_device(&e) => {
                    info!(path = %source.display(), "Hardlink crosses filesystems, copying");
                    self.copy_file(source, &destination, verify).await?;
                    (OrganizeOperation::Copy, Some(CROSS_DEVICE_NOTE.to_string()))
                }
                Err(e) => {
                    return Err(OrganizerError::hardlink_failed(
                        source.to_path_buf(),
                        destination,
                        e,
                    ))
                }
            },
        };

        Ok(Outcome::Placed {
            destination,
            operation,
            note,
            conflict_action,
        })
    }

    /// Renames in place, or copies and deletes the source across filesystems.
    async fn move_file(
        &self,
        source: &Path,
        destination: &Path,
        verify: bool,
    ) -> Result<(), OrganizerError> {
        match self.ops.rename(source, destination).await {
            Ok(()) => Ok(()),
            Err(e) if is_cross_device(&e) => {
                debug!(path = %source.display(), "Move crosses filesystems, copying");
                self.copy_file(source, destination, verify).await?;
                self.ops
                    .remove_file(source)
                    .await
                    .map_err(|e| OrganizerError::remove_failed(source.to_path_buf(), e))
            }
            Err(e) => Err(OrganizerError::move_failed(
                source.to_path_buf(),
                destination.to_path_buf(),
                e,
            )),
        }
    }

    async fn copy_file(
        &self,
        source: &Path,
        destination: &Path,
        verify: bool,
    ) -> Result<(), OrganizerError> {
        self.ops.copy(source, destination).await.map_err(|e| {
            OrganizerError::copy_failed(source.to_path_buf(), destination.to_path_buf(), e)
        })?;

        if verify {
            let expected = self.ops.sha256(source).await?;
            let actual = self.ops.sha256(destination).await?;
            if expected != actual {
                if let Err(e) = self.ops.remove_file(destination).await {
                    warn!(path = %destination.display(), error = %e, "Failed to remove bad copy");
                }
                return Err(OrganizerError::ChecksumMismatch {
                    path: destination.to_path_buf(),
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }

    /// Removes emptied source directories up to, not including, the media folder.
    async fn cleanup_empty_parents(&self, source: &Path, folder: &Path) {
        let mut current = source.parent();
        while let Some(dir) = current {
            if dir == folder || !dir.starts_with(folder) {
                break;
            }
            if !matches!(self.ops.is_dir_empty(dir).await, Ok(true)) {
                break;
            }
            if let Err(e) = self.ops.remove_dir(dir).await {
                debug!(path = %dir.display(), error = %e, "Could not remove empty folder");
                break;
            }
            debug!(path = %dir.display(), "Removed empty folder");
            current = dir.parent();
        }
    }

    fn emit(&self, event: OrganizeEvent) {
        let _ = self.events.send(event);
    }
}
