//! Executes verification jobs.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use tokio::fs;

use super::error::QueueError;
use super::types::{JobOptions, JobType, VerifyJob};
use crate::parser::is_media_extension;
use crate::verify::{
    list_files, scan_directory, scan_file, verify_content, FallbackProber, MediaProber,
    VerifyError, VerifyReport,
};

/// Runs the checks a job asks for.
#[async_trait]
pub trait JobRunner: Send + Sync {
    async fn run(&self, job: &VerifyJob) -> Result<VerifyReport, QueueError>;
}

/// Files of one folder job probed at the same time.
const FOLDER_PROBE_PARALLELISM: usize = 4;

/// [`JobRunner`] backed by the content and security checks.
pub struct MediaVerifier<P: MediaProber = FallbackProber> {
    prober: P,
}

impl<P: MediaProber> MediaVerifier<P> {
    pub fn new(prober: P) -> Self {
        Self { prober }
    }

    async fn verify_file(&self, path: &Path, options: &JobOptions) -> Result<VerifyReport, QueueError> {
        let mut report = VerifyReport {
            files_checked: 1,
            ..Default::default()
        };

        if options.mode.includes_content() {
            report
                .content
                .push(verify_content(&self.prober, path, &options.content).await);
        }
        if options.mode.includes_security() {
            report.security.push(scan_file(path).await?);
        }

        report.passed = report.content.iter().all(|r| r.passed)
            && report.security.iter().all(|r| r.safe);
        Ok(report)
    }

    async fn verify_folder(
        &self,
        path: &Path,
        options: &JobOptions,
    ) -> Result<VerifyReport, QueueError> {
        let (files, _) = list_files(path, options.recursive)
            .await
            .map_err(VerifyError::from)?;
        let mut report = VerifyReport {
            files_checked: files.len(),
            ..Default::default()
        };
        let mut safe = true;

        if options.mode.includes_security() {
            let scan = scan_directory(path, options.recursive).await?;
            safe = scan.safe;
            report.security = scan.flagged;
        }

        if options.mode.includes_content() {
            let media: Vec<PathBuf> = files
                .into_iter()
                .filter(|file| {
                    file.extension()
                        .map(|ext| is_media_extension(&ext.to_string_lossy()))
                        .unwrap_or(false)
                })
                .collect();
            let prober = &self.prober;
            let content = &options.content;
            report.content = stream::iter(media)
                .map(move |file| async move { verify_content(prober, &file, content).await })
                .buffered(FOLDER_PROBE_PARALLELISM)
                .collect()
                .await;
        }

        report.passed = safe && report.content.iter().all(|r| r.passed);
        Ok(report)
    }
}

#[async_trait]
impl<P: MediaProber> JobRunner for MediaVerifier<P> {
    async fn run(&self, job: &VerifyJob) -> Result<VerifyReport, QueueError> {
        let metadata = fs::metadata(&job.path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                VerifyError::not_found(&job.path)
            } else {
                VerifyError::Io(e)
            }
        })?;

        match job.job_type {
            JobType::File if metadata.is_file() => self.verify_file(&job.path, &job.options).await,
            JobType::Folder if metadata.is_dir() => {
                self.verify_folder(&job.path, &job.options).await
            }
            JobType::File => Err(QueueError::invalid_job(format!(
                "{} is not a file",
                job.path.display()
            ))),
            JobType::Folder => Err(QueueError::invalid_job(format!(
                "{} is not a folder",
                job.path.display()
            ))),
        }
    }
}
