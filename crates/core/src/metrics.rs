//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Scanner (runs, files parsed)
//! - Organizer (per-item outcomes)
//! - Verification queue (job results, durations, depth)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGaugeVec, Opts};

// =============================================================================
// Scanner
// =============================================================================

/// Library scans by result.
pub static SCANS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("mediashelf_scans_total", "Total library scans"),
        &["result"], // "completed", "failed", "aborted"
    )
    .unwrap()
});

/// Media files parsed by the scanner.
pub static FILES_SCANNED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "mediashelf_files_scanned_total",
        "Total media files found by the scanner",
    )
    .unwrap()
});

// =============================================================================
// Organizer
// =============================================================================

/// Organized items by outcome.
pub static ORGANIZE_RESULTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("mediashelf_organize_results_total", "Total organized items"),
        &["status"], // "success", "skipped", "failed", "conflict", "dry-run"
    )
    .unwrap()
});

// =============================================================================
// Verification
// =============================================================================

/// Finished verification jobs by result.
pub static VERIFY_JOBS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("mediashelf_verify_jobs_total", "Total verification jobs"),
        &["result"], // "passed", "rejected", "failed"
    )
    .unwrap()
});

/// Verification job duration in seconds.
pub static VERIFY_JOB_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "mediashelf_verify_job_duration_seconds",
            "Duration of verification jobs",
        )
        .buckets(vec![0.05, 0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 300.0]),
        &["job_type"],
    )
    .unwrap()
});

/// Jobs currently held by the queue.
pub static VERIFY_QUEUE_DEPTH: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new("mediashelf_verify_queue_depth", "Jobs in the verification queue"),
        &["status"], // "queued", "running"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(SCANS_TOTAL.clone()),
        Box::new(FILES_SCANNED.clone()),
        Box::new(ORGANIZE_RESULTS.clone()),
        Box::new(VERIFY_JOBS.clone()),
        Box::new(VERIFY_JOB_DURATION.clone()),
        Box::new(VERIFY_QUEUE_DEPTH.clone()),
    ]
}
