use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

use crate::naming::NamingConfig;
use crate::organizer::{ConflictResolution, Destinations, OrganizeOperation, OrganizeOptions};
use crate::queue::QueueConfig;
use crate::scanner::MediaFolder;
use crate::verify::{FallbackProber, FfprobeProber};

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub library: LibraryConfig,
    #[serde(default)]
    pub organizer: OrganizerConfig,
    #[serde(default)]
    pub naming: NamingConfig,
    #[serde(default)]
    pub verify: VerifyConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Builds organizer options from the configured defaults.
    pub fn organize_options(&self, dry_run: bool) -> OrganizeOptions {
        OrganizeOptions {
            destinations: self.organizer.destinations.clone(),
            naming: self.naming.clone(),
            operation: self.organizer.operation,
            conflict_resolution: self.organizer.conflict_resolution,
            cleanup_empty_folders: self.organizer.cleanup_empty_folders,
            verify_checksums: self.organizer.verify_checksums,
            dry_run,
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Media folders scanned by the directory scanner
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LibraryConfig {
    #[serde(default)]
    pub folders: Vec<MediaFolder>,
}

/// Defaults for organize runs
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrganizerConfig {
    #[serde(default)]
    pub operation: OrganizeOperation,
    #[serde(default)]
    pub conflict_resolution: ConflictResolution,
    #[serde(default = "default_true")]
    pub cleanup_empty_folders: bool,
    /// Compare SHA-256 of source and destination after every copy.
    #[serde(default)]
    pub verify_checksums: bool,
    #[serde(default)]
    pub destinations: Destinations,
}

impl Default for OrganizerConfig {
    fn default() -> Self {
        Self {
            operation: OrganizeOperation::default(),
            conflict_resolution: ConflictResolution::default(),
            cleanup_empty_folders: true,
            verify_checksums: false,
            destinations: Destinations::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Verification queue and probe configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VerifyConfig {
    /// Maximum verification jobs running at once (default: 2)
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    /// Upper bound on how long the scheduler sleeps between checks
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
    /// Terminal jobs older than this are pruned by housekeeping (default: 24h)
    #[serde(default = "default_max_job_age_secs")]
    pub max_job_age_secs: u64,
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: String,
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            poll_interval_ms: default_poll_interval_ms(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
            max_job_age_secs: default_max_job_age_secs(),
            ffprobe_path: default_ffprobe_path(),
            probe_timeout_secs: default_probe_timeout_secs(),
        }
    }
}

impl VerifyConfig {
    /// ffprobe with the filename heuristic as fallback.
    pub fn prober(&self) -> FallbackProber {
        FallbackProber::new(FfprobeProber::new(
            self.ffprobe_path.clone(),
            Duration::from_secs(self.probe_timeout_secs),
        ))
    }

    pub fn queue_config(&self) -> QueueConfig {
        QueueConfig {
            max_concurrent: self.max_concurrent,
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            cleanup_interval: Duration::from_secs(self.cleanup_interval_secs),
            max_job_age: Duration::from_secs(self.max_job_age_secs),
        }
    }
}

fn default_max_concurrent() -> usize {
    2
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_cleanup_interval_secs() -> u64 {
    3600
}

fn default_max_job_age_secs() -> u64 {
    24 * 3600
}

fn default_ffprobe_path() -> String {
    "ffprobe".to_string()
}

fn default_probe_timeout_secs() -> u64 {
    60
}

/// Persistence for verification results
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_results_path")]
    pub results_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            results_path: default_results_path(),
        }
    }
}

fn default_results_path() -> PathBuf {
    PathBuf::from("data/verify-results.json")
}
