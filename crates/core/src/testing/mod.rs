//! Testing utilities and mock implementations.
//!
//! Mocks stand in for the probe subprocess, the queue's job runner,
//! cross-filesystem behaviour and unreadable folders, so tests run without
//! ffprobe, extra mounts or an unprivileged user.
//!
//! # Example
//!
//! ```rust,ignore
//! use mediashelf_core::testing::{fixtures, MockJobRunner, MockProber};
//!
//! let prober = MockProber::new();
//! prober.set_info("/downloads/movie.mkv", fixtures::media_info_1080p(7200.0));
//!
//! let runner = MockJobRunner::new();
//! runner.fail_path("/downloads/broken.mkv", "corrupt");
//! ```

mod cross_device;
mod denied_reader;
mod mock_job_runner;
mod mock_prober;

pub use cross_device::CrossDeviceFileOps;
pub use denied_reader::DeniedDirectoryReader;
pub use mock_job_runner::MockJobRunner;
pub use mock_prober::MockProber;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::Path;

    use crate::parser::parse;
    use crate::scanner::ScannedItem;
    use crate::verify::{AudioTrack, MediaInfo, ProbeSource, VideoInfo};

    /// A healthy 1080p Matroska file with one English audio track.
    pub fn media_info_1080p(duration_secs: f64) -> MediaInfo {
        MediaInfo {
            container: "matroska".to_string(),
            duration_secs: Some(duration_secs),
            size_bytes: 4 * 1024 * 1024 * 1024,
            bitrate_kbps: Some(8_640),
            video: Some(VideoInfo {
                codec: "h264".to_string(),
                width: 1920,
                height: 1080,
                bitrate_kbps: Some(8_000),
                framerate: Some(23.976),
            }),
            audio_tracks: vec![AudioTrack {
                codec: "aac".to_string(),
                channels: Some(6),
                language: Some("eng".to_string()),
                bitrate_kbps: Some(640),
            }],
            subtitle_tracks: Vec::new(),
            source: ProbeSource::Mock,
        }
    }

    /// A scanned item for `relative` under `folder`. Nothing is written to disk.
    pub fn scanned_item(folder: &Path, relative: &str, file_size: u64) -> ScannedItem {
        ScannedItem {
            file_path: folder.join(relative),
            folder: folder.to_path_buf(),
            parsed: parse(relative),
            file_size,
            modified_at: None,
        }
    }

    /// Takes every permission away from `dir`.
    ///
    /// Returns false, with permissions restored, when the directory can still
    /// be listed afterwards (root ignores modes). Tests should skip then.
    #[cfg(unix)]
    pub fn lock_directory(dir: &Path) -> std::io::Result<bool> {
        use std::os::unix::fs::PermissionsExt;

        std::fs::set_permissions(dir, std::fs::Permissions::from_mode(0o000))?;
        if std::fs::read_dir(dir).is_ok() {
            unlock_directory(dir)?;
            return Ok(false);
        }
        Ok(true)
    }

    /// Undoes [`lock_directory`] so the directory can be cleaned up.
    #[cfg(unix)]
    pub fn unlock_directory(dir: &Path) -> std::io::Result<()> {
        use std::os::unix::fs::PermissionsExt;

        std::fs::set_permissions(dir, std::fs::Permissions::from_mode(0o755))
    }

    /// Like [`scanned_item`] but also creates the file with `contents`.
    pub fn write_scanned_item(folder: &Path, relative: &str, contents: &[u8]) -> std::io::Result<ScannedItem> {
        let path = folder.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, contents)?;
        Ok(scanned_item(folder, relative, contents.len() as u64))
    }
}
