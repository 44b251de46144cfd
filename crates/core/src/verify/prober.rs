//! Media probing backends.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use super::error::VerifyError;
use super::types::{AudioTrack, MediaInfo, ProbeSource, SubtitleTrack, VideoInfo};
use crate::parser::parse;

/// Reads container and stream details from a media file.
#[async_trait]
pub trait MediaProber: Send + Sync {
    fn name(&self) -> &str;

    async fn probe(&self, path: &Path) -> Result<MediaInfo, VerifyError>;
}

#[async_trait]
impl<P: MediaProber + ?Sized> MediaProber for std::sync::Arc<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn probe(&self, path: &Path) -> Result<MediaInfo, VerifyError> {
        (**self).probe(path).await
    }
}

/// Nominal frame size for a quality token such as "1080p".
pub fn resolution_for_quality(quality: &str) -> Option<(u32, u32)> {
    match quality.to_ascii_lowercase().as_str() {
        "2160p" | "4k" | "uhd" => Some((3840, 2160)),
        "1080p" | "1080i" => Some((1920, 1080)),
        "720p" => Some((1280, 720)),
        "576p" => Some((720, 576)),
        "480p" => Some((720, 480)),
        _ => None,
    }
}

fn typical_bitrate_kbps(height: u32) -> u32 {
    match height {
        h if h >= 2160 => 20_000,
        h if h >= 1080 => 8_000,
        h if h >= 720 => 4_000,
        h if h >= 576 => 2_000,
        _ => 1_500,
    }
}

/// Runs `ffprobe` and parses its JSON report.
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    ffprobe_path: String,
    timeout: Duration,
}

impl Default for FfprobeProber {
    fn default() -> Self {
        Self::new("ffprobe", Duration::from_secs(60))
    }
}

impl FfprobeProber {
    pub fn new(ffprobe_path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
            timeout,
        }
    }

    /// Parses ffprobe JSON output into MediaInfo.
    pub fn parse_probe_output(output: &str) -> Result<MediaInfo, VerifyError> {
        #[derive(Deserialize)]
        struct ProbeOutput {
            format: ProbeFormat,
            #[serde(default)]
            streams: Vec<ProbeStream>,
        }

        #[derive(Deserialize)]
        struct ProbeFormat {
            format_name: String,
            duration: Option<String>,
            size: Option<String>,
            bit_rate: Option<String>,
        }

        #[derive(Deserialize)]
        struct ProbeStream {
            codec_type: String,
            codec_name: Option<String>,
            bit_rate: Option<String>,
            channels: Option<u32>,
            width: Option<u32>,
            height: Option<u32>,
            r_frame_rate: Option<String>,
            #[serde(default)]
            tags: HashMap<String, String>,
            #[serde(default)]
            disposition: HashMap<String, i64>,
        }

        impl ProbeStream {
            fn codec(&self) -> String {
                self.codec_name.clone().unwrap_or_else(|| "unknown".to_string())
            }

            fn bitrate_kbps(&self) -> Option<u32> {
                kbps(self.bit_rate.as_deref())
            }

            fn language(&self) -> Option<String> {
                self.tags
                    .get("language")
                    .filter(|lang| !lang.is_empty() && lang.as_str() != "und")
                    .cloned()
            }
        }

        fn kbps(bits: Option<&str>) -> Option<u32> {
            bits.and_then(|b| b.parse::<u64>().ok())
                .map(|b| (b / 1000) as u32)
        }

        fn frame_rate(rate: &str) -> Option<f32> {
            // "24000/1001" or "30/1"
            match rate.split_once('/') {
                Some((num, den)) => {
                    let num = num.parse::<f32>().ok()?;
                    let den = den.parse::<f32>().ok()?;
                    (den > 0.0).then(|| num / den)
                }
                None => rate.parse::<f32>().ok(),
            }
        }

        let probe: ProbeOutput =
            serde_json::from_str(output).map_err(|e| VerifyError::ParseError {
                reason: e.to_string(),
            })?;

        let video = probe
            .streams
            .iter()
            .find(|s| s.codec_type == "video" && s.disposition.get("attached_pic") != Some(&1))
            .map(|s| VideoInfo {
                codec: s.codec(),
                width: s.width.unwrap_or(0),
                height: s.height.unwrap_or(0),
                bitrate_kbps: s.bitrate_kbps(),
                framerate: s.r_frame_rate.as_deref().and_then(frame_rate),
            });

        let audio_tracks = probe
            .streams
            .iter()
            .filter(|s| s.codec_type == "audio")
            .map(|s| AudioTrack {
                codec: s.codec(),
                channels: s.channels,
                language: s.language(),
                bitrate_kbps: s.bitrate_kbps(),
            })
            .collect();

        let subtitle_tracks = probe
            .streams
            .iter()
            .filter(|s| s.codec_type == "subtitle")
            .map(|s| SubtitleTrack {
                codec: s.codec(),
                language: s.language(),
                forced: s.disposition.get("forced") == Some(&1),
            })
            .collect();

        let container = probe
            .format
            .format_name
            .split(',')
            .next()
            .unwrap_or("unknown")
            .to_string();

        Ok(MediaInfo {
            container,
            duration_secs: probe
                .format
                .duration
                .as_deref()
                .and_then(|d| d.parse::<f64>().ok()),
            size_bytes: probe
                .format
                .size
                .as_deref()
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(0),
            bitrate_kbps: kbps(probe.format.bit_rate.as_deref()),
            video,
            audio_tracks,
            subtitle_tracks,
            source: ProbeSource::Ffprobe,
        })
    }
}

#[async_trait]
impl MediaProber for FfprobeProber {
    fn name(&self) -> &str {
        "ffprobe"
    }

    async fn probe(&self, path: &Path) -> Result<MediaInfo, VerifyError> {
        if !fs::try_exists(path).await? {
            return Err(VerifyError::not_found(path));
        }

        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .kill_on_drop(true)
            .output();

        let output = match timeout(self.timeout, output).await {
            Ok(result) => result.map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    VerifyError::FfprobeNotFound {
                        path: self.ffprobe_path.clone(),
                    }
                } else {
                    VerifyError::Io(e)
                }
            })?,
            Err(_) => {
                return Err(VerifyError::ProbeTimeout {
                    timeout_secs: self.timeout.as_secs(),
                })
            }
        };

        if !output.status.success() {
            return Err(VerifyError::probe_failed(format!(
                "ffprobe failed: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        Self::parse_probe_output(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Estimates stream details from the filename alone.
///
/// Resolution comes from the quality token and bitrate from a typical value
/// for that resolution. Duration and tracks stay unknown.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicProber;

impl HeuristicProber {
    pub fn estimate(path: &Path, size_bytes: u64) -> MediaInfo {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let parsed = parse(&filename);

        let video = parsed
            .quality
            .as_deref()
            .and_then(resolution_for_quality)
            .map(|(width, height)| VideoInfo {
                codec: parsed.codec.clone().unwrap_or_else(|| "unknown".to_string()),
                width,
                height,
                bitrate_kbps: Some(typical_bitrate_kbps(height)),
                framerate: None,
            });

        MediaInfo {
            container: parsed.extension.trim_start_matches('.').to_ascii_lowercase(),
            duration_secs: None,
            size_bytes,
            bitrate_kbps: video.as_ref().and_then(|v| v.bitrate_kbps),
            video,
            audio_tracks: Vec::new(),
            subtitle_tracks: Vec::new(),
            source: ProbeSource::Heuristic,
        }
    }
}

#[async_trait]
impl MediaProber for HeuristicProber {
    fn name(&self) -> &str {
        "heuristic"
    }

    async fn probe(&self, path: &Path) -> Result<MediaInfo, VerifyError> {
        let size_bytes = tokio::fs::metadata(path)
            .await
            .map(|m| m.len())
            .unwrap_or(0);
        Ok(Self::estimate(path, size_bytes))
    }
}

/// ffprobe, or filename heuristics when ffprobe is not installed.
#[derive(Debug, Clone, Default)]
pub struct FallbackProber {
    primary: FfprobeProber,
    fallback: HeuristicProber,
}

impl FallbackProber {
    pub fn new(primary: FfprobeProber) -> Self {
        Self {
            primary,
            fallback: HeuristicProber,
        }
    }
}

#[async_trait]
impl MediaProber for FallbackProber {
    fn name(&self) -> &str {
        "ffprobe+heuristic"
    }

    async fn probe(&self, path: &Path) -> Result<MediaInfo, VerifyError> {
        match self.primary.probe(path).await {
            Err(VerifyError::FfprobeNotFound { path: binary }) => {
                debug!(ffprobe = %binary, "ffprobe unavailable, using filename heuristics");
                self.fallback.probe(path).await
            }
            other => other,
        }
    }
}
