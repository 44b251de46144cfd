//! Types produced by the filename parser.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad media category inferred from a filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Series,
    Music,
    Book,
    Unknown,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Series => "series",
            MediaType::Music => "music",
            MediaType::Book => "book",
            MediaType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured metadata extracted from a single filename.
///
/// Fields that do not apply to the detected type are always `None`, never an
/// empty string. The naming engine relies on that distinction to drop
/// optional segments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedMedia {
    #[serde(rename = "type")]
    pub media_type: MediaType,
    /// Cleaned title. May be empty for degenerate input.
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Extension exactly as it appeared, including the leading dot.
    pub extension: String,
    pub original_filename: String,
}

impl ParsedMedia {
    /// Creates a result of the given type with every optional field unset.
    pub fn new(
        media_type: MediaType,
        title: impl Into<String>,
        extension: impl Into<String>,
        original_filename: impl Into<String>,
    ) -> Self {
        Self {
            media_type,
            title: title.into(),
            year: None,
            quality: None,
            source: None,
            codec: None,
            season: None,
            episode: None,
            episode_title: None,
            artist: None,
            album: None,
            track: None,
            author: None,
            extension: extension.into(),
            original_filename: original_filename.into(),
        }
    }

    /// The original filename without its extension.
    pub fn stem(&self) -> &str {
        self.original_filename
            .strip_suffix(self.extension.as_str())
            .unwrap_or(&self.original_filename)
    }
}
