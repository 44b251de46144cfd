//! Folder and filename generation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::config::NamingConfig;
use super::template::{apply_template, clean_for_filename};
use crate::parser::{MediaType, ParsedMedia};

/// Where an item would land under a destination root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizedPath {
    pub folder_path: PathBuf,
    pub filename: String,
    pub full_path: PathBuf,
}

/// Folder segments below the destination root, empty ones removed.
pub fn generate_folder_path(parsed: &ParsedMedia, config: &NamingConfig) -> Vec<String> {
    let templates: Vec<&str> = match parsed.media_type {
        MediaType::Series => {
            let mut templates = vec![config.series.folder.as_str()];
            templates.extend(config.series.season_folder.as_deref());
            templates
        }
        MediaType::Movie => vec![config.movie.folder.as_str()],
        MediaType::Music => config
            .music
            .artist_folder
            .as_deref()
            .into_iter()
            .chain(config.music.album_folder.as_deref())
            .collect(),
        MediaType::Book => config.book.author_folder.as_deref().into_iter().collect(),
        MediaType::Unknown => Vec::new(),
    };

    templates
        .into_iter()
        .map(|template| clean_for_filename(&apply_template(template, parsed, None)))
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Final filename including the original extension.
///
/// Falls back to the cleaned original name when the template expands to
/// nothing.
pub fn generate_filename(parsed: &ParsedMedia, config: &NamingConfig) -> String {
    let template = match parsed.media_type {
        MediaType::Series => Some(config.series.file.as_str()),
        MediaType::Movie => Some(config.movie.file.as_str()),
        MediaType::Music => Some(config.music.file.as_str()),
        MediaType::Book => Some(config.book.file.as_str()),
        MediaType::Unknown => None,
    };

    let mut name = template
        .map(|template| clean_for_filename(&apply_template(template, parsed, None)))
        .unwrap_or_default();
    if name.is_empty() {
        name = clean_for_filename(parsed.stem());
    }

    let extension = &parsed.extension;
    if !extension.is_empty() && !name.to_lowercase().ends_with(&extension.to_lowercase()) {
        name.push_str(extension);
    }
    name
}

/// Computes the organized location of `parsed` below `root` without touching disk.
pub fn preview_organized_path(
    parsed: &ParsedMedia,
    root: &Path,
    config: &NamingConfig,
) -> OrganizedPath {
    let folder_path = generate_folder_path(parsed, config)
        .into_iter()
        .fold(root.to_path_buf(), |path, segment| path.join(segment));
    let filename = generate_filename(parsed, config);
    let full_path = folder_path.join(&filename);

    OrganizedPath {
        folder_path,
        filename,
        full_path,
    }
}
