//! Naming templates per media type.

use serde::{Deserialize, Serialize};

/// Template sets for every media type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingConfig {
    #[serde(default)]
    pub series: SeriesNaming,
    #[serde(default)]
    pub movie: MovieNaming,
    #[serde(default)]
    pub music: MusicNaming,
    #[serde(default)]
    pub book: BookNaming,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesNaming {
    #[serde(default = "default_series_folder")]
    pub folder: String,
    /// An empty template places episodes directly in the show folder.
    #[serde(default = "default_season_folder")]
    pub season_folder: Option<String>,
    #[serde(default = "default_series_file")]
    pub file: String,
}

impl Default for SeriesNaming {
    fn default() -> Self {
        Self {
            folder: default_series_folder(),
            season_folder: default_season_folder(),
            file: default_series_file(),
        }
    }
}

fn default_series_folder() -> String {
    "{Series.Title}".to_string()
}

fn default_season_folder() -> Option<String> {
    Some("Season {Season:00}".to_string())
}

fn default_series_file() -> String {
    "{Series.Title} - S{Season:00}E{Episode:00} - {Episode.Title} [{Quality}]".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieNaming {
    #[serde(default = "default_movie_folder")]
    pub folder: String,
    #[serde(default = "default_movie_file")]
    pub file: String,
}

impl Default for MovieNaming {
    fn default() -> Self {
        Self {
            folder: default_movie_folder(),
            file: default_movie_file(),
        }
    }
}

fn default_movie_folder() -> String {
    "{Movie.Title} ({Year})".to_string()
}

fn default_movie_file() -> String {
    "{Movie.Title} ({Year}) [{Quality}]".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MusicNaming {
    #[serde(default = "default_artist_folder")]
    pub artist_folder: Option<String>,
    #[serde(default = "default_album_folder")]
    pub album_folder: Option<String>,
    #[serde(default = "default_music_file")]
    pub file: String,
}

impl Default for MusicNaming {
    fn default() -> Self {
        Self {
            artist_folder: default_artist_folder(),
            album_folder: default_album_folder(),
            file: default_music_file(),
        }
    }
}

fn default_artist_folder() -> Option<String> {
    Some("{Artist}".to_string())
}

fn default_album_folder() -> Option<String> {
    Some("{Album}".to_string())
}

fn default_music_file() -> String {
    "{Track:00} - {Title}".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookNaming {
    #[serde(default = "default_author_folder")]
    pub author_folder: Option<String>,
    #[serde(default = "default_book_file")]
    pub file: String,
}

impl Default for BookNaming {
    fn default() -> Self {
        Self {
            author_folder: default_author_folder(),
            file: default_book_file(),
        }
    }
}

fn default_author_folder() -> Option<String> {
    Some("{Author}".to_string())
}

fn default_book_file() -> String {
    "{Title}".to_string()
}
