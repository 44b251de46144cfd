//! Naming template engine.
//!
//! Computes canonical folder and file names for parsed media from
//! configurable templates such as `{Series.Title} - S{Season:00}E{Episode:00}`.
//!
//! # Tokens
//!
//! | Token | Value |
//! |-------|-------|
//! | `{Series.Title}`, `{Movie.Title}`, `{Title}` | cleaned title |
//! | `{*.CleanTitle}`, `{*.CleanName}` | letters, digits and spaces only |
//! | `{Season}`, `{Episode}`, `{Track}` | numbers, `:00` pads to the number of zeros |
//! | `{Episode.Title}`, `{Year}`, `{Quality}`, `{Source}`, `{Codec}` | parsed fields |
//! | `{Artist}`, `{Album}`, `{Author}` | parsed fields |
//! | `{Extension}` | extension without the dot |
//!
//! Tokens without a value expand to nothing and the surrounding empty
//! brackets and doubled separators are removed.

mod config;
mod paths;
mod template;

pub use config::{BookNaming, MovieNaming, MusicNaming, NamingConfig, SeriesNaming};
pub use paths::{generate_filename, generate_folder_path, preview_organized_path, OrganizedPath};
pub use template::{apply_template, clean_for_filename, clean_name, MAX_NAME_LENGTH};
