//! Filename parser for media files.
//!
//! Turns release-style filenames into [`ParsedMedia`]:
//!
//! - "Inception.2010.1080p.BluRay.x264-GROUP.mkv" is a movie with year and quality
//! - "Breaking.Bad.S01E01.Pilot.720p.BluRay.x264-DEMAND.mkv" is a series episode
//! - "Artist - Album - 03 - Title.flac" is a music track
//! - "Author - Title.epub" is a book
//!
//! Parsing is pure and deterministic. Ambiguous names degrade to fewer
//! fields, never to an error.

mod filename;
mod patterns;
mod types;

pub use filename::{clean_title, parse};
pub use patterns::{
    is_media_extension, media_type_for_extension, AUDIO_EXTENSIONS, BOOK_EXTENSIONS,
    VIDEO_EXTENSIONS,
};
pub use types::{MediaType, ParsedMedia};
