//! Ordered pattern tables used by the filename parser.
//!
//! Every table is scanned front to back and the first hit wins, so more
//! specific patterns must come before looser ones.

use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::types::MediaType;

pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mkv", "mp4", "avi", "mov", "wmv", "flv", "webm", "m4v", "mpg", "mpeg", "ts", "m2ts", "vob",
];

pub const AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "flac", "m4a", "aac", "ogg", "opus", "wav", "wma", "alac", "ape", "aiff",
];

pub const BOOK_EXTENSIONS: &[&str] = &[
    "epub", "pdf", "mobi", "azw", "azw3", "cbz", "cbr", "djvu", "fb2",
];

/// Provisional media type for a lower-case extension without the dot.
pub fn media_type_for_extension(ext: &str) -> MediaType {
    if AUDIO_EXTENSIONS.contains(&ext) {
        MediaType::Music
    } else if BOOK_EXTENSIONS.contains(&ext) {
        MediaType::Book
    } else if VIDEO_EXTENSIONS.contains(&ext) {
        MediaType::Movie
    } else {
        MediaType::Unknown
    }
}

/// Whether the extension (with or without the dot, any case) is a known media type.
pub fn is_media_extension(ext: &str) -> bool {
    let ext = ext.trim_start_matches('.').to_ascii_lowercase();
    media_type_for_extension(&ext) != MediaType::Unknown
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in filename pattern must compile")
}

fn table(entries: &[(&str, &'static str)]) -> Vec<(Regex, &'static str)> {
    entries
        .iter()
        .map(|(pattern, value)| (compile(pattern), *value))
        .collect()
}

/// Episode markers, most specific first. Group 1 is the season, group 2 the episode.
pub static EPISODE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // S01E02, s1e2, S01 E02
        compile(r"(?i)\bS(\d{1,2})\s?E(\d{1,3})"),
        // 1x02, only after a separator so resolutions like 1920x1080 never match
        compile(r"(?i)(?:^|[\s\-])(\d{1,2})x(\d{2,3})\b"),
        // Season 1 Episode 2
        compile(r"(?i)\bSeason\s*(\d{1,2})\s*[-,]?\s*Episode\s*(\d{1,3})\b"),
        // [1x02]
        compile(r"(?i)\[(\d{1,2})x(\d{2,3})\]"),
    ]
});

/// Four digit release year between 1900 and 2099.
pub static YEAR_PATTERN: Lazy<Regex> = Lazy::new(|| compile(r"\b((?:19|20)\d{2})\b"));

/// Any quality, source or codec marker. Used to find where a title ends.
pub static RELEASE_MARKER: Lazy<Regex> = Lazy::new(|| {
    compile(
        r"(?i)\b(?:2160p|1080p|1080i|720p|576p|480p|4k|uhd|blu-?ray|bdrip|brrip|web-?dl|web-?rip|hdtv|dvdrip|dvd|remux|x26[45]|h[.\s]?26[45]|hevc|xvid|av1|proper|repack)\b",
    )
});

pub static QUALITY_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    table(&[
        (r"(?i)\b(?:2160p|4k|uhd)\b", "2160p"),
        (r"(?i)\b1080[pi]\b", "1080p"),
        (r"(?i)\b720p\b", "720p"),
        (r"(?i)\b576p\b", "576p"),
        (r"(?i)\b480p\b", "480p"),
    ])
});

pub static SOURCE_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    table(&[
        (r"(?i)\b(?:blu-?ray|bdrip|brrip)\b", "BluRay"),
        (r"(?i)\bweb-?dl\b", "WEB-DL"),
        (r"(?i)\bweb-?rip\b", "WEBRip"),
        (r"(?i)\bhdtv\b", "HDTV"),
        (r"(?i)\bdvd(?:rip)?\b", "DVD"),
        (r"(?i)\bremux\b", "REMUX"),
    ])
});

pub static CODEC_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    table(&[
        (r"(?i)\b(?:x265|h\.?265|hevc)\b", "x265"),
        (r"(?i)\b(?:x264|h\.?264|avc)\b", "x264"),
        (r"(?i)\bxvid\b", "XviD"),
        (r"(?i)\bav1\b", "AV1"),
    ])
});

/// Leading track number in music titles: "01 - Title", "7. Title".
pub static TRACK_PREFIX: Lazy<Regex> =
    Lazy::new(|| compile(r"^(\d{1,3})(?:\s*[.\-]\s*|\s+)(.*)$"));

/// Trailing "(Author Name)" on book titles.
pub static TRAILING_PARENTHETICAL: Lazy<Regex> =
    Lazy::new(|| compile(r"^(.*?)\s*\(([^()]*[A-Za-z][^()]*)\)\s*$"));

/// Bracketed release tags: [group], (2010), etc.
pub static BRACKETED: Lazy<Regex> = Lazy::new(|| compile(r"\[[^\]]*\]|\([^)]*\)"));

/// Returns the value of the first pattern that matches.
pub fn first_match(patterns: &[(Regex, &'static str)], text: &str) -> Option<String> {
    patterns
        .iter()
        .find(|(re, _)| re.is_match(text))
        .map(|(_, value)| value.to_string())
}
