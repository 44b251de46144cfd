//! Filename parsing.

use tracing::debug;

use super::patterns::{
    first_match, media_type_for_extension, BRACKETED, CODEC_PATTERNS, EPISODE_PATTERNS,
    QUALITY_PATTERNS, RELEASE_MARKER, SOURCE_PATTERNS, TRACK_PREFIX, TRAILING_PARENTHETICAL,
    YEAR_PATTERN,
};
use super::types::{MediaType, ParsedMedia};

/// Parses a filename into structured media metadata.
///
/// Only the final path component is considered. The function is total: any
/// input produces a result, worst case an `Unknown` item with an empty title.
pub fn parse(filename: &str) -> ParsedMedia {
    let name = final_component(filename);
    let (stem, extension) = split_extension(name);
    let ext = extension.trim_start_matches('.').to_ascii_lowercase();

    let mut parsed = match media_type_for_extension(&ext) {
        MediaType::Music => parse_music(stem),
        MediaType::Book => parse_book(stem),
        MediaType::Movie | MediaType::Series => parse_video(stem),
        MediaType::Unknown => ParsedMedia::new(MediaType::Unknown, clean_title(stem), "", ""),
    };
    parsed.extension = extension.to_string();
    parsed.original_filename = name.to_string();

    if matches!(parsed.media_type, MediaType::Movie | MediaType::Series) {
        let haystack = name.replace('_', " ");
        parsed.quality = first_match(&QUALITY_PATTERNS, &haystack);
        parsed.source = first_match(&SOURCE_PATTERNS, &haystack);
        parsed.codec = first_match(&CODEC_PATTERNS, &haystack);
    }

    debug!(
        filename = %name,
        media_type = %parsed.media_type,
        title = %parsed.title,
        "Parsed filename"
    );

    parsed
}

/// Normalizes a raw title fragment.
///
/// Dots and underscores become spaces, bracketed tags are dropped, whitespace
/// is collapsed and dangling dashes are trimmed.
pub fn clean_title(raw: &str) -> String {
    let spaced = raw.replace(['.', '_'], " ");
    let without_tags = BRACKETED.replace_all(&spaced, " ");
    let without_brackets = without_tags.replace(['[', ']', '(', ')'], " ");
    let collapsed = without_brackets
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    collapsed
        .trim_matches(|c: char| c == '-' || c.is_whitespace())
        .to_string()
}

fn final_component(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Splits "name.ext" into ("name", ".ext").
///
/// An extension must be a short alphanumeric run containing a letter, so
/// "Movie.2010" keeps its year and ".hidden" is not all extension.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => {
            let ext = &name[idx + 1..];
            let looks_like_ext = !ext.is_empty()
                && ext.len() <= 5
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
                && ext.chars().any(|c| c.is_ascii_alphabetic());
            if looks_like_ext {
                (&name[..idx], &name[idx..])
            } else {
                (name, "")
            }
        }
        _ => (name, ""),
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn parse_video(stem: &str) -> ParsedMedia {
    let normalized = stem.replace(['.', '_'], " ");

    for pattern in EPISODE_PATTERNS.iter() {
        let Some(caps) = pattern.captures(&normalized) else {
            continue;
        };
        let (Some(whole), Some(season), Some(episode)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            continue;
        };

        let mut parsed = ParsedMedia::new(
            MediaType::Series,
            clean_title(&normalized[..whole.start()]),
            "",
            "",
        );
        parsed.season = season.as_str().parse().ok();
        parsed.episode = episode.as_str().parse().ok();

        let remainder = &normalized[whole.end()..];
        let episode_title = match RELEASE_MARKER.find(remainder) {
            Some(marker) => &remainder[..marker.start()],
            None => remainder,
        };
        parsed.episode_title = non_empty(clean_title(episode_title));
        return parsed;
    }

    for year_match in YEAR_PATTERN.find_iter(&normalized) {
        let title = clean_title(&normalized[..year_match.start()]);
        if title.is_empty() {
            continue;
        }
        let mut parsed = ParsedMedia::new(MediaType::Movie, title, "", "");
        parsed.year = year_match.as_str().parse().ok();
        return parsed;
    }

    let title = RELEASE_MARKER
        .find(&normalized)
        .map(|marker| clean_title(&normalized[..marker.start()]))
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| clean_title(&normalized));

    ParsedMedia::new(MediaType::Movie, title, "", "")
}

fn parse_music(stem: &str) -> ParsedMedia {
    let parts: Vec<&str> = stem
        .split(" - ")
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();

    let mut parsed = ParsedMedia::new(MediaType::Music, "", "", "");

    match parts.as_slice() {
        [artist, album, rest @ ..] if !rest.is_empty() => {
            parsed.artist = non_empty(clean_title(artist));
            parsed.album = non_empty(clean_title(album));
            let (track, title) = split_track(&rest.join(" - "));
            parsed.track = track;
            parsed.title = clean_title(&title);
        }
        [first, second] => {
            if let Ok(track) = first.parse::<u32>() {
                parsed.track = Some(track);
            } else {
                parsed.artist = non_empty(clean_title(first));
            }
            parsed.title = clean_title(second);
        }
        _ => {
            parsed.title = clean_title(stem);
        }
    }

    parsed
}

fn split_track(text: &str) -> (Option<u32>, String) {
    match TRACK_PREFIX.captures(text) {
        Some(caps) => {
            let track = caps.get(1).and_then(|m| m.as_str().parse().ok());
            let title = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
            (track, title.to_string())
        }
        None => (None, text.to_string()),
    }
}

fn parse_book(stem: &str) -> ParsedMedia {
    let mut parsed = ParsedMedia::new(MediaType::Book, "", "", "");

    if let Some((author, title)) = stem.split_once(" - ") {
        let author = clean_title(author);
        let title = clean_title(title);
        if !author.is_empty() && !title.is_empty() {
            parsed.author = Some(author);
            parsed.title = title;
            return parsed;
        }
    }

    if let Some(caps) = TRAILING_PARENTHETICAL.captures(stem) {
        let title = caps.get(1).map(|m| clean_title(m.as_str())).unwrap_or_default();
        let author = caps.get(2).map(|m| clean_title(m.as_str())).unwrap_or_default();
        if !title.is_empty() && !author.is_empty() {
            parsed.author = Some(author);
            parsed.title = title;
            return parsed;
        }
    }

    parsed.title = clean_title(stem);
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_movie() {
        let parsed = parse("Inception.2010.1080p.BluRay.x264-GROUP.mkv");
        assert_eq!(parsed.media_type, MediaType::Movie);
        assert_eq!(parsed.title, "Inception");
        assert_eq!(parsed.year, Some(2010));
        assert_eq!(parsed.quality.as_deref(), Some("1080p"));
        assert_eq!(parsed.source.as_deref(), Some("BluRay"));
        assert_eq!(parsed.codec.as_deref(), Some("x264"));
        assert_eq!(parsed.extension, ".mkv");
        assert_eq!(parsed.season, None);
        assert_eq!(parsed.artist, None);
    }

    #[test]
    fn test_parse_series() {
        let parsed = parse("Breaking.Bad.S01E01.Pilot.720p.BluRay.x264-DEMAND.mkv");
        assert_eq!(parsed.media_type, MediaType::Series);
        assert_eq!(parsed.title, "Breaking Bad");
        assert_eq!(parsed.season, Some(1));
        assert_eq!(parsed.episode, Some(1));
        assert_eq!(parsed.episode_title.as_deref(), Some("Pilot"));
        assert_eq!(parsed.quality.as_deref(), Some("720p"));
        assert_eq!(parsed.source.as_deref(), Some("BluRay"));
        assert_eq!(parsed.codec.as_deref(), Some("x264"));
        assert_eq!(parsed.year, None);
    }

    #[test]
    fn test_parse_series_alternate_markers() {
        let parsed = parse("The Office 3x07 Branch Wars.avi");
        assert_eq!(parsed.media_type, MediaType::Series);
        assert_eq!(parsed.title, "The Office");
        assert_eq!((parsed.season, parsed.episode), (Some(3), Some(7)));
        assert_eq!(parsed.episode_title.as_deref(), Some("Branch Wars"));

        let parsed = parse("Lost Season 2 Episode 5.mp4");
        assert_eq!(parsed.title, "Lost");
        assert_eq!((parsed.season, parsed.episode), (Some(2), Some(5)));
        assert_eq!(parsed.episode_title, None);

        let parsed = parse("Fringe[1x02]The Same Old Story.mkv");
        assert_eq!(parsed.title, "Fringe");
        assert_eq!((parsed.season, parsed.episode), (Some(1), Some(2)));
    }

    #[test]
    fn test_parse_series_triple_digit_episode() {
        let parsed = parse("One.Piece.S01E105.720p.mkv");
        assert_eq!(parsed.episode, Some(105));
        assert_eq!(parsed.episode_title, None);
    }

    #[test]
    fn test_parse_movie_title_starting_with_year() {
        let parsed = parse("2001.A.Space.Odyssey.1968.2160p.UHD.mkv");
        assert_eq!(parsed.title, "2001 A Space Odyssey");
        assert_eq!(parsed.year, Some(1968));
        assert_eq!(parsed.quality.as_deref(), Some("2160p"));
    }

    #[test]
    fn test_parse_movie_without_year() {
        let parsed = parse("Some_Home_Video_720p_WEBRip.mp4");
        assert_eq!(parsed.media_type, MediaType::Movie);
        assert_eq!(parsed.title, "Some Home Video");
        assert_eq!(parsed.year, None);
        assert_eq!(parsed.source.as_deref(), Some("WEBRip"));
    }

    #[test]
    fn test_parse_music() {
        let parsed = parse("Pink Floyd - The Wall - 03 - Another Brick in the Wall.flac");
        assert_eq!(parsed.media_type, MediaType::Music);
        assert_eq!(parsed.artist.as_deref(), Some("Pink Floyd"));
        assert_eq!(parsed.album.as_deref(), Some("The Wall"));
        assert_eq!(parsed.track, Some(3));
        assert_eq!(parsed.title, "Another Brick in the Wall");
        assert_eq!(parsed.quality, None);

        let parsed = parse("07 - Money.mp3");
        assert_eq!(parsed.track, Some(7));
        assert_eq!(parsed.artist, None);
        assert_eq!(parsed.title, "Money");

        let parsed = parse("Radiohead - Creep.mp3");
        assert_eq!(parsed.artist.as_deref(), Some("Radiohead"));
        assert_eq!(parsed.title, "Creep");

        let parsed = parse("untitled.ogg");
        assert_eq!(parsed.title, "untitled");
        assert_eq!(parsed.artist, None);
    }

    #[test]
    fn test_parse_book() {
        let parsed = parse("Frank Herbert - Dune.epub");
        assert_eq!(parsed.media_type, MediaType::Book);
        assert_eq!(parsed.author.as_deref(), Some("Frank Herbert"));
        assert_eq!(parsed.title, "Dune");

        let parsed = parse("Neuromancer (William Gibson).pdf");
        assert_eq!(parsed.author.as_deref(), Some("William Gibson"));
        assert_eq!(parsed.title, "Neuromancer");

        let parsed = parse("Snow_Crash.mobi");
        assert_eq!(parsed.author, None);
        assert_eq!(parsed.title, "Snow Crash");
    }

    #[test]
    fn test_parse_unknown() {
        let parsed = parse("notes.2010.1080p.txt");
        assert_eq!(parsed.media_type, MediaType::Unknown);
        assert_eq!(parsed.title, "notes 2010 1080p");
        assert_eq!(parsed.quality, None);
        assert_eq!(parsed.year, None);
        assert_eq!(parsed.extension, ".txt");
    }

    #[test]
    fn test_parse_ignores_directories() {
        let parsed = parse("/downloads/Inception (2010)/Inception (2010) [1080p].mkv");
        assert_eq!(parsed.original_filename, "Inception (2010) [1080p].mkv");
        assert_eq!(parsed.title, "Inception");
        assert_eq!(parsed.year, Some(2010));
    }

    #[test]
    fn test_parse_degenerate_input() {
        for input in ["", ".", ".mkv", "...", "-", "[]()", "S01E01.mkv"] {
            let parsed = parse(input);
            assert_eq!(parsed, parse(input));
        }
        let parsed = parse("");
        assert_eq!(parsed.media_type, MediaType::Unknown);
        assert_eq!(parsed.title, "");
    }

    #[test]
    fn test_extension_preserved_verbatim() {
        let parsed = parse("Movie.2012.MKV");
        assert_eq!(parsed.extension, ".MKV");
        assert_eq!(parsed.media_type, MediaType::Movie);
    }

    #[test]
    fn test_clean_title() {
        assert_eq!(clean_title("The.Matrix.[Remastered]"), "The Matrix");
        assert_eq!(clean_title("  Show  Name - "), "Show Name");
        assert_eq!(clean_title("Film (Director's Cut) extra"), "Film extra");
        assert_eq!(clean_title("Broken ] bracket ("), "Broken bracket");
    }
}
