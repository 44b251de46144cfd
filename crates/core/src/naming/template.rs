//! Template expansion.

use once_cell::sync::Lazy;
use regex_lite::{Captures, Regex};
use std::collections::BTreeMap;

use crate::parser::ParsedMedia;

/// Longest name segment produced by [`clean_for_filename`], in characters.
pub const MAX_NAME_LENGTH: usize = 200;

static TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{([A-Za-z]+(?:\.[A-Za-z]+)?)(?::(0+))?\}").expect("token pattern must compile")
});
static LEFTOVER_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{[^{}]*\}").expect("leftover pattern must compile"));
static EMPTY_GROUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(\s*\)|\[\s*\]").expect("group pattern must compile"));
static DASH_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-(?:\s*-)+").expect("dash pattern must compile"));

/// Expands `{Token}` and `{Token:00}` placeholders from parsed metadata.
///
/// Substitution happens in a single pass, so values containing braces are
/// never expanded again. Unknown or absent tokens become empty, and the
/// separators they leave behind are tidied up. `extras` supplies or
/// overrides token values by name.
pub fn apply_template(
    template: &str,
    parsed: &ParsedMedia,
    extras: Option<&BTreeMap<String, String>>,
) -> String {
    let expanded = TOKEN.replace_all(template, |caps: &Captures<'_>| {
        let name = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let value = extras
            .and_then(|extras| extras.get(name).cloned())
            .or_else(|| token_value(name, parsed))
            .unwrap_or_default();
        match caps.get(2) {
            Some(zeros) => pad(&value, zeros.as_str().len()),
            None => value,
        }
    });

    tidy(&expanded)
}

fn token_value(name: &str, parsed: &ParsedMedia) -> Option<String> {
    let name_value = |value: &Option<String>| value.as_deref().map(clean_for_filename);
    let clean_value = |value: &Option<String>| value.as_deref().map(clean_name);

    match name {
        "Series.Title" | "Movie.Title" | "Title" => Some(clean_for_filename(&parsed.title)),
        "Series.CleanTitle" | "Movie.CleanTitle" | "Title.CleanTitle" => {
            Some(clean_name(&parsed.title))
        }
        "Season" => parsed.season.map(|n| n.to_string()),
        "Episode" => parsed.episode.map(|n| n.to_string()),
        "Episode.Title" => name_value(&parsed.episode_title),
        "Year" => parsed.year.map(|n| n.to_string()),
        "Quality" => parsed.quality.clone(),
        "Source" => parsed.source.clone(),
        "Codec" => parsed.codec.clone(),
        "Extension" => {
            let ext = parsed.extension.trim_start_matches('.');
            (!ext.is_empty()).then(|| ext.to_string())
        }
        "Artist" => name_value(&parsed.artist),
        "Artist.CleanName" => clean_value(&parsed.artist),
        "Album" => name_value(&parsed.album),
        "Album.CleanName" => clean_value(&parsed.album),
        "Track" => parsed.track.map(|n| n.to_string()),
        "Author" => name_value(&parsed.author),
        "Author.CleanName" => clean_value(&parsed.author),
        _ => None,
    }
}

fn pad(value: &str, width: usize) -> String {
    match value.parse::<u64>() {
        Ok(number) => format!("{:0width$}", number, width = width),
        Err(_) => value.to_string(),
    }
}

fn tidy(expanded: &str) -> String {
    let without_tokens = LEFTOVER_TOKEN.replace_all(expanded, "");
    let without_groups = EMPTY_GROUP.replace_all(&without_tokens, "");
    let single_dashes = DASH_RUN.replace_all(&without_groups, "-");
    collapse_whitespace(&single_dashes)
        .trim_matches(|c: char| c == '-' || c.is_whitespace())
        .to_string()
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Makes a value safe to use as a single path segment.
///
/// Strips characters reserved on common filesystems and control characters,
/// collapses whitespace, drops trailing dots and caps the length.
pub fn clean_for_filename(value: &str) -> String {
    let stripped: String = value
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*'))
        .filter(|c| !c.is_control() || c.is_whitespace())
        .collect();
    let collapsed = collapse_whitespace(&stripped);
    let trimmed = collapsed.trim_end_matches(|c: char| c == '.' || c.is_whitespace());
    let truncated: String = trimmed.chars().take(MAX_NAME_LENGTH).collect();
    truncated.trim_end().to_string()
}

/// Letters, digits and single spaces only.
pub fn clean_name(value: &str) -> String {
    let kept: String = value
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    collapse_whitespace(&kept)
}
