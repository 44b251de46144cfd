//! File header inspection.

use infer::MatcherType;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

use crate::parser::MediaType;

/// Bytes read from the start of a file for type detection.
pub const HEADER_LEN: usize = 8192;

/// Reads up to [`HEADER_LEN`] bytes from the start of the file.
pub async fn read_header(path: &Path) -> std::io::Result<Vec<u8>> {
    let mut file = File::open(path).await?;
    let mut buffer = vec![0u8; HEADER_LEN];
    let mut filled = 0;
    while filled < buffer.len() {
        let n = file.read(&mut buffer[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    buffer.truncate(filled);
    Ok(buffer)
}

/// Native executables, libraries and shebang scripts.
pub fn is_executable(header: &[u8]) -> bool {
    infer::is_app(header) || header.starts_with(b"#!")
}

/// MIME type recognized from the header, if any.
pub fn detect_mime(header: &[u8]) -> Option<String> {
    infer::get(header).map(|kind| kind.mime_type().to_string())
}

/// Whether the detected content agrees with what the extension claims.
///
/// Unrecognized headers are given the benefit of the doubt.
pub fn header_matches(media_type: MediaType, header: &[u8]) -> bool {
    let Some(kind) = infer::get(header) else {
        return true;
    };
    let matcher = kind.matcher_type();
    match media_type {
        MediaType::Movie | MediaType::Series => {
            matches!(matcher, MatcherType::Video | MatcherType::Audio)
        }
        MediaType::Music => matches!(matcher, MatcherType::Audio | MatcherType::Video),
        MediaType::Book => matches!(
            matcher,
            MatcherType::Book | MatcherType::Doc | MatcherType::Archive | MatcherType::Text
        ),
        MediaType::Unknown => true,
    }
}
