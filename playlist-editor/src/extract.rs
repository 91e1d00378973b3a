//! Turning pasted text into playlist and video IDs.
//!
//! Users paste whatever their browser gives them: a bare ID, a full
//! `https://www.youtube.com/watch?v=...&list=...` link, or a scheme-less
//! `youtube.com/playlist?list=...`, often with stray whitespace around it.
//! Extraction never fails. Anything that doesn't look like a URL is taken to
//! be the ID itself.

/// The query parameter an ID is read from when the input is a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// `list=<playlistId>`
    Playlist,
    /// `v=<videoId>`
    Video,
}

impl Marker {
    fn as_str(self) -> &'static str {
        match self {
            Marker::Playlist => "list=",
            Marker::Video => "v=",
        }
    }
}

/// Extracts an ID from free-form input.
///
/// Leading and trailing whitespace is dropped. If the remainder contains the
/// marker for `kind`, the ID runs from just after the marker up to the next
/// `&` (or the end of the input). Otherwise the trimmed input is the ID.
///
/// Returns `None` when nothing is left, which callers treat as "do nothing".
pub fn extract_id(input: &str, kind: Marker) -> Option<String> {
    let trimmed = input.trim();
    let marker = kind.as_str();

    let id = match trimmed.find(marker) {
        Some(at) => {
            let rest = &trimmed[at + marker.len()..];
            rest.split('&').next().unwrap_or_default()
        }
        None => trimmed,
    };

    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

/// Extracts a playlist ID, honouring `list=` URLs.
pub fn playlist_id(input: &str) -> Option<String> {
    extract_id(input, Marker::Playlist)
}

/// Extracts a video ID, honouring `v=` URLs.
pub fn video_id(input: &str) -> Option<String> {
    extract_id(input, Marker::Video)
}
