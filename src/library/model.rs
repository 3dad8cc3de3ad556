use std::path::PathBuf;
use std::time::Duration;

/// Artwork attached to a track: either the configured placeholder reference or
/// the embedded picture re-encoded as a `data:` URI.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CoverArt {
    Placeholder(String),
    Inline(String),
}

impl CoverArt {
    /// The reference a renderer or media session should load.
    pub fn src(&self) -> &str {
        match self {
            CoverArt::Placeholder(s) | CoverArt::Inline(s) => s,
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, CoverArt::Inline(_))
    }

    /// MIME type of the image, read from the data URI or guessed from the
    /// placeholder's extension.
    pub fn mime_type(&self) -> &str {
        match self {
            CoverArt::Inline(uri) => uri
                .strip_prefix("data:")
                .and_then(|rest| rest.split(';').next())
                .filter(|m| !m.is_empty())
                .unwrap_or("image/jpeg"),
            CoverArt::Placeholder(src) => {
                let lower = src.to_ascii_lowercase();
                if lower.ends_with(".png") {
                    "image/png"
                } else if lower.ends_with(".webp") {
                    "image/webp"
                } else {
                    "image/jpeg"
                }
            }
        }
    }
}

/// One resolved audio file.
#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    pub path: PathBuf,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub cover_art: CoverArt,
    pub duration: Option<Duration>,
}

/// Tracks in the order their loads completed. Append-only: indices handed
/// out by the library stay valid for its lifetime.
#[derive(Debug, Default)]
pub struct Library {
    tracks: Vec<Track>,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fully built track and return its index.
    pub fn push(&mut self, track: Track) -> usize {
        self.tracks.push(track);
        self.tracks.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }
}

impl From<Vec<Track>> for Library {
    fn from(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }
}
