//! The OS "now playing" surface as seen by the transport.

use std::path::PathBuf;
use std::time::Duration;

use crate::library::CoverArt;

use super::state::PlaybackState;

/// Square sizes the artwork is advertised at.
pub const ARTWORK_SIZES: [u32; 6] = [96, 128, 192, 256, 384, 512];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artwork {
    pub src: String,
    /// `"<n>x<n>"`.
    pub sizes: String,
    pub mime: String,
}

/// One artwork entry per advertised size, all pointing at the same image.
pub fn artwork_variants(cover: &CoverArt) -> Vec<Artwork> {
    ARTWORK_SIZES
        .iter()
        .map(|n| Artwork {
            src: cover.src().to_string(),
            sizes: format!("{n}x{n}"),
            mime: cover.mime_type().to_string(),
        })
        .collect()
}

/// Everything a media session needs to describe the current track.
#[derive(Clone, Debug, PartialEq)]
pub struct NowPlaying {
    /// Library index, `None` when nothing has been selected yet.
    pub index: Option<usize>,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub path: Option<PathBuf>,
    pub length: Option<Duration>,
    pub position: Duration,
    pub playback: PlaybackState,
    pub artwork: Vec<Artwork>,
}

/// Receives the descriptor after every transport transition. Publishing the
/// same descriptor twice must be harmless.
pub trait MediaSession {
    fn publish(&self, now: &NowPlaying);

    /// Called after `publish` when the position jumped rather than advanced.
    fn seeked(&self, _position: Duration) {}
}

/// Used when no OS integration is available.
#[derive(Debug, Default)]
pub struct NullSession;

impl MediaSession for NullSession {
    fn publish(&self, _now: &NowPlaying) {}
}
