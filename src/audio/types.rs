//! The seams between the player and the audio stack.

use std::path::Path;
use std::time::Duration;

use crate::error::PlaybackError;

/// Decodes and plays one track at a time. Only the transport drives it.
pub trait MediaBackend {
    /// Replace whatever is loaded with `path` and start playing it from the
    /// beginning. On error nothing is loaded.
    fn load_and_play(&mut self, path: &Path) -> Result<(), PlaybackError>;
    fn pause(&mut self);
    fn resume(&mut self) -> Result<(), PlaybackError>;
    /// Pause and rewind to the start, keeping the track loaded.
    fn stop(&mut self);
    fn seek(&mut self, position: Duration) -> Result<(), PlaybackError>;
    fn position(&self) -> Duration;
    /// Total length of the loaded track, when the decoder knows it.
    fn duration(&self) -> Option<Duration>;
    /// True once per natural end of the loaded track.
    fn take_finished(&mut self) -> bool;
}

/// Reports a file's total length, the way a media element does once its
/// metadata has loaded.
pub trait DurationProbe: Send + Sync {
    fn probe(&self, path: &Path) -> Result<Option<Duration>, PlaybackError>;
}
