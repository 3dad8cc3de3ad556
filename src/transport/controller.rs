use std::time::Duration;

use rand::RngExt;
use tracing::{debug, info, warn};

use crate::audio::MediaBackend;
use crate::error::{PlaybackError, TransportError};
use crate::library::{CoverArt, Library};

use super::session::{MediaSession, NowPlaying, artwork_variants};
use super::state::{PlaybackState, ShufflePolicy};

/// Owns the playback selection and is the only thing that commands the media
/// backend. Every transition ends by publishing a fresh `NowPlaying`.
pub struct Transport {
    media: Box<dyn MediaBackend>,
    session: Box<dyn MediaSession>,
    current: Option<usize>,
    playback: PlaybackState,
    shuffle: bool,
    shuffle_policy: ShufflePolicy,
    unknown_text: String,
    placeholder_art: String,
}

impl Transport {
    pub fn new(media: Box<dyn MediaBackend>, session: Box<dyn MediaSession>) -> Self {
        Self {
            media,
            session,
            current: None,
            playback: PlaybackState::Stopped,
            shuffle: false,
            shuffle_policy: ShufflePolicy::default(),
            unknown_text: "Unknown".to_string(),
            placeholder_art: "images/default-cover.jpg".to_string(),
        }
    }

    pub fn with_shuffle(mut self, shuffle: bool, policy: ShufflePolicy) -> Self {
        self.shuffle = shuffle;
        self.shuffle_policy = policy;
        self
    }

    /// Text and art used when there is no current track.
    pub fn with_placeholders(
        mut self,
        unknown_text: impl Into<String>,
        placeholder_art: impl Into<String>,
    ) -> Self {
        self.unknown_text = unknown_text.into();
        self.placeholder_art = placeholder_art.into();
        self
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn playback(&self) -> PlaybackState {
        self.playback
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_playing()
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn shuffle_policy(&self) -> ShufflePolicy {
        self.shuffle_policy
    }

    pub fn position(&self) -> Duration {
        self.media.position()
    }

    /// Total length of the current track: the decoder's figure, else the
    /// one recorded when the track was loaded.
    pub fn duration(&self, lib: &Library) -> Option<Duration> {
        self.media.duration().or_else(|| {
            self.current
                .and_then(|i| lib.get(i))
                .and_then(|t| t.duration)
        })
    }

    /// Played fraction of the current track in `[0, 1]`.
    pub fn progress(&self, lib: &Library) -> Option<f64> {
        let total = self.duration(lib)?;
        if total.is_zero() {
            return None;
        }
        Some((self.position().as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0))
    }

    fn set_state(&mut self, playback: PlaybackState) {
        if self.playback != playback {
            debug!(from = ?self.playback, to = ?playback, "playback state");
        }
        self.playback = playback;
    }

    /// Load and play `index`.
    pub fn select_and_play(&mut self, lib: &Library, index: usize) -> Result<(), TransportError> {
        if lib.is_empty() {
            return Err(TransportError::EmptyLibrary);
        }
        let Some(track) = lib.get(index) else {
            return Err(TransportError::InvalidIndex {
                index,
                len: lib.len(),
            });
        };

        self.current = Some(index);
        let result = self.media.load_and_play(&track.path);
        match result {
            Ok(()) => {
                info!(index, title = %track.title, artist = %track.artist, "now playing");
                self.set_state(PlaybackState::Playing);
                self.publish(lib);
                Ok(())
            }
            Err(e) => {
                warn!(index, path = %track.path.display(), error = %e, "playback rejected");
                self.set_state(PlaybackState::Paused);
                self.publish(lib);
                Err(e.into())
            }
        }
    }

    /// Pause if `index` is the track playing now, otherwise play `index`.
    pub fn toggle_play_pause(&mut self, lib: &Library, index: usize) -> Result<(), TransportError> {
        if self.current == Some(index) && self.is_playing() {
            self.pause(lib);
            Ok(())
        } else {
            self.select_and_play(lib, index)
        }
    }

    /// Resume the current track, or start the first one when nothing was
    /// selected yet.
    pub fn play(&mut self, lib: &Library) -> Result<(), TransportError> {
        if self.is_playing() {
            return Ok(());
        }
        let Some(index) = self.current.filter(|&i| i < lib.len()) else {
            return self.select_and_play(lib, 0);
        };

        match self.media.resume() {
            Ok(()) => {
                self.set_state(PlaybackState::Playing);
                self.publish(lib);
                Ok(())
            }
            // The track never loaded (an earlier play was rejected): try again from the top.
            Err(PlaybackError::NothingLoaded) => self.select_and_play(lib, index),
            Err(e) => {
                warn!(index, error = %e, "resume rejected");
                self.publish(lib);
                Err(e.into())
            }
        }
    }

    pub fn pause(&mut self, lib: &Library) {
        if !self.is_playing() {
            return;
        }
        self.media.pause();
        self.set_state(PlaybackState::Paused);
        self.publish(lib);
    }

    /// Play/pause button: flips between playing and not playing.
    pub fn toggle_play(&mut self, lib: &Library) -> Result<(), TransportError> {
        if self.is_playing() {
            self.pause(lib);
            Ok(())
        } else {
            self.play(lib)
        }
    }

    /// Pause and rewind to the start of the current track.
    pub fn stop(&mut self, lib: &Library) {
        self.media.stop();
        self.set_state(PlaybackState::Stopped);
        self.publish(lib);
    }

    /// Returns the new shuffle flag.
    pub fn toggle_shuffle(&mut self) -> bool {
        self.shuffle = !self.shuffle;
        info!(shuffle = self.shuffle, "shuffle toggled");
        self.shuffle
    }

    fn pick_shuffled(&self, len: usize) -> usize {
        let mut rng = rand::rng();
        match (self.shuffle_policy, self.current) {
            (ShufflePolicy::AvoidCurrent, Some(cur)) if len > 1 && cur < len => {
                // Draw from len-1 slots and skip over the current one.
                let pick = rng.random_range(0..len - 1);
                if pick >= cur { pick + 1 } else { pick }
            }
            _ => rng.random_range(0..len),
        }
    }

    /// Index `next` would play, or `None` for an empty library.
    pub fn next_index(&self, lib: &Library) -> Option<usize> {
        let len = lib.len();
        if len == 0 {
            return None;
        }
        if self.shuffle {
            return Some(self.pick_shuffled(len));
        }
        Some(match self.current {
            Some(cur) => (cur + 1) % len,
            None => 0,
        })
    }

    /// Index `previous` would play. Shuffle does not apply.
    pub fn previous_index(&self, lib: &Library) -> Option<usize> {
        let len = lib.len();
        if len == 0 {
            return None;
        }
        Some(match self.current {
            Some(cur) => (cur % len + len - 1) % len,
            None => len - 1,
        })
    }

    pub fn next(&mut self, lib: &Library) -> Result<(), TransportError> {
        let index = self.next_index(lib).ok_or(TransportError::EmptyLibrary)?;
        self.select_and_play(lib, index)
    }

    pub fn previous(&mut self, lib: &Library) -> Result<(), TransportError> {
        let index = self.previous_index(lib).ok_or(TransportError::EmptyLibrary)?;
        self.select_and_play(lib, index)
    }

    /// Jump to `fraction` of the current track's length.
    pub fn seek(&mut self, lib: &Library, fraction: f64) -> Result<(), TransportError> {
        let total = self.duration(lib).ok_or(TransportError::UnknownDuration)?;
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.seek_to(lib, total.mul_f64(fraction))
    }

    /// Jump to an absolute position, clamped to the track length when known.
    pub fn seek_to(&mut self, lib: &Library, position: Duration) -> Result<(), TransportError> {
        let position = match self.duration(lib) {
            Some(total) => position.min(total),
            None => position,
        };
        self.media.seek(position)?;
        self.publish(lib);
        self.session.seeked(self.media.position());
        Ok(())
    }

    /// Move by `delta_secs` (negative rewinds), clamped at zero.
    pub fn seek_by(&mut self, lib: &Library, delta_secs: i64) -> Result<(), TransportError> {
        let now = self.position();
        let step = Duration::from_secs(delta_secs.unsigned_abs());
        let target = if delta_secs < 0 {
            now.saturating_sub(step)
        } else {
            now + step
        };
        self.seek_to(lib, target)
    }

    /// Advance when the backend reports a natural end of track. Returns
    /// `None` when nothing ended.
    pub fn poll_finished(&mut self, lib: &Library) -> Option<Result<(), TransportError>> {
        if !self.media.take_finished() {
            return None;
        }
        debug!(current = ?self.current, "track ended");
        // The backend paused itself; mirror that before advancing.
        self.set_state(PlaybackState::Paused);
        Some(self.next(lib))
    }

    /// `"Now Playing: T - A"` and friends, with placeholders when no track is current.
    pub fn now_playing_text(&self, lib: &Library) -> String {
        let (title, artist) = match self.current.and_then(|i| lib.get(i)) {
            Some(t) => (t.title.as_str(), t.artist.as_str()),
            None => (self.unknown_text.as_str(), self.unknown_text.as_str()),
        };
        let label = match self.playback {
            PlaybackState::Playing => "Now Playing",
            PlaybackState::Paused => "Paused",
            PlaybackState::Stopped => "Stopped",
        };
        format!("{label}: {title} - {artist}")
    }

    pub fn play_button_glyph(&self) -> &'static str {
        if self.is_playing() { "⏸" } else { "▶" }
    }

    /// Descriptor of the current state for the media session.
    pub fn now_playing(&self, lib: &Library) -> NowPlaying {
        let track = self.current.and_then(|i| lib.get(i));
        let placeholder = CoverArt::Placeholder(self.placeholder_art.clone());
        let cover = track.map(|t| &t.cover_art).unwrap_or(&placeholder);
        let unknown = || self.unknown_text.clone();

        NowPlaying {
            index: track.and(self.current),
            title: track.map(|t| t.title.clone()).unwrap_or_else(unknown),
            artist: track.map(|t| t.artist.clone()).unwrap_or_else(unknown),
            album: track.map(|t| t.album.clone()).unwrap_or_else(unknown),
            path: track.map(|t| t.path.clone()),
            length: self.duration(lib),
            position: self.position(),
            playback: self.playback,
            artwork: artwork_variants(cover),
        }
    }

    /// Push the current state to the media session. Safe to repeat.
    pub fn publish(&self, lib: &Library) {
        self.session.publish(&self.now_playing(lib));
    }
}
