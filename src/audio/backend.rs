use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tracing::debug;

use crate::error::PlaybackError;

use super::clock::PlayClock;
use super::sink::create_sink_at;
use super::types::MediaBackend;

/// `MediaBackend` playing through the default output device.
pub struct RodioBackend {
    stream: OutputStream,
    sink: Option<Sink>,
    path: Option<PathBuf>,
    duration: Option<Duration>,
    clock: PlayClock,
    paused: bool,
}

impl RodioBackend {
    pub fn open() -> Result<Self, PlaybackError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| PlaybackError::NoDevice(e.to_string()))?;
        // rodio logs to stderr when OutputStream is dropped, which tears the TUI.
        stream.log_on_drop(false);

        Ok(Self {
            stream,
            sink: None,
            path: None,
            duration: None,
            clock: PlayClock::default(),
            paused: true,
        })
    }

    fn unload(&mut self) {
        if let Some(s) = self.sink.take() {
            s.stop();
        }
        self.path = None;
        self.duration = None;
        self.clock = PlayClock::default();
        self.paused = true;
    }

    /// Rebuild the sink for the loaded path at `position`, keeping the
    /// paused/playing state.
    fn rebuild_at(&mut self, position: Duration) -> Result<(), PlaybackError> {
        let Some(path) = self.path.clone() else {
            return Err(PlaybackError::NothingLoaded);
        };
        let (sink, _) = create_sink_at(&self.stream, &path, position)?;
        if let Some(old) = self.sink.replace(sink) {
            old.stop();
        }
        if !self.paused {
            if let Some(s) = self.sink.as_ref() {
                s.play();
            }
        }
        self.clock.reset_to(position, Instant::now());
        Ok(())
    }
}

impl MediaBackend for RodioBackend {
    fn load_and_play(&mut self, path: &Path) -> Result<(), PlaybackError> {
        self.unload();
        let (sink, total) = create_sink_at(&self.stream, path, Duration::ZERO)?;
        sink.play();

        self.sink = Some(sink);
        self.path = Some(path.to_path_buf());
        self.duration = total;
        self.paused = false;
        self.clock.start_at(Instant::now());
        debug!(path = %path.display(), ?total, "sink started");
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(s) = self.sink.as_ref() {
            s.pause();
            self.clock.pause_at(Instant::now());
            self.paused = true;
        }
    }

    fn resume(&mut self) -> Result<(), PlaybackError> {
        let Some(s) = self.sink.as_ref() else {
            return Err(PlaybackError::NothingLoaded);
        };
        s.play();
        self.clock.start_at(Instant::now());
        self.paused = false;
        Ok(())
    }

    fn stop(&mut self) {
        self.pause();
        if self.path.is_some() {
            // A file that decoded once rarely fails now; if it does, drop it
            // so nothing half-loaded stays around.
            if self.rebuild_at(Duration::ZERO).is_err() {
                self.unload();
            }
        }
    }

    fn seek(&mut self, position: Duration) -> Result<(), PlaybackError> {
        let position = match self.duration {
            Some(total) => position.min(total),
            None => position,
        };
        self.rebuild_at(position).map_err(|e| match e {
            PlaybackError::NothingLoaded => e,
            other => PlaybackError::Seek {
                position,
                reason: other.to_string(),
            },
        })
    }


    fn position(&self) -> Duration {
        let elapsed = self.clock.elapsed_at(Instant::now());
        match self.duration {
            Some(total) => elapsed.min(total),
            None => elapsed,
        }
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn take_finished(&mut self) -> bool {
        let ended = !self.paused && self.sink.as_ref().is_some_and(|s| s.empty());
        if ended {
            self.clock.pause_at(Instant::now());
            self.paused = true;
        }
        ended
    }
}

/// Stand-in used when no output device could be opened: every play request
/// is rejected, so the transport never believes it is playing.
#[derive(Debug, Default)]
pub struct NullBackend {
    reason: String,
}

impl NullBackend {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl MediaBackend for NullBackend {
    fn load_and_play(&mut self, _path: &Path) -> Result<(), PlaybackError> {
        Err(PlaybackError::NoDevice(self.reason.clone()))
    }

    fn pause(&mut self) {}

    fn resume(&mut self) -> Result<(), PlaybackError> {
        Err(PlaybackError::NothingLoaded)
    }

    fn stop(&mut self) {}

    fn seek(&mut self, _position: Duration) -> Result<(), PlaybackError> {
        Err(PlaybackError::NothingLoaded)
    }


    fn position(&self) -> Duration {
        Duration::ZERO
    }

    fn duration(&self) -> Option<Duration> {
        None
    }

    fn take_finished(&mut self) -> bool {
        false
    }
}
