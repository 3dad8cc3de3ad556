//! Application model: the `App` context shared by the UI and the runtime.
//!
//! `App` owns the library, the transport and the cursor. The event loop is its
//! only mutator; the UI only reads it.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::TransportError;
use crate::library::{LoadEvent, LoadProgress, LoadTracker, Library};
use crate::transport::{ActivationFilter, Transport};

/// The main application model.
pub struct App {
    pub library: Library,
    pub transport: Transport,
    pub selected: usize,

    /// Cursor jumps to the playing track when it changes.
    pub follow_playback: bool,

    activation: ActivationFilter,
    loads: LoadTracker,
    status: Option<String>,
}

impl App {
    pub fn new(transport: Transport, activation: ActivationFilter) -> Self {
        Self {
            library: Library::new(),
            transport,
            selected: 0,
            follow_playback: true,
            activation,
            loads: LoadTracker::default(),
            status: None,
        }
    }

    /// Track the loads that are about to report through `apply_load_event`.
    pub fn set_loads(&mut self, loads: LoadTracker) {
        self.loads = loads;
    }

    pub fn load_progress(&self) -> LoadProgress {
        self.loads.progress()
    }

    /// Fold one loader result into the library. Returns the index of the
    /// appended track.
    pub fn apply_load_event(&mut self, event: LoadEvent) -> Option<usize> {
        match event {
            LoadEvent::Loaded { id, track } => {
                if self.loads.finish(id, true).is_none() {
                    debug!(id, "ignoring load result for unknown id");
                    return None;
                }
                Some(self.library.push(track))
            }
            LoadEvent::Failed { id, error } => {
                if self.loads.finish(id, false).is_some() {
                    self.status = Some(error.to_string());
                }
                None
            }
        }
    }

    pub fn has_tracks(&self) -> bool {
        !self.library.is_empty()
    }

    /// Last error or notice worth showing in the status line.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = Some(msg.into());
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    /// Move the cursor to the next row, wrapping to the first.
    pub fn select_next(&mut self) {
        let len = self.library.len();
        if len == 0 {
            return;
        }
        self.selected = (self.selected + 1) % len;
        self.follow_playback = false;
    }

    /// Move the cursor to the previous row, wrapping to the last.
    pub fn select_prev(&mut self) {
        let len = self.library.len();
        if len == 0 {
            return;
        }
        self.selected = (self.selected.min(len - 1) + len - 1) % len;
        self.follow_playback = false;
    }

    pub fn select_row(&mut self, index: usize) {
        if index < self.library.len() {
            self.selected = index;
        }
    }

    /// A row was clicked or Enter was pressed on it. Repeats inside the
    /// activation window are swallowed.
    pub fn activate(&mut self, index: usize, at: Instant) {
        self.select_row(index);
        if !self.activation.accept(index, at) {
            debug!(index, "coalesced repeat activation");
            return;
        }
        self.follow_playback = true;
        let result = self.transport.toggle_play_pause(&self.library, index);
        self.report(result);
    }

    pub fn activate_selected(&mut self, at: Instant) {
        if self.has_tracks() {
            self.activate(self.selected, at);
        }
    }

    pub fn toggle_play(&mut self) {
        let result = self.transport.toggle_play(&self.library);
        self.report(result);
        self.follow_current();
    }

    pub fn play(&mut self) {
        let result = self.transport.play(&self.library);
        self.report(result);
        self.follow_current();
    }

    pub fn pause(&mut self) {
        self.transport.pause(&self.library);
    }

    pub fn stop(&mut self) {
        self.transport.stop(&self.library);
    }

    pub fn next(&mut self) {
        self.follow_playback = true;
        let result = self.transport.next(&self.library);
        self.report(result);
        self.follow_current();
    }

    pub fn previous(&mut self) {
        self.follow_playback = true;
        let result = self.transport.previous(&self.library);
        self.report(result);
        self.follow_current();
    }

    pub fn toggle_shuffle(&mut self) {
        let on = self.transport.toggle_shuffle();
        self.status = Some(format!("Shuffle {}", if on { "on" } else { "off" }));
    }

    /// Seek by whole seconds relative to the current position.
    pub fn scrub(&mut self, delta_secs: i64) {
        let result = self.transport.seek_by(&self.library, delta_secs);
        self.report(result);
    }

    /// Seek to `fraction` of the current track (progress bar click).
    pub fn seek_fraction(&mut self, fraction: f64) {
        let result = self.transport.seek(&self.library, fraction);
        self.report(result);
    }

    /// Seek relative to the current position by `delta` microseconds.
    pub fn seek_micros(&mut self, delta: i64) {
        let now = self.transport.position();
        let step = Duration::from_micros(delta.unsigned_abs());
        let target = if delta < 0 {
            now.saturating_sub(step)
        } else {
            now + step
        };
        self.seek_to(target);
    }

    pub fn seek_to(&mut self, position: Duration) {
        let result = self.transport.seek_to(&self.library, position);
        self.report(result);
    }

    /// Periodic housekeeping: advance on natural end of track and keep the
    /// cursor on the playing row.
    pub fn tick(&mut self) {
        if let Some(result) = self.transport.poll_finished(&self.library) {
            self.report(result);
        }
        self.follow_current();
    }

    fn follow_current(&mut self) {
        if !self.follow_playback {
            return;
        }
        if let Some(cur) = self.transport.current() {
            self.selected = cur;
        }
    }

    /// Transport errors are never fatal: log them and surface them in the
    /// status line.
    pub fn report(&mut self, result: Result<(), TransportError>) {
        match result {
            Ok(()) => {}
            // Nothing to act on yet.
            Err(TransportError::EmptyLibrary) => {
                debug!("transport command ignored: library is empty");
            }
            Err(e) => {
                warn!(error = %e, "transport command failed");
                self.status = Some(e.to_string());
            }
        }
    }
}
