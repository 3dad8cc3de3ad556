//! Background loading of manifest entries into `Track`s.
//!
//! A small pool of worker threads pulls paths from a shared queue, reads each
//! file, parses its tags and probes its duration. Only complete tracks are
//! sent back; the event loop owns the `Library` and appends them as they
//! arrive, so completion order decides library order.

use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use crate::audio::DurationProbe;
use crate::error::LoadError;

use super::model::Track;
use super::tags::{TagReader, TrackDefaults};

pub type LoadId = usize;

#[derive(Debug)]
pub enum LoadEvent {
    Loaded { id: LoadId, track: Track },
    Failed { id: LoadId, error: LoadError },
}

/// Shared cancellation flag checked by workers between stages.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Collaborators and limits shared by every load.
#[derive(Clone)]
pub struct LoadContext {
    pub tags: Arc<dyn TagReader>,
    pub probe: Arc<dyn DurationProbe>,
    pub defaults: TrackDefaults,
    pub duration_timeout: Duration,
}

/// Counters shown in the status line while loads are outstanding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadProgress {
    pub total: usize,
    pub loaded: usize,
    pub failed: usize,
}

impl LoadProgress {
    pub fn pending(&self) -> usize {
        self.total.saturating_sub(self.loaded + self.failed)
    }

    pub fn is_finished(&self) -> bool {
        self.pending() == 0
    }
}

/// Outstanding loads keyed by id.
#[derive(Debug, Default)]
pub struct LoadTracker {
    pending: HashMap<LoadId, PathBuf>,
    progress: LoadProgress,
}

impl LoadTracker {
    pub fn new(jobs: &[(LoadId, PathBuf)]) -> Self {
        Self {
            pending: jobs.iter().cloned().collect(),
            progress: LoadProgress {
                total: jobs.len(),
                ..LoadProgress::default()
            },
        }
    }

    /// Record the outcome of `id`. Returns the path of the finished load, or
    /// `None` for ids that were unknown or already finished.
    pub fn finish(&mut self, id: LoadId, ok: bool) -> Option<PathBuf> {
        let path = self.pending.remove(&id)?;
        if ok {
            self.progress.loaded += 1;
        } else {
            self.progress.failed += 1;
        }
        Some(path)
    }

    pub fn progress(&self) -> LoadProgress {
        self.progress
    }
}

/// Handle to a running load. Dropping it does not stop the workers; call
/// `shutdown` for that.
pub struct Loader {
    cancel: CancelToken,
    workers: Vec<JoinHandle<()>>,
}

impl Loader {
    /// Start loading `paths` on at most `max_parallel` threads. Results are
    /// sent on `tx`; the returned tracker knows every id that will report.
    pub fn spawn(
        paths: Vec<PathBuf>,
        ctx: LoadContext,
        max_parallel: usize,
        tx: Sender<LoadEvent>,
    ) -> (Self, LoadTracker) {
        let jobs: Vec<(LoadId, PathBuf)> = paths.into_iter().enumerate().collect();
        let tracker = LoadTracker::new(&jobs);

        let worker_count = max_parallel.max(1).min(jobs.len());
        let queue = Arc::new(Mutex::new(VecDeque::from(jobs)));
        let ctx = Arc::new(ctx);
        let cancel = CancelToken::default();

        let workers = (0..worker_count)
            .map(|_| {
                let queue = queue.clone();
                let ctx = ctx.clone();
                let cancel = cancel.clone();
                let tx = tx.clone();
                thread::spawn(move || {
                    loop {
                        let job = match queue.lock() {
                            Ok(mut q) => q.pop_front(),
                            Err(_) => None,
                        };
                        let Some((id, path)) = job else {
                            break;
                        };

                        let event = match extract_track(&path, &ctx, &cancel) {
                            Ok(track) => LoadEvent::Loaded { id, track },
                            Err(LoadError::Cancelled { .. }) => break,
                            Err(error) => {
                                warn!(path = %path.display(), %error, "skipping file");
                                LoadEvent::Failed { id, error }
                            }
                        };

                        if tx.send(event).is_err() {
                            // Receiver gone: nobody is interested in further results.
                            break;
                        }
                    }
                })
            })
            .collect();

        (Self { cancel, workers }, tracker)
    }

    /// Stop workers at their next stage boundary and wait up to `timeout`
    /// for them to exit. Loads cancelled this way never report. Returns
    /// `false` when a worker was still busy, e.g. inside a hung probe.
    pub fn shutdown(self, timeout: Duration) -> bool {
        self.cancel.cancel();

        let workers = self.workers;
        let (done_tx, done_rx) = mpsc::channel();
        thread::spawn(move || {
            for w in workers {
                let _ = w.join();
            }
            let _ = done_tx.send(());
        });
        done_rx.recv_timeout(timeout).is_ok()
    }
}

fn check_cancelled(cancel: &CancelToken, path: &Path) -> Result<(), LoadError> {
    if cancel.is_cancelled() {
        return Err(LoadError::Cancelled {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Fetch, parse and probe one file into a complete `Track`.
pub fn extract_track(
    path: &Path,
    ctx: &LoadContext,
    cancel: &CancelToken,
) -> Result<Track, LoadError> {
    check_cancelled(cancel, path)?;
    let bytes = fs::read(path).map_err(|source| LoadError::FileFetch {
        path: path.to_path_buf(),
        source,
    })?;

    check_cancelled(cancel, path)?;
    let tags = ctx
        .tags
        .read_tags(&bytes)
        .map_err(|e| LoadError::TagParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    let mut track = Track::from_tags(path.to_path_buf(), &tags, &ctx.defaults);

    check_cancelled(cancel, path)?;
    let probed = probe_with_timeout(ctx.probe.clone(), path, ctx.duration_timeout);
    track.duration = probed.or(tags.duration_hint);

    check_cancelled(cancel, path)?;
    debug!(path = %path.display(), title = %track.title, "track resolved");
    Ok(track)
}

/// Run the probe on its own thread and give up after `timeout`. A probe that
/// never returns only leaks its thread; the load itself moves on.
pub fn probe_with_timeout(
    probe: Arc<dyn DurationProbe>,
    path: &Path,
    timeout: Duration,
) -> Option<Duration> {
    let (tx, rx) = mpsc::channel();
    let probe_path = path.to_path_buf();
    thread::spawn(move || {
        let _ = tx.send(probe.probe(&probe_path));
    });

    match rx.recv_timeout(timeout) {
        Ok(Ok(duration)) => duration,
        Ok(Err(e)) => {
            warn!(path = %path.display(), error = %e, "duration probe failed");
            None
        }
        Err(RecvTimeoutError::Timeout) => {
            warn!(path = %path.display(), ?timeout, "duration probe timed out");
            None
        }
        Err(RecvTimeoutError::Disconnected) => None,
    }
}
