//! Error types shared by the loader, the audio backend and the transport.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failures while building the library. None of these abort a load as a whole:
/// per-file errors only drop that file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read manifest {path}: {source}")]
    ManifestFetch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("manifest {path} is not a JSON list of file names: {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read {path}: {source}")]
    FileFetch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read tags from {path}: {reason}")]
    TagParse { path: PathBuf, reason: String },

    #[error("load of {path} was cancelled")]
    Cancelled { path: PathBuf },
}

/// Failures reported by a `MediaBackend` or `DurationProbe`.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("no audio output device: {0}")]
    NoDevice(String),

    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("failed to seek to {position:?}: {reason}")]
    Seek { position: Duration, reason: String },

    #[error("nothing is loaded")]
    NothingLoaded,
}

/// Transport operations that could not be carried out. The event loop logs
/// these as warnings; none of them leave the transport in an invalid state.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("track index {index} is out of range for a library of {len}")]
    InvalidIndex { index: usize, len: usize },

    #[error("the library is empty")]
    EmptyLibrary,

    #[error("playback was rejected: {0}")]
    PlaybackRejected(#[from] PlaybackError),

    #[error("the current track has no known duration")]
    UnknownDuration,
}
