use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/cassette/config.toml` or `~/.config/cassette/config.toml`
///
/// Precedence (highest wins):
/// 1) Command-line flags
/// 2) Environment variables (prefix `CASSETTE__`, `__` as nested separator)
/// 3) Config file (if present)
/// 4) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub library: LibrarySettings,
    pub playback: PlaybackSettings,
    pub controls: ControlsSettings,
    pub ui: UiSettings,
    pub session: SessionSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Directory the manifest entries are resolved against.
    pub media_dir: PathBuf,
    /// Manifest file name, relative to `media_dir`. A JSON array of file names.
    pub manifest: String,
    /// Walk `media_dir` for audio files when the manifest cannot be read.
    pub scan_when_manifest_missing: bool,
    /// File extensions treated as audio by the fallback scan (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Cover reference used when a file carries no embedded picture.
    pub default_cover: String,
    /// How long to wait for a file's duration before inserting it anyway (milliseconds).
    pub duration_timeout_ms: u64,
    /// Upper bound on loads running at the same time.
    pub max_parallel_loads: usize,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            media_dir: PathBuf::from("songs"),
            manifest: "songs.json".to_string(),
            scan_when_manifest_missing: true,
            extensions: vec!["mp3".into(), "flac".into(), "wav".into(), "ogg".into(), "m4a".into()],
            default_cover: "images/default-cover.jpg".to_string(),
            duration_timeout_ms: 5_000,
            max_parallel_loads: 8,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Whether shuffle starts enabled.
    pub shuffle: bool,
    /// How `next` picks a track while shuffling.
    pub shuffle_policy: ShufflePolicySetting,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShufflePolicySetting {
    /// Any track, the current one included.
    #[default]
    #[serde(alias = "random", alias = "allow-repeat")]
    Uniform,
    /// Any track except the one playing now.
    #[serde(alias = "avoid_current", alias = "no-repeat")]
    AvoidCurrent,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Number of seconds to scrub when pressing `H` / `L`.
    pub scrub_seconds: u64,
    /// Window in which repeated activations of the same row count as one (milliseconds).
    pub double_activation_ms: u64,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            scrub_seconds: 5,
            double_activation_ms: 300,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
    /// Text shown for missing title/artist/album values.
    pub unknown_text: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ cassette ~ ".to_string(),
            unknown_text: "Unknown".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Publish now-playing state over MPRIS.
    pub mpris: bool,
    /// Bus name suffix, registered as `org.mpris.MediaPlayer2.<name>`.
    pub bus_name: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            mpris: true,
            bus_name: "cassette".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
    /// Directory for `cassette.log`. Defaults to `$XDG_STATE_HOME/cassette`.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}
