//! File logging. The TUI owns the terminal, so nothing is written to stderr
//! once it is up.

use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;

pub const LOG_FILE: &str = "cassette.log";

/// Directory the log file goes in: the configured one, else
/// `$XDG_STATE_HOME/cassette`, else `~/.local/state/cassette`, else `./logs`.
pub fn log_directory(settings: &LoggingSettings) -> PathBuf {
    if let Some(dir) = &settings.directory {
        return dir.clone();
    }
    let state_home = env::var_os("XDG_STATE_HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|h| PathBuf::from(h).join(".local").join("state")));
    match state_home {
        Some(dir) => dir.join("cassette"),
        None => PathBuf::from("logs"),
    }
}

/// Install the global subscriber. Keep the returned guard alive until exit or
/// buffered lines are lost.
pub fn init_logging(settings: &LoggingSettings) -> Result<WorkerGuard> {
    let log_dir = log_directory(settings);
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::never(&log_dir, LOG_FILE);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.level.as_str()));

    let subscriber = tracing_subscriber::fmt()
        .with_writer(file_writer)
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_env_filter(filter)
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("installing log subscriber")?;
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_directory_wins() {
        let settings = LoggingSettings {
            level: "info".into(),
            directory: Some(PathBuf::from("/var/log/cassette")),
        };
        assert_eq!(log_directory(&settings), PathBuf::from("/var/log/cassette"));
    }

    #[test]
    fn default_directory_is_app_specific() {
        let settings = LoggingSettings::default();
        let dir = log_directory(&settings);
        assert!(dir.ends_with("cassette") || dir == PathBuf::from("logs"));
    }
}
