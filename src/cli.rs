use std::path::PathBuf;

use clap::Parser;

use crate::config::Settings;

#[derive(Parser, Debug, Default)]
#[command(name = "cassette")]
#[command(version, about = "A terminal music player driven by a JSON manifest")]
pub struct Args {
    /// Directory holding the manifest and the audio files
    pub media_dir: Option<PathBuf>,

    /// Manifest file name, relative to the media directory
    #[arg(long)]
    pub manifest: Option<String>,

    /// Start with shuffle enabled
    #[arg(long)]
    pub shuffle: bool,

    /// Log filter, e.g. `debug` or `cassette=trace` (RUST_LOG still wins)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Do not register on the session bus
    #[arg(long)]
    pub no_mpris: bool,
}

impl Args {
    /// Command-line flags override whatever the config file and environment set.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(dir) = &self.media_dir {
            settings.library.media_dir = dir.clone();
        }
        if let Some(manifest) = &self.manifest {
            settings.library.manifest = manifest.clone();
        }
        if self.shuffle {
            settings.playback.shuffle = true;
        }
        if let Some(level) = &self.log_level {
            settings.logging.level = level.clone();
        }
        if self.no_mpris {
            settings.session.mpris = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_settings() {
        let args = Args::parse_from([
            "cassette",
            "/srv/music",
            "--manifest",
            "list.json",
            "--shuffle",
            "--no-mpris",
            "--log-level",
            "debug",
        ]);
        let mut settings = Settings::default();
        args.apply(&mut settings);

        assert_eq!(settings.library.media_dir, PathBuf::from("/srv/music"));
        assert_eq!(settings.library.manifest, "list.json");
        assert!(settings.playback.shuffle);
        assert!(!settings.session.mpris);
        assert_eq!(settings.logging.level, "debug");
    }

    #[test]
    fn absent_flags_keep_settings() {
        let args = Args::parse_from(["cassette"]);
        let mut settings = Settings::default();
        settings.playback.shuffle = true;
        args.apply(&mut settings);

        assert_eq!(settings.library.media_dir, PathBuf::from("songs"));
        assert!(settings.playback.shuffle);
        assert!(settings.session.mpris);
    }
}
