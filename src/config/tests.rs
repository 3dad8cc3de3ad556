use super::load::{default_config_path, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|e| e.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_cassette_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("CASSETTE_CONFIG_PATH", "/tmp/cassette-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/cassette-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("cassette")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("cassette")
            .join("config.toml")
    );
}

#[test]
fn defaults_match_the_web_player_layout() {
    let s = Settings::default();
    assert_eq!(s.library.manifest, "songs.json");
    assert_eq!(s.library.media_dir, std::path::PathBuf::from("songs"));
    assert_eq!(s.library.default_cover, "images/default-cover.jpg");
    assert_eq!(s.controls.double_activation_ms, 300);
    assert_eq!(s.playback.shuffle_policy, ShufflePolicySetting::Uniform);
    assert!(s.validate().is_ok());
}

#[test]
fn validate_rejects_zero_windows() {
    let mut s = Settings::default();
    s.library.duration_timeout_ms = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.controls.double_activation_ms = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.library.max_parallel_loads = 0;
    assert!(s.validate().is_err());
}

#[test]
fn settings_load_from_config_file_and_parse_policy_aliases() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[library]
media_dir = "/srv/music"
manifest = "list.json"
scan_when_manifest_missing = false
extensions = ["mp3"]
duration_timeout_ms = 750

[playback]
shuffle = true
shuffle_policy = "no-repeat"

[controls]
scrub_seconds = 9
double_activation_ms = 250

[ui]
header_text = "hello"

[session]
mpris = false

[logging]
level = "debug"
directory = "/tmp/cassette-logs"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("CASSETTE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("CASSETTE__CONTROLS__SCRUB_SECONDS");

    let s = Settings::load().unwrap();
    assert_eq!(s.library.media_dir, std::path::PathBuf::from("/srv/music"));
    assert_eq!(s.library.manifest, "list.json");
    assert!(!s.library.scan_when_manifest_missing);
    assert_eq!(s.library.extensions, vec!["mp3".to_string()]);
    assert_eq!(s.library.duration_timeout_ms, 750);
    assert!(s.playback.shuffle);
    assert_eq!(s.playback.shuffle_policy, ShufflePolicySetting::AvoidCurrent);
    assert_eq!(s.controls.scrub_seconds, 9);
    assert_eq!(s.controls.double_activation_ms, 250);
    assert_eq!(s.ui.header_text, "hello");
    assert_eq!(s.ui.unknown_text, "Unknown");
    assert!(!s.session.mpris);
    assert_eq!(s.logging.level, "debug");
    assert_eq!(
        s.logging.directory,
        Some(std::path::PathBuf::from("/tmp/cassette-logs"))
    );
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[controls]
scrub_seconds = 5
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("CASSETTE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("CASSETTE__CONTROLS__SCRUB_SECONDS", "12");

    let s = Settings::load().unwrap();
    assert_eq!(s.controls.scrub_seconds, 12);
}
