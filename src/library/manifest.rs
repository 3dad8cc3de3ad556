use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};
use walkdir::WalkDir;

use crate::config::LibrarySettings;
use crate::error::LoadError;

/// Read a manifest: a JSON array of file names.
pub fn read_manifest(path: &Path) -> Result<Vec<String>, LoadError> {
    let raw = fs::read_to_string(path).map_err(|source| LoadError::ManifestFetch {
        path: path.to_path_buf(),
        source,
    })?;
    parse_manifest(path, &raw)
}

fn parse_manifest(path: &Path, raw: &str) -> Result<Vec<String>, LoadError> {
    let names: Vec<String> =
        serde_json::from_str(raw).map_err(|source| LoadError::ManifestParse {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(names
        .into_iter()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect())
}

/// Resolve the list of files to load, in manifest order.
///
/// A missing or unreadable manifest falls back to walking `media_dir` when
/// `scan_when_manifest_missing` is set. A manifest that exists but does not
/// parse is always an error.
pub fn discover(settings: &LibrarySettings) -> Result<Vec<PathBuf>, LoadError> {
    let manifest = settings.media_dir.join(&settings.manifest);

    match read_manifest(&manifest) {
        Ok(names) => {
            info!(manifest = %manifest.display(), entries = names.len(), "manifest read");
            Ok(names
                .into_iter()
                .map(|n| settings.media_dir.join(n))
                .collect())
        }
        Err(err @ LoadError::ManifestFetch { .. }) if settings.scan_when_manifest_missing => {
            warn!(error = %err, dir = %settings.media_dir.display(), "manifest unavailable, scanning media directory");
            Ok(scan_media_dir(&settings.media_dir, settings))
        }
        Err(err) => Err(err),
    }
}

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Walk `dir` for audio files, skipping dotfiles, sorted by path.
pub fn scan_media_dir(dir: &Path, settings: &LibrarySettings) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file() && is_audio_file(e.path(), settings))
        .map(|e| e.into_path())
        .collect();

    paths.sort();
    paths
}
