//! Tag extraction: the `TagReader` seam, its `lofty` implementation and the
//! conversion from raw tag fields into a `Track`.

use std::io::Cursor;
use std::path::PathBuf;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use lofty::file::{AudioFile, TaggedFileExt};
use lofty::picture::PictureType;
use lofty::prelude::Accessor;
use lofty::probe::Probe;
use thiserror::Error;

use super::model::{CoverArt, Track};

/// An embedded picture as found in the tags.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Picture {
    /// MIME type, e.g. `image/png`.
    pub format: String,
    pub data: Vec<u8>,
}

/// Whatever the tag parser could find. Every field is optional.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawTags {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub picture: Option<Picture>,
    /// Stream length reported by the container, used when probing times out.
    pub duration_hint: Option<Duration>,
}

#[derive(Debug, Error)]
#[error("{0}")]
pub struct TagError(pub String);

/// Parses tag fields out of a complete file held in memory.
pub trait TagReader: Send + Sync {
    fn read_tags(&self, bytes: &[u8]) -> Result<RawTags, TagError>;
}

/// `TagReader` backed by `lofty`, with the container type guessed from content.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoftyTagReader;

impl TagReader for LoftyTagReader {
    fn read_tags(&self, bytes: &[u8]) -> Result<RawTags, TagError> {
        let tagged = Probe::new(Cursor::new(bytes))
            .guess_file_type()
            .map_err(|e| TagError(e.to_string()))?
            .read()
            .map_err(|e| TagError(e.to_string()))?;

        let length = tagged.properties().duration();
        let duration_hint = (!length.is_zero()).then_some(length);

        let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) else {
            return Ok(RawTags {
                duration_hint,
                ..RawTags::default()
            });
        };

        let pictures = tag.pictures();
        let picture = pictures
            .iter()
            .find(|p| p.pic_type() == PictureType::CoverFront)
            .or_else(|| pictures.first())
            .map(|p| Picture {
                format: p
                    .mime_type()
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_else(|| "image/jpeg".to_string()),
                data: p.data().to_vec(),
            });

        Ok(RawTags {
            title: tag.title().map(|v| v.into_owned()),
            artist: tag.artist().map(|v| v.into_owned()),
            album: tag.album().map(|v| v.into_owned()),
            picture,
            duration_hint,
        })
    }
}

/// Build a `data:<mime>;base64,<payload>` URI for an embedded picture.
pub fn picture_data_uri(picture: &Picture) -> String {
    format!(
        "data:{};base64,{}",
        picture.format.trim(),
        STANDARD.encode(&picture.data)
    )
}

/// Pick the cover for a track: the embedded picture when it has bytes,
/// otherwise the placeholder.
pub fn cover_art_from(picture: Option<&Picture>, placeholder: &str) -> CoverArt {
    match picture {
        Some(p) if !p.data.is_empty() => CoverArt::Inline(picture_data_uri(p)),
        _ => CoverArt::Placeholder(placeholder.to_string()),
    }
}

fn or_unknown(value: Option<&str>, unknown: &str) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(unknown)
        .to_string()
}

/// Values substituted for missing tag fields.
#[derive(Clone, Debug)]
pub struct TrackDefaults {
    pub unknown_text: String,
    pub default_cover: String,
}

impl Default for TrackDefaults {
    fn default() -> Self {
        Self {
            unknown_text: "Unknown".to_string(),
            default_cover: "images/default-cover.jpg".to_string(),
        }
    }
}

impl Track {
    /// Build a track from parsed tags. The duration is left unset; the loader
    /// fills it in once the probe resolves.
    pub fn from_tags(path: PathBuf, tags: &RawTags, defaults: &TrackDefaults) -> Self {
        Self {
            path,
            title: or_unknown(tags.title.as_deref(), &defaults.unknown_text),
            artist: or_unknown(tags.artist.as_deref(), &defaults.unknown_text),
            album: or_unknown(tags.album.as_deref(), &defaults.unknown_text),
            cover_art: cover_art_from(tags.picture.as_ref(), &defaults.default_cover),
            duration: None,
        }
    }
}
