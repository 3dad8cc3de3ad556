use std::path::Path;
use std::time::Duration;

use rodio::Source;

use crate::error::PlaybackError;

use super::sink::open_decoder;
use super::types::DurationProbe;

/// Asks the decoder for the stream length without playing anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct RodioProbe;

impl DurationProbe for RodioProbe {
    fn probe(&self, path: &Path) -> Result<Option<Duration>, PlaybackError> {
        let decoder = open_decoder(path)?;
        Ok(decoder.total_duration())
    }
}
