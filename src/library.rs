//! The track library: manifest discovery, tag extraction and the background
//! loader that turns manifest entries into `Track`s.

mod display;
mod loader;
mod manifest;
mod model;
mod tags;

pub use display::{format_duration, time_readout};
pub use loader::{LoadContext, LoadEvent, LoadProgress, LoadTracker, Loader};
pub use manifest::discover;
pub use model::{CoverArt, Library, Track};
pub use tags::{LoftyTagReader, TrackDefaults};
