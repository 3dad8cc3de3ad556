//! Playback transport: current selection, play/pause state, shuffle, and the
//! now-playing descriptor pushed to the OS media session.

mod activation;
mod controller;
mod session;
mod state;

pub use activation::ActivationFilter;
pub use controller::Transport;
pub use session::{MediaSession, NowPlaying, NullSession};
#[cfg(test)]
pub use session::artwork_variants;
pub use state::{PlaybackState, ShufflePolicy};
