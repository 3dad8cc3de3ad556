//! Audio subsystem: the `MediaBackend` and `DurationProbe` seams and their
//! `rodio` implementations.

mod backend;
mod clock;
mod probe;
mod sink;
mod types;

pub use backend::{NullBackend, RodioBackend};
pub use probe::RodioProbe;
pub use types::{DurationProbe, MediaBackend};

#[cfg(test)]
mod tests;
