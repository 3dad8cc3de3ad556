use std::time::{Duration, Instant};

/// Coalesces repeated activations of one row. The first activation passes;
/// another on the same row inside `window` is swallowed and resets the
/// detector, so a double click toggles once rather than twice.
#[derive(Debug, Clone)]
pub struct ActivationFilter {
    window: Duration,
    last: Option<(usize, Instant)>,
}

impl ActivationFilter {
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// Returns true when the activation of `index` at `at` should reach the
    /// transport.
    pub fn accept(&mut self, index: usize, at: Instant) -> bool {
        let repeat = self.last.is_some_and(|(last_index, last_at)| {
            last_index == index && at.saturating_duration_since(last_at) < self.window
        });

        if repeat {
            self.last = None;
            false
        } else {
            self.last = Some((index, at));
            true
        }
    }
}

impl Default for ActivationFilter {
    fn default() -> Self {
        Self::new(Duration::from_millis(300))
    }
}
