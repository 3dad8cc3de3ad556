use crate::config::ShufflePolicySetting;

/// The playback state of the transport.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

impl PlaybackState {
    pub fn is_playing(self) -> bool {
        self == PlaybackState::Playing
    }
}

/// How `next` chooses a track while shuffling.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ShufflePolicy {
    /// Uniform over the whole library; the current track may come up again.
    #[default]
    Uniform,
    /// Uniform over every track but the current one (when there is a choice).
    AvoidCurrent,
}

impl From<ShufflePolicySetting> for ShufflePolicy {
    fn from(s: ShufflePolicySetting) -> Self {
        match s {
            ShufflePolicySetting::Uniform => ShufflePolicy::Uniform,
            ShufflePolicySetting::AvoidCurrent => ShufflePolicy::AvoidCurrent,
        }
    }
}
