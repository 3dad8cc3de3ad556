use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::time::Duration;

use tracing::{info, warn};

use crate::app::App;
use crate::audio::{MediaBackend, NullBackend, RodioBackend, RodioProbe};
use crate::config;
use crate::library::{LoadContext, LoadEvent, Loader, LoftyTagReader, TrackDefaults, discover};
use crate::mpris::{self, ControlCmd};
use crate::transport::{ActivationFilter, MediaSession, NullSession, Transport};

/// Open the default output device, or a backend that rejects every play.
pub fn open_backend() -> Box<dyn MediaBackend> {
    match RodioBackend::open() {
        Ok(b) => Box::new(b),
        Err(e) => {
            warn!(error = %e, "audio output unavailable, playback disabled");
            Box::new(NullBackend::new(e.to_string()))
        }
    }
}

pub fn open_session(
    settings: &config::SessionSettings,
    control_tx: Sender<ControlCmd>,
) -> Box<dyn MediaSession> {
    if settings.mpris {
        Box::new(mpris::spawn_mpris(control_tx, &settings.bus_name))
    } else {
        info!("MPRIS disabled");
        Box::new(NullSession)
    }
}

/// Build the app context with playback defaults applied.
pub fn build_app(
    settings: &config::Settings,
    media: Box<dyn MediaBackend>,
    session: Box<dyn MediaSession>,
) -> App {
    let transport = Transport::new(media, session)
        .with_shuffle(
            settings.playback.shuffle,
            settings.playback.shuffle_policy.into(),
        )
        .with_placeholders(
            settings.ui.unknown_text.clone(),
            settings.library.default_cover.clone(),
        );
    let activation =
        ActivationFilter::new(Duration::from_millis(settings.controls.double_activation_ms));

    let app = App::new(transport, activation);
    // Let the session show the idle state before anything loads.
    app.transport.publish(&app.library);
    app
}

/// Discover the library and start loading it in the background. Returns
/// `None` when there is nothing to load.
pub fn start_loading(
    settings: &config::Settings,
    app: &mut App,
    tx: Sender<LoadEvent>,
) -> Option<Loader> {
    let paths = match discover(&settings.library) {
        Ok(paths) => paths,
        Err(e) => {
            warn!(error = %e, "library unavailable");
            app.set_status(e.to_string());
            return None;
        }
    };
    if paths.is_empty() {
        app.set_status(format!(
            "No tracks found in {}",
            settings.library.media_dir.display()
        ));
        return None;
    }

    let ctx = LoadContext {
        tags: Arc::new(LoftyTagReader),
        probe: Arc::new(RodioProbe),
        defaults: TrackDefaults {
            unknown_text: settings.ui.unknown_text.clone(),
            default_cover: settings.library.default_cover.clone(),
        },
        duration_timeout: Duration::from_millis(settings.library.duration_timeout_ms),
    };

    info!(files = paths.len(), "loading library");
    let (loader, tracker) = Loader::spawn(paths, ctx, settings.library.max_parallel_loads, tx);
    app.set_loads(tracker);
    Some(loader)
}
