use std::io;
use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::cli::Args;
use crate::library::LoadEvent;
use crate::logging;
use crate::mpris::ControlCmd;

mod event_loop;
mod settings;
mod startup;

pub fn run(args: Args) -> anyhow::Result<()> {
    let (mut settings, config_warning) = settings::load_settings();
    args.apply(&mut settings);

    let _log_guard = logging::init_logging(&settings.logging)?;
    if let Some(msg) = config_warning {
        warn!("{msg}");
    }
    info!(
        media_dir = %settings.library.media_dir.display(),
        manifest = %settings.library.manifest,
        "starting"
    );

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let (load_tx, load_rx) = mpsc::channel::<LoadEvent>();

    let media = startup::open_backend();
    let session = startup::open_session(&settings.session, control_tx.clone());
    let mut app = startup::build_app(&settings, media, session);
    let loader = startup::start_loading(&settings, &mut app, load_tx);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut state = event_loop::EventLoopState::default();
    let run_result = event_loop::run(
        &mut terminal,
        &settings,
        &mut app,
        &control_tx,
        &control_rx,
        &load_rx,
        &mut state,
    );

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // A worker stuck in a probe gives up after the probe timeout at most.
    if let Some(loader) = loader {
        let grace = Duration::from_millis(settings.library.duration_timeout_ms);
        if !loader.shutdown(grace) {
            warn!(?grace, "loader workers still busy at exit");
        }
    }
    app.stop();
    info!("shutting down");

    run_result
}

#[cfg(test)]
mod tests;
