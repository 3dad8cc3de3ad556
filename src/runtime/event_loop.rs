use std::io::Stdout;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{debug, info};

use crate::app::App;
use crate::config;
use crate::library::LoadEvent;
use crate::mpris::{ControlCmd, track_object_path};
use crate::ui::{self, Hitboxes};

/// State tracked by the runtime event loop across iterations.
#[derive(Debug, Default)]
pub struct EventLoopState {
    /// Mouse regions of the last drawn frame.
    pub hitboxes: Hitboxes,
    /// A press on the progress bar turns subsequent drags into seeks.
    pub dragging_progress: bool,
}

/// Main terminal event loop: folds in loader results, handles input, draws,
/// and dispatches MPRIS commands. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    control_tx: &mpsc::Sender<ControlCmd>,
    control_rx: &mpsc::Receiver<ControlCmd>,
    load_rx: &mpsc::Receiver<LoadEvent>,
    state: &mut EventLoopState,
) -> anyhow::Result<()> {
    loop {
        while let Ok(ev) = load_rx.try_recv() {
            app.apply_load_event(ev);
        }

        app.tick();

        let hitboxes = &mut state.hitboxes;
        terminal.draw(|f| *hitboxes = ui::draw(f, app, &settings.ui, &settings.controls))?;

        while let Ok(cmd) = control_rx.try_recv() {
            if handle_control_cmd(cmd, app) {
                return Ok(());
            }
        }

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if handle_key_event(key, settings, app, control_tx) {
                        info!("quit requested");
                        return Ok(());
                    }
                }
                Event::Mouse(mouse) => handle_mouse_event(mouse, app, state, Instant::now()),
                _ => {}
            }
        }
    }
}

/// Apply one remote or key-originated command. Returns true on quit.
pub(crate) fn handle_control_cmd(cmd: ControlCmd, app: &mut App) -> bool {
    debug!(?cmd, "control command");
    match cmd {
        ControlCmd::Quit => return true,
        ControlCmd::Play => app.play(),
        ControlCmd::Pause => app.pause(),
        ControlCmd::PlayPause => app.toggle_play(),
        ControlCmd::Stop => app.stop(),
        ControlCmd::Next => app.next(),
        ControlCmd::Prev => app.previous(),
        ControlCmd::Seek(offset) => app.seek_micros(offset),
        ControlCmd::SetPosition { track_id, position } => {
            let current = app.transport.current().map(track_object_path);
            // Stale requests for a track that is no longer current are ignored.
            if current.as_deref() == Some(track_id.as_str()) && position >= 0 {
                app.seek_to(Duration::from_micros(position.unsigned_abs()));
            }
        }
    }
    false
}

/// Returns true when the user asked to quit.
pub(crate) fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    control_tx: &mpsc::Sender<ControlCmd>,
) -> bool {
    let scrub = i64::try_from(settings.controls.scrub_seconds).unwrap_or(i64::MAX);

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_prev(),
        KeyCode::Enter => app.activate_selected(Instant::now()),
        // Behave like MPRIS so both paths share one dispatch.
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            let _ = control_tx.send(ControlCmd::PlayPause);
        }
        KeyCode::Char('l') | KeyCode::Char('n') => {
            let _ = control_tx.send(ControlCmd::Next);
        }
        KeyCode::Char('h') | KeyCode::Char('b') => {
            let _ = control_tx.send(ControlCmd::Prev);
        }
        KeyCode::Char('x') => {
            let _ = control_tx.send(ControlCmd::Stop);
        }
        KeyCode::Char('s') => app.toggle_shuffle(),
        KeyCode::Char('L') => app.scrub(scrub),
        KeyCode::Char('H') => app.scrub(-scrub),
        KeyCode::Esc => app.clear_status(),
        _ => {}
    }
    false
}

pub(crate) fn handle_mouse_event(mouse: MouseEvent, app: &mut App, state: &mut EventLoopState, at: Instant) {
    let hit = state.hitboxes;
    let (col, row) = (mouse.column, mouse.row);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if let Some(index) = hit.row_at(col, row, app.library.len()) {
                app.activate(index, at);
            } else if hit.on_progress(col, row) {
                state.dragging_progress = true;
                if let Some(fraction) = hit.progress_fraction(col) {
                    app.seek_fraction(fraction);
                }
            }
        }
        MouseEventKind::Drag(MouseButton::Left) if state.dragging_progress => {
            if let Some(fraction) = hit.progress_fraction(col) {
                app.seek_fraction(fraction);
            }
        }
        MouseEventKind::Up(MouseButton::Left) => state.dragging_progress = false,
        MouseEventKind::ScrollDown => app.select_next(),
        MouseEventKind::ScrollUp => app.select_prev(),
        _ => {}
    }
}
