use super::event_loop::{EventLoopState, handle_control_cmd, handle_key_event, handle_mouse_event};
use crate::app::App;
use crate::audio::MediaBackend;
use crate::config::Settings;
use crate::error::PlaybackError;
use crate::library::{CoverArt, Track};
use crate::mpris::{ControlCmd, track_object_path};
use crate::transport::{ActivationFilter, NullSession, Transport};
use crate::ui::Hitboxes;
use crossterm::event::{
    KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

#[derive(Default)]
struct Seekable {
    loaded: bool,
    position: Duration,
}

impl MediaBackend for Seekable {
    fn load_and_play(&mut self, _path: &Path) -> Result<(), PlaybackError> {
        self.loaded = true;
        self.position = Duration::ZERO;
        Ok(())
    }
    fn pause(&mut self) {}
    fn resume(&mut self) -> Result<(), PlaybackError> {
        Ok(())
    }
    fn stop(&mut self) {
        self.position = Duration::ZERO;
    }
    fn seek(&mut self, position: Duration) -> Result<(), PlaybackError> {
        self.position = position;
        Ok(())
    }
    fn position(&self) -> Duration {
        self.position
    }
    fn duration(&self) -> Option<Duration> {
        self.loaded.then_some(Duration::from_secs(100))
    }
    fn take_finished(&mut self) -> bool {
        false
    }
}

fn app(n: usize) -> App {
    let transport = Transport::new(Box::new(Seekable::default()), Box::new(NullSession));
    let mut app = App::new(transport, ActivationFilter::default());
    for i in 0..n {
        app.library.push(Track {
            path: PathBuf::from(format!("{i}.mp3")),
            title: format!("Song {i}"),
            artist: "Unknown".into(),
            album: "Unknown".into(),
            cover_art: CoverArt::Placeholder("cover.jpg".into()),
            duration: Some(Duration::from_secs(100)),
        });
    }
    app
}

fn key(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
}

fn click(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
    MouseEvent {
        kind,
        column,
        row,
        modifiers: KeyModifiers::NONE,
    }
}

fn hitboxes() -> Hitboxes {
    Hitboxes {
        rows: Rect::new(1, 5, 50, 10),
        first_row: 0,
        progress: Rect::new(1, 20, 101, 1),
    }
}

#[test]
fn play_keys_route_through_control_channel() {
    let settings = Settings::default();
    let mut app = app(2);
    let (tx, rx) = mpsc::channel();

    assert!(!handle_key_event(key(' '), &settings, &mut app, &tx));
    assert!(!handle_key_event(key('n'), &settings, &mut app, &tx));
    assert!(!handle_key_event(key('b'), &settings, &mut app, &tx));
    assert!(!handle_key_event(key('x'), &settings, &mut app, &tx));
    assert!(handle_key_event(key('q'), &settings, &mut app, &tx));

    let got: Vec<ControlCmd> = rx.try_iter().collect();
    assert_eq!(
        got,
        vec![
            ControlCmd::PlayPause,
            ControlCmd::Next,
            ControlCmd::Prev,
            ControlCmd::Stop
        ]
    );
}

#[test]
fn control_commands_drive_the_transport() {
    let mut app = app(3);
    assert!(!handle_control_cmd(ControlCmd::PlayPause, &mut app));
    assert!(app.transport.is_playing());
    assert_eq!(app.transport.current(), Some(0));

    handle_control_cmd(ControlCmd::Next, &mut app);
    assert_eq!(app.transport.current(), Some(1));

    handle_control_cmd(ControlCmd::Seek(30_000_000), &mut app);
    assert_eq!(app.transport.position(), Duration::from_secs(30));
    handle_control_cmd(ControlCmd::Seek(-50_000_000), &mut app);
    assert_eq!(app.transport.position(), Duration::ZERO);

    handle_control_cmd(ControlCmd::Stop, &mut app);
    assert!(!app.transport.is_playing());
    assert!(handle_control_cmd(ControlCmd::Quit, &mut app));
}

#[test]
fn set_position_ignores_stale_track_ids() {
    let mut app = app(3);
    handle_control_cmd(ControlCmd::Play, &mut app);

    handle_control_cmd(
        ControlCmd::SetPosition {
            track_id: track_object_path(2),
            position: 10_000_000,
        },
        &mut app,
    );
    assert_eq!(app.transport.position(), Duration::ZERO);

    handle_control_cmd(
        ControlCmd::SetPosition {
            track_id: track_object_path(0),
            position: 10_000_000,
        },
        &mut app,
    );
    assert_eq!(app.transport.position(), Duration::from_secs(10));
}

#[test]
fn scrub_keys_use_configured_step() {
    let mut settings = Settings::default();
    settings.controls.scrub_seconds = 12;
    let mut app = app(1);
    let (tx, _rx) = mpsc::channel();
    handle_control_cmd(ControlCmd::Play, &mut app);

    handle_key_event(key('L'), &settings, &mut app, &tx);
    assert_eq!(app.transport.position(), Duration::from_secs(12));
    handle_key_event(key('H'), &settings, &mut app, &tx);
    assert_eq!(app.transport.position(), Duration::ZERO);
}

#[test]
fn double_click_on_row_plays_once() {
    let mut app = app(3);
    let mut state = EventLoopState {
        hitboxes: hitboxes(),
        dragging_progress: false,
    };
    let t0 = Instant::now();

    let down = click(MouseEventKind::Down(MouseButton::Left), 4, 6);
    handle_mouse_event(down, &mut app, &mut state, t0);
    handle_mouse_event(down, &mut app, &mut state, t0 + Duration::from_millis(250));

    assert!(app.transport.is_playing());
    assert_eq!(app.transport.current(), Some(1));
    assert_eq!(app.selected, 1);
}

#[test]
fn progress_click_and_drag_seek() {
    let mut app = app(1);
    handle_control_cmd(ControlCmd::Play, &mut app);
    let mut state = EventLoopState {
        hitboxes: hitboxes(),
        dragging_progress: false,
    };
    let now = Instant::now();

    handle_mouse_event(
        click(MouseEventKind::Down(MouseButton::Left), 51, 20),
        &mut app,
        &mut state,
        now,
    );
    assert!(state.dragging_progress);
    assert_eq!(app.transport.position(), Duration::from_secs(50));

    // Drags keep seeking even when the pointer leaves the bar vertically.
    handle_mouse_event(
        click(MouseEventKind::Drag(MouseButton::Left), 76, 22),
        &mut app,
        &mut state,
        now,
    );
    assert_eq!(app.transport.position(), Duration::from_secs(75));

    handle_mouse_event(
        click(MouseEventKind::Up(MouseButton::Left), 76, 22),
        &mut app,
        &mut state,
        now,
    );
    handle_mouse_event(
        click(MouseEventKind::Drag(MouseButton::Left), 1, 20),
        &mut app,
        &mut state,
        now,
    );
    assert_eq!(app.transport.position(), Duration::from_secs(75));
}
