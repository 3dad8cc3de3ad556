use super::*;
use crate::audio::NullBackend;
use crate::config::Settings;
use crate::library::{CoverArt, Track};
use crate::transport::{ActivationFilter, NullSession, Transport};
use ratatui::{Terminal, backend::TestBackend};
use std::path::PathBuf;
use std::time::Duration;

fn app(n: usize) -> App {
    let transport = Transport::new(
        Box::new(NullBackend::new("test")),
        Box::new(NullSession),
    );
    let mut app = App::new(transport, ActivationFilter::default());
    for i in 0..n {
        app.library.push(Track {
            path: PathBuf::from(format!("{i}.mp3")),
            title: format!("Song {i}"),
            artist: "Band".into(),
            album: "Unknown".into(),
            cover_art: CoverArt::Placeholder("cover.jpg".into()),
            duration: Some(Duration::from_secs(65)),
        });
    }
    app
}

fn render(app: &App, width: u16, height: u16) -> (String, Hitboxes) {
    let settings = Settings::default();
    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    let mut hit = Hitboxes::default();
    terminal
        .draw(|f| hit = draw(f, app, &settings.ui, &settings.controls))
        .unwrap();
    let text = terminal
        .backend()
        .buffer()
        .content
        .iter()
        .map(|c| c.symbol())
        .collect::<String>();
    (text, hit)
}

#[test]
fn controls_text_includes_scrub_seconds() {
    let text = controls_text(7);
    assert!(text.contains("[H/L] scrub -/+7s"));
    assert!(text.contains("[x] stop"));
}

#[test]
fn window_keeps_selection_centered_and_in_bounds() {
    assert_eq!(window_start(3, 5, 10), 0);
    assert_eq!(window_start(0, 100, 10), 0);
    assert_eq!(window_start(50, 100, 10), 45);
    assert_eq!(window_start(99, 100, 10), 90);
}

#[test]
fn draws_rows_readout_and_idle_status() {
    let app = app(3);
    let (text, _) = render(&app, 100, 30);
    assert!(text.contains("Song 2"));
    assert!(text.contains("1:05"));
    assert!(text.contains("0:00 / -:--"));
    assert!(text.contains("Stopped: Unknown - Unknown"));
}

#[test]
fn row_hit_testing_maps_to_library_index() {
    let app = app(3);
    let (_, hit) = render(&app, 100, 30);

    let x = hit.rows.x + 3;
    assert_eq!(hit.row_at(x, hit.rows.y, 3), Some(0));
    assert_eq!(hit.row_at(x, hit.rows.y + 2, 3), Some(2));
    assert_eq!(hit.row_at(x, hit.rows.y + 3, 3), None);
    assert_eq!(hit.row_at(x, hit.rows.y.saturating_sub(1), 3), None);
}

#[test]
fn progress_fraction_spans_the_gauge() {
    let hit = Hitboxes {
        rows: Rect::default(),
        first_row: 0,
        progress: Rect::new(10, 20, 101, 1),
    };
    assert!(hit.on_progress(60, 20));
    assert!(!hit.on_progress(60, 21));
    assert_eq!(hit.progress_fraction(10), Some(0.0));
    assert_eq!(hit.progress_fraction(60), Some(0.5));
    assert_eq!(hit.progress_fraction(500), Some(1.0));
    assert_eq!(hit.progress_fraction(0), Some(0.0));
}
