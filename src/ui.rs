//! UI rendering helpers for the terminal user interface.
//!
//! This module renders the TUI with `ratatui` and reports where the clickable
//! regions ended up so the event loop can hit-test mouse events.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Modifier, Style, Stylize},
    widgets::{Block, Borders, Cell, Gauge, Padding, Paragraph, Row, Table, TableState, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock};

use crate::app::App;
use crate::config::{ControlsSettings, UiSettings};
use crate::library::{Track, format_duration, time_readout};
use crate::transport::ShufflePolicy;

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("j/k", "up/down");
    map.insert("enter", "play/pause selected");
    map.insert("space/p", "play/pause");
    map.insert("h/l", "prev/next song");
    // H/L is filled dynamically from config.
    map.insert("x", "stop");
    map.insert("s", "shuffle");
    map.insert("q", "quit");
    map
});

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    let order = ["j/k", "h/l", "H/L", "enter", "space/p", "x", "s", "q"];
    order
        .iter()
        .filter_map(|k| {
            if *k == "H/L" {
                Some(format!("[H/L] scrub -/+{scrub_seconds}s"))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{k}] {v}"))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Screen regions the last frame drew that respond to the mouse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Hitboxes {
    /// Track rows, excluding borders and the column header.
    pub rows: Rect,
    /// Library index drawn on the first visible row.
    pub first_row: usize,
    /// Inside of the progress gauge.
    pub progress: Rect,
}

impl Hitboxes {
    /// Library index under the cell at (`column`, `row`), if any.
    pub fn row_at(&self, column: u16, row: u16, len: usize) -> Option<usize> {
        if !self.rows.contains(Position::new(column, row)) {
            return None;
        }
        let index = self.first_row + usize::from(row - self.rows.y);
        (index < len).then_some(index)
    }

    pub fn on_progress(&self, column: u16, row: u16) -> bool {
        self.progress.contains(Position::new(column, row))
    }

    /// Fraction of the gauge left of `column`, clamped to `[0, 1]`.
    pub fn progress_fraction(&self, column: u16) -> Option<f64> {
        if self.progress.width == 0 {
            return None;
        }
        let span = f64::from(self.progress.width.saturating_sub(1).max(1));
        let offset = f64::from(column.saturating_sub(self.progress.x));
        Some((offset / span).clamp(0.0, 1.0))
    }
}

/// First row of a `height`-row window that keeps `selected` near the middle.
fn window_start(selected: usize, total: usize, height: usize) -> usize {
    if total <= height || height == 0 {
        return 0;
    }
    let half = height / 2;
    let start = selected.saturating_sub(half);
    start.min(total - height)
}

fn status_text(app: &App) -> String {
    let mut parts: Vec<String> = vec![app.transport.now_playing_text(&app.library)];

    if app.transport.shuffle() {
        match app.transport.shuffle_policy() {
            ShufflePolicy::Uniform => parts.push("Shuffle: ON".to_string()),
            ShufflePolicy::AvoidCurrent => parts.push("Shuffle: ON (no repeat)".to_string()),
        }
    } else {
        parts.push("Shuffle: OFF".to_string());
    }

    let progress = app.load_progress();
    if !progress.is_finished() {
        parts.push(format!(
            "Loading {}/{}",
            progress.loaded + progress.failed,
            progress.total
        ));
    }
    if progress.failed > 0 {
        parts.push(format!("Skipped: {}", progress.failed));
    }

    if let Some(msg) = app.status() {
        parts.push(msg.to_string());
    }

    parts.join(" • ")
}

fn track_row<'a>(track: &'a Track, marker: &'a str, current: bool) -> Row<'a> {
    let row = Row::new(vec![
        Cell::from(marker),
        Cell::from(track.title.as_str()),
        Cell::from(track.artist.as_str()),
        Cell::from(track.album.as_str()),
        Cell::from(format_duration(track.duration)),
    ]);
    if current { row.bold() } else { row }
}

/// Render the entire UI into `frame` and return the mouse regions.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) -> Hitboxes {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(4),
            Constraint::Length(3),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" cassette ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Status box
    let status_par = Paragraph::new(status_text(app))
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, chunks[1]);

    // Track table. Only rows in the visible window are built.
    let list_block = Block::default().borders(Borders::ALL).title(" tracks ");
    let inner = list_block.inner(chunks[2]);
    let rows_area = Rect {
        y: inner.y.saturating_add(1),
        height: inner.height.saturating_sub(1),
        ..inner
    };

    let total = app.library.len();
    let height = usize::from(rows_area.height);
    let selected = app.selected.min(total.saturating_sub(1));
    let start = window_start(selected, total, height);
    let end = (start + height).min(total);
    let current = app.transport.current();

    let rows: Vec<Row> = app.library.tracks()[start..end]
        .iter()
        .enumerate()
        .map(|(offset, track)| {
            let index = start + offset;
            let marker = if current == Some(index) {
                app.transport.play_button_glyph()
            } else if track.cover_art.is_inline() {
                "♪"
            } else {
                " "
            };
            track_row(track, marker, current == Some(index))
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(2),
            Constraint::Percentage(40),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Length(6),
        ],
    )
    .header(Row::new(vec!["", "Title", "Artist", "Album", "Time"]).underlined())
    .block(list_block)
    .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
    .highlight_symbol("> ");

    let mut state = TableState::default();
    if total > 0 {
        state.select(Some(selected - start));
    }
    frame.render_stateful_widget(table, chunks[2], &mut state);

    // Progress
    let lib = &app.library;
    let ratio = app.transport.progress(lib).unwrap_or(0.0);
    let readout = time_readout(app.transport.position(), app.transport.duration(lib));
    let progress_block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", app.transport.play_button_glyph()));
    let progress_area = progress_block.inner(chunks[3]);
    let gauge = Gauge::default()
        .block(progress_block)
        .ratio(ratio)
        .label(readout);
    frame.render_widget(gauge, chunks[3]);

    let footer = Paragraph::new(controls_text(controls_settings.scrub_seconds))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[4]);

    Hitboxes {
        rows: rows_area,
        first_row: start,
        progress: progress_area,
    }
}

#[cfg(test)]
mod tests;
