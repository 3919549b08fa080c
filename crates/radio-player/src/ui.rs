//! Rendering for the full window and the minimized one-line view.

use radio_core::StationRegistry;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Flex, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthChar;

use crate::action::Action;
use crate::theme::{self, C_BG, C_GAUGE, C_SELECTION_BG, C_SEPARATOR};

/// Everything the renderer reads, snapshotted from the controller.
pub struct View<'a> {
    pub registry: &'a StationRegistry,
    pub current_index: usize,
    pub is_playing: bool,
    pub volume: i32,
    pub backend_ready: bool,
    pub status: Option<&'a str>,
}

impl View<'_> {
    pub fn now_playing_label(&self) -> String {
        if self.registry.is_empty() {
            return "No stations loaded.".to_string();
        }
        match self.registry.station_at(self.current_index) {
            Some(station) => format!("Now Playing: {}", station.name),
            None => "No station selected.".to_string(),
        }
    }

    pub fn play_button_label(&self) -> &'static str {
        if self.is_playing {
            "⏸ Pause"
        } else {
            "▶ Play"
        }
    }
}

/// Last-drawn button and gauge rects, for mouse hit-testing.
#[derive(Debug, Default, Clone, Copy)]
pub struct HitAreas {
    pub prev: Rect,
    pub play: Rect,
    pub next: Rect,
    pub volume: Rect,
}

fn hit(r: Rect, col: u16, row: u16) -> bool {
    col >= r.x && col < r.x + r.width && row >= r.y && row < r.y + r.height
}

impl HitAreas {
    pub fn action_at(&self, col: u16, row: u16) -> Option<Action> {
        if hit(self.prev, col, row) {
            Some(Action::Prev)
        } else if hit(self.play, col, row) {
            Some(Action::TogglePause)
        } else if hit(self.next, col, row) {
            Some(Action::Next)
        } else if hit(self.volume, col, row) {
            let span = self.volume.width.saturating_sub(1).max(1) as i32;
            let offset = (col - self.volume.x) as i32;
            Some(Action::Volume(offset * 100 / span))
        } else {
            None
        }
    }
}

/// Cut `text` to at most `width` terminal columns, marking the cut with `…`.
pub fn truncate(text: &str, width: usize) -> String {
    let total: usize = text.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    if width > 0 {
        out.push('…');
    }
    out
}

pub fn draw(frame: &mut Frame, view: &View) -> HitAreas {
    let area = frame.area();
    frame.render_widget(Block::default().style(Style::default().bg(C_BG)), area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1), // title
            Constraint::Length(1), // now playing
            Constraint::Length(1), // separator
            Constraint::Min(3),    // station list
            Constraint::Length(3), // buttons
            Constraint::Length(1), // volume
            Constraint::Length(1), // status
            Constraint::Length(1), // keys
        ])
        .split(area);

    frame.render_widget(
        Paragraph::new("Radio Player")
            .style(theme::style_title())
            .alignment(Alignment::Center),
        rows[0],
    );

    let label_style = match (view.registry.is_empty(), view.is_playing) {
        (true, _) => theme::style_secondary(),
        (false, true) => theme::style_playing(),
        (false, false) => theme::style_paused(),
    };
    frame.render_widget(
        Paragraph::new(truncate(&view.now_playing_label(), rows[1].width as usize))
            .style(label_style)
            .alignment(Alignment::Center),
        rows[1],
    );

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            "─".repeat(rows[2].width as usize),
            Style::default().fg(C_SEPARATOR),
        ))),
        rows[2],
    );

    draw_station_list(frame, rows[3], view);
    let (prev, play, next) = draw_buttons(frame, rows[4], view);
    let volume = draw_volume(frame, rows[5], view.volume);
    draw_status(frame, rows[6], view);
    frame.render_widget(
        Paragraph::new(
            " Space play/pause  n/p next/prev  ←→ +/- volume  m minimize  q quit",
        )
        .style(theme::style_muted()),
        rows[7],
    );

    HitAreas {
        prev,
        play,
        next,
        volume,
    }
}

fn draw_station_list(frame: &mut Frame, area: Rect, view: &View) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::style_border())
        .title(Span::styled(
            format!(" Stations ({}) ", view.registry.count()),
            theme::style_secondary(),
        ));

    if view.registry.is_empty() {
        frame.render_widget(
            Paragraph::new("No stations loaded.")
                .style(theme::style_muted())
                .alignment(Alignment::Center)
                .block(block),
            area,
        );
        return;
    }

    let inner_width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = view
        .registry
        .iter()
        .enumerate()
        .map(|(i, station)| {
            let marker = if i == view.current_index {
                if view.is_playing {
                    "▶ "
                } else {
                    "‖ "
                }
            } else {
                "  "
            };
            ListItem::new(format!(
                "{}{}",
                marker,
                truncate(&station.name, inner_width.saturating_sub(2))
            ))
            .style(theme::style_default())
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(theme::style_selected());
    let mut state = ListState::default().with_selected(Some(view.current_index));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_buttons(frame: &mut Frame, area: Rect, view: &View) -> (Rect, Rect, Rect) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .flex(Flex::Center)
        .spacing(1)
        .constraints([
            Constraint::Length(14),
            Constraint::Length(12),
            Constraint::Length(12),
        ])
        .split(area);

    let enabled = !view.registry.is_empty();
    draw_button(frame, cols[0], "⏮ Previous", enabled);
    draw_button(frame, cols[1], view.play_button_label(), enabled);
    draw_button(frame, cols[2], "Next ⏭", enabled);
    (cols[0], cols[1], cols[2])
}

fn draw_button(frame: &mut Frame, rect: Rect, label: &str, enabled: bool) {
    let style = if enabled {
        theme::style_default()
    } else {
        theme::style_muted()
    };
    frame.render_widget(
        Paragraph::new(label.to_string())
            .style(style)
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(theme::style_button()),
            ),
        rect,
    );
}

fn draw_volume(frame: &mut Frame, area: Rect, volume: i32) -> Rect {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(8), Constraint::Min(10)])
        .split(area);

    frame.render_widget(
        Paragraph::new("Volume:").style(theme::style_default()),
        cols[0],
    );
    let pct = volume.clamp(0, 100);
    frame.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(C_GAUGE).bg(C_SELECTION_BG))
            .ratio(pct as f64 / 100.0)
            .label(format!("{}%", pct)),
        cols[1],
    );
    cols[1]
}

fn draw_status(frame: &mut Frame, area: Rect, view: &View) {
    let (dot, dot_style) = if view.backend_ready {
        ("●", theme::style_playing())
    } else {
        ("○", Style::default().fg(theme::C_ACCENT))
    };
    let text = match (view.status, view.backend_ready) {
        (Some(s), _) => s.to_string(),
        (None, true) => String::new(),
        (None, false) => "audio backend unavailable, see log".to_string(),
    };
    let width = area.width.saturating_sub(2) as usize;
    let line = Line::from(vec![
        Span::styled(dot, dot_style),
        Span::raw(" "),
        Span::styled(truncate(&text, width), theme::style_secondary()),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Minimized view: one line, any key restores.
pub fn draw_compact(frame: &mut Frame, view: &View) {
    let area = frame.area();
    frame.render_widget(Block::default().style(Style::default().bg(C_BG)), area);
    let state = if view.is_playing { "▶" } else { "‖" };
    let text = format!(
        "{} {}  vol {}%  (space play/pause, q quit, any other key restores)",
        state,
        view.now_playing_label(),
        view.volume.clamp(0, 100)
    );
    let row = Rect {
        height: area.height.min(1),
        ..area
    };
    frame.render_widget(
        Paragraph::new(truncate(&text, area.width as usize)).style(theme::style_secondary()),
        row,
    );
}
