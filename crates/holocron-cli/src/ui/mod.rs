//! TUI rendering — orchestrates all panes.

pub mod character_detail;
pub mod character_list;

use chrono::Local;
use holocron_core::query::FilterKind;
use holocron_engine::Snapshot;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::app::{App, Input, Screen};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let snap = app.catalog.snapshot();
  let area = f.area();

  // Vertical stack: header, body, status bar.
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], &snap);
  draw_body(f, rows[1], app, &snap);
  draw_status(f, rows[2], app, &snap);
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, snap: &Snapshot) {
  let date = Local::now().format("%Y-%m-%d").to_string();

  let left = Span::styled(
    " holo  [/] search  [h/s/f] filter  [q] quit",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let right = Span::styled(
    format!("{} mode  {date} ", snap.mode),
    Style::default().fg(Color::Gray),
  );

  let left_width = left.content.len() as u16;
  let right_width = right.content.len() as u16;
  let pad = area
    .width
    .saturating_sub(left_width)
    .saturating_sub(right_width);

  let line = Line::from(vec![
    left,
    Span::raw(" ".repeat(pad as usize)),
    right,
  ]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body(f: &mut Frame, area: Rect, app: &App, snap: &Snapshot) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
    .split(area);

  character_list::draw(f, cols[0], app, snap);

  match (app.input, &snap.selected_record) {
    (Input::Picker(kind), _) => draw_picker(f, cols[1], app, snap, kind),
    (_, Some(record)) if app.screen == Screen::CharacterDetail => {
      character_detail::draw(f, cols[1], record, app.detail_scroll);
    }
    _ => draw_empty_detail(f, cols[1]),
  }
}

fn draw_empty_detail(f: &mut Frame, area: Rect) {
  let block = Block::default()
    .title(" Detail ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(
    Paragraph::new(Line::from(vec![Span::styled(
      "Select a character and press Enter.",
      Style::default().fg(Color::DarkGray),
    )])),
    inner,
  );
}

fn draw_picker(
  f: &mut Frame,
  area: Rect,
  app: &App,
  snap: &Snapshot,
  kind: FilterKind,
) {
  let options = snap.filter_options.get(kind);
  let active = snap.active_filters.get(kind);

  let block = Block::default()
    .title(format!(" Filter by {kind} "))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Yellow));

  let items: Vec<ListItem> = options
    .iter()
    .map(|option| {
      let marker = if Some(option.as_str()) == active { "● " } else { "  " };
      ListItem::new(format!("{marker}{option}"))
    })
    .collect();

  let mut state = ListState::default();
  state.select((!options.is_empty()).then_some(app.picker_cursor));

  f.render_stateful_widget(
    List::new(items).block(block).highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    area,
    &mut state,
  );
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App, snap: &Snapshot) {
  let (mode_label, hints) = match (app.input, app.screen) {
    (Input::Search, _) => ("SEARCH", "Type to search  Enter done  Esc clear"),
    (Input::Picker(_), _) => ("FILTER", "↑↓/jk choose  Enter apply  x clear  Esc cancel"),
    (Input::Normal, Screen::CharacterList) => (
      "NORMAL",
      "↑↓/jk move  ←→ page  Enter detail  x clear filters  c clear all",
    ),
    (Input::Normal, Screen::CharacterDetail) => (
      "DETAIL",
      "↑↓/jk scroll  [ prev  ] next  Esc back  q quit",
    ),
  };

  let status = if !app.status_msg.is_empty() {
    app.status_msg.clone()
  } else if snap.is_loading_enrichment {
    "Resolving character details…".to_string()
  } else if snap.is_loading_options && snap.filter_options.is_empty() {
    "Loading filter options…".to_string()
  } else {
    hints.to_string()
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(
    format!("  {status}"),
    Style::default().fg(Color::DarkGray),
  );

  let line = Line::from(vec![mode_span, hint_span]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}
