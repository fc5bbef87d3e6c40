//! Character list pane — left panel.
//!
//! Shows the search box, active filters, the result rows for the current
//! view state, and the page strip.

use holocron_core::{
  enriched::EnrichedPerson,
  paging::{PageLink, page_window},
  query::{FilterKind, Filters},
};
use holocron_engine::{Snapshot, ViewState};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::app::{App, Input};

/// Render the character list into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App, snap: &Snapshot) {
  let block = Block::default()
    .title(format!(" Characters  {} ", snap.summary))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // search
      Constraint::Length(1), // filters
      Constraint::Min(0),    // results
      Constraint::Length(1), // caveat
      Constraint::Length(1), // pages
    ])
    .split(inner);

  draw_search(f, rows[0], app, snap);
  draw_filters(f, rows[1], &snap.active_filters);

  match snap.view {
    ViewState::Loading => message(f, rows[2], "Loading characters…", Color::DarkGray),
    ViewState::Failed => {
      let text = snap
        .error
        .as_ref()
        .map_or_else(|| "Failed to load characters".to_string(), ToString::to_string);
      f.render_widget(
        Paragraph::new(vec![
          Line::from(Span::styled(text, Style::default().fg(Color::Red))),
          Line::from(""),
          Line::from(Span::styled(
            "Press r to retry.",
            Style::default().fg(Color::DarkGray),
          )),
        ])
        .wrap(Wrap { trim: true }),
        rows[2],
      );
    }
    ViewState::Empty { filtered: true } => message(
      f,
      rows[2],
      "No characters match. Press c to clear search and filters.",
      Color::Yellow,
    ),
    ViewState::Empty { filtered: false } => {
      message(f, rows[2], "No characters found.", Color::DarkGray)
    }
    ViewState::Ready => draw_records(f, rows[2], app, &snap.visible_records),
  }

  if let Some(caveat) = snap.summary.caveat() {
    message(f, rows[3], caveat, Color::DarkGray);
  }
  draw_pages(f, rows[4], snap);
}

fn message(f: &mut Frame, area: Rect, text: &str, color: Color) {
  f.render_widget(
    Paragraph::new(text.to_string())
      .style(Style::default().fg(color))
      .wrap(Wrap { trim: true }),
    area,
  );
}

fn draw_search(f: &mut Frame, area: Rect, app: &App, snap: &Snapshot) {
  let line = if app.input == Input::Search {
    Line::from(Span::styled(
      format!("/{}_", app.search_draft),
      Style::default().fg(Color::Yellow),
    ))
  } else if snap.search_query.is_empty() {
    Line::from(Span::styled(
      "/ search by name",
      Style::default().fg(Color::DarkGray),
    ))
  } else {
    Line::from(Span::styled(
      format!("/{}", snap.search_query),
      Style::default().fg(Color::Yellow),
    ))
  };
  f.render_widget(Paragraph::new(line), area);
}

fn draw_filters(f: &mut Frame, area: Rect, filters: &Filters) {
  let mut spans = Vec::new();
  for (key, kind) in [
    ('h', FilterKind::Homeworld),
    ('s', FilterKind::Species),
    ('f', FilterKind::Film),
  ] {
    let (value, style) = match filters.get(kind) {
      Some(v) => (v, Style::default().fg(Color::Cyan)),
      None => ("any", Style::default().fg(Color::DarkGray)),
    };
    spans.push(Span::styled(
      format!("[{key}] {kind}: "),
      Style::default().fg(Color::DarkGray),
    ));
    spans.push(Span::styled(format!("{value}  "), style));
  }
  f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_records(f: &mut Frame, area: Rect, app: &App, records: &[EnrichedPerson]) {
  let items: Vec<ListItem> = records
    .iter()
    .map(|record| {
      let (detail_style, species_style) = if record.is_pending() {
        let dim = Style::default()
          .fg(Color::DarkGray)
          .add_modifier(Modifier::ITALIC);
        (dim, dim)
      } else {
        (
          Style::default().fg(Color::Gray),
          Style::default().fg(species_color(&record.species_name)),
        )
      };
      ListItem::new(Line::from(vec![
        Span::styled(
          format!("{:<22}", record.name()),
          Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("{} · ", record.homeworld_name), detail_style),
        Span::styled(record.species_name.clone(), species_style),
      ]))
    })
    .collect();

  let mut state = ListState::default();
  state.select((!records.is_empty()).then_some(app.list_cursor));

  f.render_stateful_widget(
    List::new(items).highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    area,
    &mut state,
  );
}

/// Accent colour for a species name. Unlisted species share the Human accent.
fn species_color(name: &str) -> Color {
  match name {
    "Droid" => Color::Rgb(0x9c, 0xa3, 0xaf),
    "Wookiee" => Color::Rgb(0xfb, 0xbf, 0x24),
    "Rodian" => Color::Rgb(0x4a, 0xde, 0x80),
    "Hutt" => Color::Rgb(0xfa, 0xcc, 0x15),
    "Yoda's species" => Color::Rgb(0x34, 0xd3, 0x99),
    "Trandoshan" => Color::Rgb(0xa3, 0xe6, 0x35),
    "Mon Calamari" => Color::Rgb(0x22, 0xd3, 0xee),
    "Ewok" => Color::Rgb(0xfb, 0x92, 0x3c),
    "Sullustan" => Color::Rgb(0xfb, 0x71, 0x85),
    "Neimodian" => Color::Rgb(0xc0, 0x84, 0xfc),
    "Gungan" => Color::Rgb(0x2d, 0xd4, 0xbf),
    "Toydarian" => Color::Rgb(0x81, 0x8c, 0xf8),
    "Dug" => Color::Rgb(0xf4, 0x72, 0xb6),
    "Twi'lek" => Color::Rgb(0xa7, 0x8b, 0xfa),
    "Aleena" => Color::Rgb(0xe8, 0x79, 0xf9),
    "Vulptereen" => Color::Rgb(0xf8, 0x71, 0x71),
    "Xexto" => Color::Rgb(0x38, 0xbd, 0xf8),
    "Toong" => Color::Rgb(0x94, 0xa3, 0xb8),
    "Cerean" => Color::Rgb(0xa8, 0xa2, 0x9e),
    "Nautolan" => Color::Rgb(0xa1, 0xa1, 0xaa),
    _ => HUMAN,
  }
}

const HUMAN: Color = Color::Rgb(0x60, 0xa5, 0xfa);

fn draw_pages(f: &mut Frame, area: Rect, snap: &Snapshot) {
  if snap.total_pages == 0 {
    return;
  }
  let arrow = |enabled: bool, text: &'static str| {
    let color = if enabled { Color::White } else { Color::DarkGray };
    Span::styled(text, Style::default().fg(color))
  };

  let mut spans = vec![arrow(snap.has_previous, "‹ prev ")];
  for link in page_window(snap.current_page, snap.total_pages) {
    spans.push(match link {
      PageLink::Page(n) if n == snap.current_page => Span::styled(
        format!(" {n} "),
        Style::default()
          .fg(Color::Black)
          .bg(Color::Cyan)
          .add_modifier(Modifier::BOLD),
      ),
      PageLink::Page(n) => Span::raw(format!(" {n} ")),
      PageLink::Ellipsis => Span::styled(" … ", Style::default().fg(Color::DarkGray)),
    });
  }
  spans.push(arrow(snap.has_next, " next ›"));
  f.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn known_species_have_their_own_accent() {
    assert_eq!(species_color("Human"), HUMAN);
    assert_ne!(species_color("Wookiee"), HUMAN);
    assert_ne!(species_color("Droid"), species_color("Wookiee"));
  }

  #[test]
  fn unlisted_species_fall_back_to_human() {
    assert_eq!(species_color("Kaleesh"), HUMAN);
    assert_eq!(species_color(""), HUMAN);
    // Names match exactly, as the API spells them.
    assert_eq!(species_color("wookiee"), HUMAN);
  }
}
