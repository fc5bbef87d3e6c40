//! Character detail pane — right panel.

use holocron_core::{
  enriched::EnrichedPerson,
  format::{format_date, format_height, format_mass, format_population, person_id},
};
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

// ─── Public entry ─────────────────────────────────────────────────────────────

/// Render the detail pane for `record` into `area`.
pub fn draw(f: &mut Frame, area: Rect, record: &EnrichedPerson, scroll: usize) {
  let title = match person_id(record.url()) {
    Some(id) => format!(" {} #{id} ", record.name()),
    None => format!(" {} ", record.name()),
  };
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let para = Paragraph::new(lines(record))
    .wrap(Wrap { trim: false })
    .scroll((scroll_offset(scroll), 0));
  f.render_widget(para, inner);
}

/// Row offset for ratatui, saturating instead of wrapping.
fn scroll_offset(scroll: usize) -> u16 { u16::try_from(scroll).unwrap_or(u16::MAX) }

/// The detail body for `record`, one entry per row before wrapping.
pub fn lines(record: &EnrichedPerson) -> Vec<Line<'static>> {
  let p = &record.person;
  let mut lines = vec![
    heading("Physical"),
    field("height", format_height(&p.height)),
    field("mass", format_mass(&p.mass)),
    field("hair", p.hair_color.clone()),
    field("skin", p.skin_color.clone()),
    field("eyes", p.eye_color.clone()),
    field("born", p.birth_year.clone()),
    field("gender", p.gender.clone()),
    Line::from(""),
    heading("Homeworld"),
    field("name", record.homeworld_name.clone()),
  ];

  if let Some(planet) = &record.homeworld {
    lines.extend([
      field("terrain", planet.terrain.clone()),
      field("climate", planet.climate.clone()),
      field("population", format_population(&planet.population)),
    ]);
  }

  lines.push(Line::from(""));
  lines.push(heading("Species"));
  lines.push(field("name", record.species_name.clone()));
  if let Some(species) = &record.species {
    lines.push(field("class", species.classification.clone()));
    lines.push(field("language", species.language.clone()));
  }

  lines.push(Line::from(""));
  lines.push(heading("Films"));
  if record.is_pending() {
    lines.push(dim("Loading…"));
  } else if record.film_titles.is_empty() {
    lines.push(dim("None"));
  } else {
    lines.extend(
      record
        .film_titles
        .iter()
        .map(|title| Line::from(format!("  • {title}"))),
    );
  }

  lines.push(Line::from(""));
  lines.push(field("created", format_date(&p.created)));
  lines.push(field("edited", format_date(&p.edited)));
  lines
}

fn heading(text: &'static str) -> Line<'static> {
  Line::from(Span::styled(
    text,
    Style::default()
      .fg(Color::Yellow)
      .add_modifier(Modifier::BOLD),
  ))
}

fn field(label: &'static str, value: String) -> Line<'static> {
  Line::from(vec![
    Span::styled(
      format!("  {label:<12}"),
      Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    ),
    Span::raw(value),
  ])
}

fn dim(text: &'static str) -> Line<'static> {
  Line::from(Span::styled(
    format!("  {text}"),
    Style::default().fg(Color::DarkGray),
  ))
}
