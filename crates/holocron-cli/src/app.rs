//! Application state machine and key dispatcher.
//!
//! All query state lives in the [`Catalog`]; the app only tracks what is
//! local to the terminal (focus, cursors, the search being typed) and turns
//! keys into catalog intents.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use holocron_client::HttpSource;
use holocron_core::{enriched::EnrichedPerson, query::FilterKind};
use holocron_engine::Catalog;

use crate::ui::character_detail;

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  /// Focus on the character list.
  CharacterList,
  /// Focus on the character detail pane.
  CharacterDetail,
}

/// What printable keys currently do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
  Normal,
  /// Typing into the search box.
  Search,
  /// Choosing a value for one filter.
  Picker(FilterKind),
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  pub catalog: Catalog<HttpSource>,

  pub screen: Screen,

  pub input: Input,

  /// Search text as typed; mirrored into the catalog on every keystroke.
  pub search_draft: String,

  /// Cursor within the visible records.
  pub list_cursor: usize,

  /// Cursor within the open filter picker.
  pub picker_cursor: usize,

  /// Scroll offset within the detail pane.
  pub detail_scroll: usize,

  /// One-line status message shown in the status bar.
  pub status_msg: String,
}

impl App {
  pub fn new(catalog: Catalog<HttpSource>) -> Self {
    Self {
      catalog,
      screen: Screen::CharacterList,
      input: Input::Normal,
      search_draft: String::new(),
      list_cursor: 0,
      picker_cursor: 0,
      detail_scroll: 0,
      status_msg: String::new(),
    }
  }

  /// Apply pending catalog events and keep the cursor in range.
  pub fn sync(&mut self) {
    if self.catalog.pump() > 0 && !self.catalog.is_busy() {
      self.status_msg.clear();
    }
    self.clamp_cursor();
  }

  fn visible(&self) -> Vec<EnrichedPerson> {
    self.catalog.snapshot().visible_records
  }

  fn clamp_cursor(&mut self) {
    let len = self.visible().len();
    self.list_cursor = self.list_cursor.min(len.saturating_sub(1));
  }

  /// The record under the list cursor, if any.
  pub fn cursor_record(&self) -> Option<EnrichedPerson> {
    self.visible().into_iter().nth(self.list_cursor)
  }

  fn picker_options(&self, kind: FilterKind) -> Vec<String> {
    self.catalog.snapshot().filter_options.get(kind).to_vec()
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub fn handle_key(&mut self, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return false;
    }

    match self.input {
      Input::Search => {
        self.handle_search_key(key);
        true
      }
      Input::Picker(kind) => {
        self.handle_picker_key(kind, key);
        true
      }
      Input::Normal => match self.screen {
        Screen::CharacterList => self.handle_list_key(key),
        Screen::CharacterDetail => self.handle_detail_key(key),
      },
    }
  }

  fn handle_search_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.input = Input::Normal;
        self.search_draft.clear();
        self.catalog.clear_search();
      }
      KeyCode::Enter => self.input = Input::Normal,
      KeyCode::Backspace => {
        self.search_draft.pop();
        self.catalog.set_search(self.search_draft.clone());
      }
      KeyCode::Char(c) => {
        self.search_draft.push(c);
        self.catalog.set_search(self.search_draft.clone());
      }
      _ => return,
    }
    self.list_cursor = 0;
  }

  fn handle_picker_key(&mut self, kind: FilterKind, key: KeyEvent) {
    let options = self.picker_options(kind);
    match key.code {
      KeyCode::Esc | KeyCode::Char('q') => self.input = Input::Normal,
      KeyCode::Down | KeyCode::Char('j') => {
        if self.picker_cursor + 1 < options.len() {
          self.picker_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.picker_cursor = self.picker_cursor.saturating_sub(1);
      }
      KeyCode::Enter => {
        if let Some(value) = options.get(self.picker_cursor) {
          self.catalog.set_filter(kind, value.clone());
          self.list_cursor = 0;
        }
        self.input = Input::Normal;
      }
      KeyCode::Backspace | KeyCode::Char('x') => {
        self.catalog.set_filter(kind, "");
        self.list_cursor = 0;
        self.input = Input::Normal;
      }
      _ => {}
    }
  }

  fn open_picker(&mut self, kind: FilterKind) {
    let options = self.picker_options(kind);
    if options.is_empty() {
      self.status_msg = format!("No {kind} options yet");
      return;
    }
    let current = self.catalog.state().filters().get(kind);
    self.picker_cursor = current
      .and_then(|v| options.iter().position(|o| o == v))
      .unwrap_or(0);
    self.input = Input::Picker(kind);
  }

  fn handle_list_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,

      // Navigation
      KeyCode::Down | KeyCode::Char('j') => {
        if self.list_cursor + 1 < self.visible().len() {
          self.list_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.list_cursor = self.list_cursor.saturating_sub(1);
      }

      // Pages
      KeyCode::Right | KeyCode::Char('n') | KeyCode::Char(']') => {
        self.catalog.next_page();
        self.list_cursor = 0;
      }
      KeyCode::Left | KeyCode::Char('p') | KeyCode::Char('[') => {
        self.catalog.previous_page();
        self.list_cursor = 0;
      }

      KeyCode::Enter | KeyCode::Char('l') => self.open_detail(),

      // Search and filters
      KeyCode::Char('/') => {
        self.search_draft = self.catalog.state().search().to_owned();
        self.input = Input::Search;
      }
      KeyCode::Char('h') => self.open_picker(FilterKind::Homeworld),
      KeyCode::Char('s') => self.open_picker(FilterKind::Species),
      KeyCode::Char('f') => self.open_picker(FilterKind::Film),
      KeyCode::Char('x') => {
        self.catalog.clear_filters();
        self.list_cursor = 0;
      }
      KeyCode::Char('c') => {
        self.search_draft.clear();
        self.catalog.clear_all();
        self.list_cursor = 0;
      }

      KeyCode::Char('r') => {
        if self.catalog.snapshot().error.is_some() {
          self.status_msg = "Retrying…".into();
          self.catalog.retry();
        }
      }

      _ => {}
    }
    true
  }

  fn handle_detail_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,

      KeyCode::Esc | KeyCode::Backspace | KeyCode::Left | KeyCode::Char('h') => {
        self.catalog.close_detail();
        self.screen = Screen::CharacterList;
      }

      KeyCode::Down | KeyCode::Char('j') => {
        if self.detail_scroll + 1 < self.detail_len() {
          self.detail_scroll += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.detail_scroll = self.detail_scroll.saturating_sub(1);
      }

      // Step through the list without leaving the detail.
      KeyCode::Char(']') | KeyCode::PageDown => {
        if self.list_cursor + 1 < self.visible().len() {
          self.list_cursor += 1;
          self.open_detail();
        }
      }
      KeyCode::Char('[') | KeyCode::PageUp => {
        if self.list_cursor > 0 {
          self.list_cursor -= 1;
          self.open_detail();
        }
      }

      _ => {}
    }
    true
  }

  /// Rows in the detail pane for the selected record.
  fn detail_len(&self) -> usize {
    self
      .catalog
      .snapshot()
      .selected_record
      .map_or(0, |record| character_detail::lines(&record).len())
  }

  fn open_detail(&mut self) {
    if let Some(record) = self.cursor_record() {
      self.catalog.select_record(record.url());
      self.detail_scroll = 0;
      self.screen = Screen::CharacterDetail;
    }
  }
}

#[cfg(test)]
mod tests {
  use crossterm::event::KeyEvent;
  use holocron_client::SourceConfig;
  use holocron_core::query::QueryMode;

  use super::*;

  fn app() -> App {
    let source = HttpSource::new(SourceConfig {
      base_url: "http://127.0.0.1:9/api".into(),
      ..SourceConfig::default()
    })
    .unwrap();
    // Global mode intents never touch the network until `start`.
    App::new(Catalog::new(source.into(), QueryMode::Global))
  }

  fn press(app: &mut App, code: KeyCode) -> bool {
    app.handle_key(KeyEvent::from(code))
  }

  #[tokio::test]
  async fn quit_keys() {
    let mut a = app();
    assert!(!press(&mut a, KeyCode::Char('q')));
    assert!(!a.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
  }

  #[tokio::test]
  async fn typing_updates_search_live() {
    let mut a = app();
    press(&mut a, KeyCode::Char('/'));
    assert_eq!(a.input, Input::Search);
    for c in "sky".chars() {
      press(&mut a, KeyCode::Char(c));
    }
    assert_eq!(a.catalog.state().search(), "sky");
    press(&mut a, KeyCode::Backspace);
    assert_eq!(a.catalog.state().search(), "sk");

    // 'q' is text while searching.
    assert!(press(&mut a, KeyCode::Char('q')));
    assert_eq!(a.catalog.state().search(), "skq");

    press(&mut a, KeyCode::Enter);
    assert_eq!(a.input, Input::Normal);
    assert_eq!(a.catalog.state().search(), "skq");
  }

  #[tokio::test]
  async fn escape_clears_search() {
    let mut a = app();
    press(&mut a, KeyCode::Char('/'));
    press(&mut a, KeyCode::Char('r'));
    press(&mut a, KeyCode::Esc);
    assert_eq!(a.input, Input::Normal);
    assert_eq!(a.catalog.state().search(), "");
    assert!(a.search_draft.is_empty());
  }

  #[tokio::test]
  async fn picker_needs_options() {
    let mut a = app();
    press(&mut a, KeyCode::Char('s'));
    assert_eq!(a.input, Input::Normal);
    assert_eq!(a.status_msg, "No species options yet");
  }

  #[tokio::test]
  async fn detail_scroll_is_bounded() {
    let mut a = app();
    a.screen = Screen::CharacterDetail;
    for _ in 0..5 {
      press(&mut a, KeyCode::Char('j'));
    }
    // Nothing selected, so there is nothing to scroll.
    assert_eq!(a.detail_scroll, 0);
    press(&mut a, KeyCode::Char('k'));
    assert_eq!(a.detail_scroll, 0);
  }

  #[tokio::test]
  async fn enter_on_empty_list_stays_on_list() {
    let mut a = app();
    press(&mut a, KeyCode::Enter);
    assert_eq!(a.screen, Screen::CharacterList);
    assert!(a.catalog.state().selected().is_none());
  }
}
