//! Client-side query engine: search, filters, and pagination over enriched
//! records.
//!
//! Everything here is pure. [`QueryState`] is an immutable value: each
//! transition returns a new state, and the caller holding the current state
//! swaps it out wholesale.

use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter};

use crate::{
  enriched::EnrichedPerson,
  paging::{page_offset, total_pages},
  person::PAGE_SIZE,
};

// ─── Filters ─────────────────────────────────────────────────────────────────

/// The three equality filters.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Display,
  AsRefStr,
  EnumIter,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FilterKind {
  Homeworld,
  Species,
  Film,
}

/// The active filter selection. `None` means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
  pub homeworld: Option<String>,
  pub species:   Option<String>,
  pub film:      Option<String>,
}

impl Filters {
  pub fn get(&self, kind: FilterKind) -> Option<&str> {
    match kind {
      FilterKind::Homeworld => self.homeworld.as_deref(),
      FilterKind::Species => self.species.as_deref(),
      FilterKind::Film => self.film.as_deref(),
    }
  }

  fn slot(&mut self, kind: FilterKind) -> &mut Option<String> {
    match kind {
      FilterKind::Homeworld => &mut self.homeworld,
      FilterKind::Species => &mut self.species,
      FilterKind::Film => &mut self.film,
    }
  }

  pub fn is_empty(&self) -> bool { self.active_count() == 0 }

  pub fn active_count(&self) -> usize {
    [&self.homeworld, &self.species, &self.film]
      .into_iter()
      .filter(|f| f.is_some())
      .count()
  }
}

// ─── State ───────────────────────────────────────────────────────────────────

/// What the user has asked to see.
///
/// Starts at page 1 with no search, no filters, and nothing selected.
/// Changing the search or any filter always returns to page 1; changing the
/// page or the selection never touches search or filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryState {
  page:     usize,
  search:   String,
  filters:  Filters,
  /// URL of the record open in the detail view.
  selected: Option<String>,
}

impl Default for QueryState {
  fn default() -> Self {
    Self {
      page:     1,
      search:   String::new(),
      filters:  Filters::default(),
      selected: None,
    }
  }
}

impl QueryState {
  pub fn page(&self) -> usize { self.page }

  pub fn search(&self) -> &str { &self.search }

  pub fn filters(&self) -> &Filters { &self.filters }

  pub fn selected(&self) -> Option<&str> { self.selected.as_deref() }

  /// Whether a search or any filter is narrowing the results.
  pub fn is_filtered(&self) -> bool {
    !self.search.is_empty() || !self.filters.is_empty()
  }

  /// Move to `page` (1-based; 0 is treated as 1).
  pub fn with_page(&self, page: usize) -> Self {
    Self {
      page: page.max(1),
      ..self.clone()
    }
  }

  pub fn with_search(&self, search: impl Into<String>) -> Self {
    Self {
      page: 1,
      search: search.into(),
      ..self.clone()
    }
  }

  pub fn cleared_search(&self) -> Self { self.with_search(String::new()) }

  /// Set one filter. An empty value clears it.
  pub fn with_filter(&self, kind: FilterKind, value: impl Into<String>) -> Self {
    let value = value.into();
    let mut next = Self {
      page: 1,
      ..self.clone()
    };
    *next.filters.slot(kind) = (!value.is_empty()).then_some(value);
    next
  }

  pub fn cleared_filters(&self) -> Self {
    Self {
      page: 1,
      filters: Filters::default(),
      ..self.clone()
    }
  }

  /// Clear the search and every filter.
  pub fn cleared_all(&self) -> Self {
    self.cleared_filters().cleared_search()
  }

  pub fn with_selection(&self, url: impl Into<String>) -> Self {
    Self {
      selected: Some(url.into()),
      ..self.clone()
    }
  }

  pub fn without_selection(&self) -> Self {
    Self {
      selected: None,
      ..self.clone()
    }
  }
}

// ─── Filter options ──────────────────────────────────────────────────────────

/// Distinct values offered by each filter, sorted ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
  pub homeworlds: Vec<String>,
  pub species:    Vec<String>,
  pub films:      Vec<String>,
}

impl FilterOptions {
  /// Collect the options from a fully enriched set. Pending records and
  /// empty values contribute nothing.
  pub fn extract(records: &[EnrichedPerson]) -> Self {
    let mut homeworlds = BTreeSet::new();
    let mut species = BTreeSet::new();
    let mut films = BTreeSet::new();

    for record in records.iter().filter(|r| !r.is_pending()) {
      if !record.homeworld_name.is_empty() {
        homeworlds.insert(record.homeworld_name.as_str());
      }
      if !record.species_name.is_empty() {
        species.insert(record.species_name.as_str());
      }
      films.extend(
        record
          .film_titles
          .iter()
          .map(String::as_str)
          .filter(|t| !t.is_empty()),
      );
    }

    let owned = |set: BTreeSet<&str>| -> Vec<String> {
      set.into_iter().map(str::to_owned).collect()
    };
    Self {
      homeworlds: owned(homeworlds),
      species:    owned(species),
      films:      owned(films),
    }
  }

  pub fn get(&self, kind: FilterKind) -> &[String] {
    match kind {
      FilterKind::Homeworld => &self.homeworlds,
      FilterKind::Species => &self.species,
      FilterKind::Film => &self.films,
    }
  }

  pub fn is_empty(&self) -> bool {
    self.homeworlds.is_empty() && self.species.is_empty() && self.films.is_empty()
  }
}

// ─── Pipeline ────────────────────────────────────────────────────────────────

/// Which set the query runs over.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum QueryMode {
  /// Search and filters cover the full enriched set fetched up front, and
  /// pagination slices the filtered result.
  #[default]
  Global,
  /// Search and filters cover only the current upstream page; pagination
  /// follows the upstream page count.
  PageLocal,
}

/// Case-insensitive substring match on the name. Empty search matches all.
pub fn matches_search(record: &EnrichedPerson, search: &str) -> bool {
  search.is_empty()
    || record
      .name()
      .to_lowercase()
      .contains(&search.to_lowercase())
}

/// Whether `record` satisfies the single filter `kind`.
pub fn matches_filter(
  record: &EnrichedPerson,
  kind: FilterKind,
  filters: &Filters,
) -> bool {
  let Some(wanted) = filters.get(kind) else {
    return true;
  };
  match kind {
    FilterKind::Homeworld => record.homeworld_name == wanted,
    FilterKind::Species => record.species_name == wanted,
    FilterKind::Film => record.film_titles.iter().any(|t| t == wanted),
  }
}

/// Search, then homeworld, species and film filters, in that order.
pub fn filter_records<'a>(
  records: &'a [EnrichedPerson],
  state: &QueryState,
) -> Vec<&'a EnrichedPerson> {
  let filters = state.filters();
  records
    .iter()
    .filter(|r| matches_search(r, state.search()))
    .filter(|r| matches_filter(r, FilterKind::Homeworld, filters))
    .filter(|r| matches_filter(r, FilterKind::Species, filters))
    .filter(|r| matches_filter(r, FilterKind::Film, filters))
    .collect()
}

/// The results summary line shown above the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum ResultsSummary {
  Global { matched: usize, total: usize },
  PageLocal { matched: usize },
}

impl ResultsSummary {
  /// Extra note shown when the filters only see part of the data.
  pub fn caveat(&self) -> Option<&'static str> {
    match self {
      Self::Global { .. } => None,
      Self::PageLocal { .. } => {
        Some("Search and filters apply to the current page only")
      }
    }
  }
}

impl fmt::Display for ResultsSummary {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Global { matched, total } => {
        write!(f, "Showing {matched} of {total} total characters")
      }
      Self::PageLocal { matched } => {
        let noun = if *matched == 1 { "result" } else { "results" };
        write!(f, "{matched} {noun} on this page")
      }
    }
  }
}

/// The result of one pass of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOutput {
  pub visible:        Vec<EnrichedPerson>,
  pub filtered_count: usize,
  pub total_pages:    usize,
  pub current_page:   usize,
  pub summary:        ResultsSummary,
}

/// Runs the query pipeline in a fixed mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryEngine {
  mode: QueryMode,
}

impl QueryEngine {
  pub fn new(mode: QueryMode) -> Self { Self { mode } }

  pub fn mode(&self) -> QueryMode { self.mode }

  /// Filter and paginate `records` according to `state`.
  ///
  /// In global mode `records` is the full set and the filtered result is
  /// sliced to the current page. In page-local mode `records` is one
  /// upstream page, nothing is sliced, and `upstream_count` (the upstream
  /// total) drives the page count. Global mode ignores `upstream_count`.
  pub fn run(
    &self,
    records: &[EnrichedPerson],
    state: &QueryState,
    upstream_count: usize,
  ) -> QueryOutput {
    let filtered = filter_records(records, state);
    let filtered_count = filtered.len();

    match self.mode {
      QueryMode::Global => {
        let visible = filtered
          .into_iter()
          .skip(page_offset(state.page()))
          .take(PAGE_SIZE)
          .cloned()
          .collect();
        QueryOutput {
          visible,
          filtered_count,
          total_pages: total_pages(filtered_count),
          current_page: state.page(),
          summary: ResultsSummary::Global {
            matched: filtered_count,
            total:   records.len(),
          },
        }
      }
      QueryMode::PageLocal => QueryOutput {
        visible: filtered.into_iter().cloned().collect(),
        filtered_count,
        total_pages: total_pages(upstream_count),
        current_page: state.page(),
        summary: ResultsSummary::PageLocal {
          matched: filtered_count,
        },
      },
    }
  }
}

#[cfg(test)]
mod tests {
  use crate::{
    enriched::{EnrichedPerson, EnrichmentStatus},
    person::Person,
  };

  use super::*;

  fn record(
    name: &str,
    homeworld: &str,
    species: &str,
    films: &[&str],
  ) -> EnrichedPerson {
    let slug = name.to_lowercase().replace(' ', "-");
    EnrichedPerson {
      person:         Person {
        name:       name.into(),
        height:     String::new(),
        mass:       String::new(),
        hair_color: String::new(),
        skin_color: String::new(),
        eye_color:  String::new(),
        birth_year: String::new(),
        gender:     String::new(),
        homeworld:  None,
        species:    vec![],
        films:      vec![],
        created:    String::new(),
        edited:     String::new(),
        url:        format!("https://swapi.dev/api/people/{slug}/"),
      },
      homeworld_name: homeworld.into(),
      species_name:   species.into(),
      film_titles:    films.iter().map(|f| f.to_string()).collect(),
      homeworld:      None,
      species:        None,
      status:         EnrichmentStatus::Settled,
    }
  }

  fn luke_and_threepio() -> Vec<EnrichedPerson> {
    vec![
      record("Luke Skywalker", "Tatooine", "Human", &["A New Hope"]),
      record("C-3PO", "Tatooine", "Droid", &["A New Hope"]),
    ]
  }

  fn names(output: &QueryOutput) -> Vec<&str> {
    output.visible.iter().map(|r| r.name()).collect()
  }

  /// 25 records across three homeworlds and two species.
  fn roster() -> Vec<EnrichedPerson> {
    (0..25)
      .map(|i| {
        let homeworld = ["Tatooine", "Naboo", "Alderaan"][i % 3];
        let species = if i % 2 == 0 { "Human" } else { "Droid" };
        let films: &[&str] = if i % 5 == 0 {
          &["A New Hope", "Return of the Jedi"]
        } else {
          &["The Phantom Menace"]
        };
        record(&format!("Unit {i:02}"), homeworld, species, films)
      })
      .collect()
  }

  // ── Examples ────────────────────────────────────────────────────────────

  #[test]
  fn species_filter_keeps_droid() {
    let records = luke_and_threepio();
    let state = QueryState::default().with_filter(FilterKind::Species, "Droid");
    let out = QueryEngine::new(QueryMode::Global).run(&records, &state, 0);
    assert_eq!(names(&out), vec!["C-3PO"]);
  }

  #[test]
  fn search_is_case_insensitive_substring() {
    let records = luke_and_threepio();
    let state = QueryState::default().with_search("sky");
    let out = QueryEngine::new(QueryMode::Global).run(&records, &state, 0);
    assert_eq!(names(&out), vec!["Luke Skywalker"]);

    let state = QueryState::default().with_search("SKY");
    let out = QueryEngine::new(QueryMode::Global).run(&records, &state, 0);
    assert_eq!(names(&out), vec!["Luke Skywalker"]);
  }

  // ── Search ──────────────────────────────────────────────────────────────

  #[test]
  fn empty_search_is_identity() {
    let records = roster();
    let filtered = filter_records(&records, &QueryState::default());
    assert_eq!(filtered.len(), records.len());
    assert!(filtered.iter().zip(&records).all(|(a, b)| *a == b));
  }

  #[test]
  fn every_search_hit_contains_query() {
    let records = roster();
    for query in ["unit", "1", "UNIT 2", "nope", "t 0"] {
      let state = QueryState::default().with_search(query);
      let filtered = filter_records(&records, &state);
      assert!(
        filtered
          .iter()
          .all(|r| r.name().to_lowercase().contains(&query.to_lowercase()))
      );
    }
    let state = QueryState::default().with_search("nope");
    assert!(filter_records(&records, &state).is_empty());
  }

  // ── Filters ─────────────────────────────────────────────────────────────

  #[test]
  fn filters_conjoin() {
    let records = roster();
    let state = QueryState::default()
      .with_filter(FilterKind::Homeworld, "Naboo")
      .with_filter(FilterKind::Species, "Droid")
      .with_filter(FilterKind::Film, "The Phantom Menace");

    let filtered = filter_records(&records, &state);
    let expected: Vec<_> = records
      .iter()
      .filter(|r| {
        r.homeworld_name == "Naboo"
          && r.species_name == "Droid"
          && r.film_titles.iter().any(|t| t == "The Phantom Menace")
      })
      .collect();
    assert!(!expected.is_empty());
    assert_eq!(filtered, expected);
  }

  #[test]
  fn film_filter_is_membership() {
    let records = roster();
    let state =
      QueryState::default().with_filter(FilterKind::Film, "Return of the Jedi");
    let filtered = filter_records(&records, &state);
    assert_eq!(filtered.len(), 5);
    assert!(filtered.iter().all(|r| r.film_titles.len() == 2));
  }

  #[test]
  fn empty_filter_value_clears_it() {
    let state = QueryState::default()
      .with_filter(FilterKind::Homeworld, "Naboo")
      .with_filter(FilterKind::Homeworld, "");
    assert!(state.filters().is_empty());
  }

  // ── Pagination ──────────────────────────────────────────────────────────

  #[test]
  fn global_pages_slice_filtered_set() {
    let records = roster();
    let engine = QueryEngine::new(QueryMode::Global);

    let first = engine.run(&records, &QueryState::default(), 0);
    assert_eq!(first.visible.len(), PAGE_SIZE);
    assert_eq!(first.total_pages, 3);
    assert_eq!(first.visible[0].name(), "Unit 00");

    let last = engine.run(&records, &QueryState::default().with_page(3), 0);
    assert_eq!(last.visible.len(), 5);
    assert_eq!(last.visible[0].name(), "Unit 20");
    assert_eq!(last.current_page, 3);
  }

  #[test]
  fn total_pages_tracks_filtered_count() {
    let records = roster();
    let engine = QueryEngine::new(QueryMode::Global);
    for (kind, value) in [
      (FilterKind::Homeworld, "Tatooine"),
      (FilterKind::Species, "Droid"),
      (FilterKind::Film, "A New Hope"),
      (FilterKind::Film, "Empire Strikes Back"),
    ] {
      let state = QueryState::default().with_filter(kind, value);
      let out = engine.run(&records, &state, 0);
      assert_eq!(out.total_pages, out.filtered_count.div_ceil(PAGE_SIZE));
    }

    let out = engine.run(&records, &QueryState::default().with_search("zzz"), 0);
    assert_eq!(out.filtered_count, 0);
    assert_eq!(out.total_pages, 0);
    assert!(out.visible.is_empty());
  }

  #[test]
  fn page_local_uses_upstream_count() {
    let records: Vec<_> = roster().into_iter().take(PAGE_SIZE).collect();
    let engine = QueryEngine::new(QueryMode::PageLocal);
    let state = QueryState::default()
      .with_filter(FilterKind::Species, "Human")
      .with_page(4);

    let out = engine.run(&records, &state, 82);
    assert_eq!(out.filtered_count, 5);
    assert_eq!(out.visible.len(), 5);
    assert_eq!(out.total_pages, 9);
    assert_eq!(out.current_page, 4);
    assert_eq!(out.summary, ResultsSummary::PageLocal { matched: 5 });
  }

  #[test]
  fn query_is_idempotent() {
    let records = roster();
    let engine = QueryEngine::new(QueryMode::Global);
    let state = QueryState::default()
      .with_search("unit")
      .with_filter(FilterKind::Species, "Human")
      .with_page(2);
    let before = records.clone();

    let a = engine.run(&records, &state, 0);
    let b = engine.run(&records, &state, 0);
    assert_eq!(a, b);
    assert_eq!(records, before);
  }

  // ── State transitions ───────────────────────────────────────────────────

  #[test]
  fn search_and_filter_reset_page() {
    let state = QueryState::default().with_page(4);
    assert_eq!(state.with_search("luke").page(), 1);
    assert_eq!(state.cleared_search().page(), 1);
    assert_eq!(state.with_filter(FilterKind::Film, "A New Hope").page(), 1);
    assert_eq!(state.cleared_filters().page(), 1);
  }

  #[test]
  fn page_change_keeps_search_and_filters() {
    let state = QueryState::default()
      .with_search("luke")
      .with_filter(FilterKind::Homeworld, "Tatooine");
    let moved = state.with_page(3);
    assert_eq!(moved.page(), 3);
    assert_eq!(moved.search(), "luke");
    assert_eq!(moved.filters(), state.filters());
  }

  #[test]
  fn clearing_filters_keeps_search() {
    let state = QueryState::default()
      .with_search("luke")
      .with_filter(FilterKind::Species, "Human")
      .with_filter(FilterKind::Film, "A New Hope")
      .with_page(2);
    let cleared = state.cleared_filters();
    assert!(cleared.filters().is_empty());
    assert_eq!(cleared.search(), "luke");
    assert_eq!(cleared.page(), 1);

    let all = state.cleared_all();
    assert!(!all.is_filtered());
  }

  #[test]
  fn selection_leaves_query_alone() {
    let state = QueryState::default()
      .with_search("r2")
      .with_page(2);
    let selected = state.with_selection("https://swapi.dev/api/people/3/");
    assert_eq!(selected.page(), 2);
    assert_eq!(selected.search(), "r2");
    assert_eq!(selected.selected(), Some("https://swapi.dev/api/people/3/"));
    assert_eq!(selected.without_selection(), state);
  }

  #[test]
  fn transitions_do_not_mutate_source_state() {
    let state = QueryState::default();
    let _ = state.with_search("x").with_page(7);
    assert_eq!(state, QueryState::default());
    assert_eq!(state.page(), 1);
  }

  // ── Options & summary ───────────────────────────────────────────────────

  #[test]
  fn options_are_distinct_and_sorted() {
    let records = roster();
    let options = FilterOptions::extract(&records);
    assert_eq!(options.homeworlds, vec!["Alderaan", "Naboo", "Tatooine"]);
    assert_eq!(options.species, vec!["Droid", "Human"]);
    assert_eq!(options.films, vec![
      "A New Hope",
      "Return of the Jedi",
      "The Phantom Menace"
    ]);
    assert_eq!(options.get(FilterKind::Species), &options.species[..]);
  }

  #[test]
  fn options_skip_pending_records() {
    let mut records = luke_and_threepio();
    records[1] = EnrichedPerson::placeholder(records[1].person.clone());
    let options = FilterOptions::extract(&records);
    assert_eq!(options.species, vec!["Human"]);
  }

  #[test]
  fn summaries_render() {
    let global = ResultsSummary::Global {
      matched: 3,
      total:   82,
    };
    assert_eq!(global.to_string(), "Showing 3 of 82 total characters");
    assert_eq!(global.caveat(), None);

    let local = ResultsSummary::PageLocal { matched: 1 };
    assert_eq!(local.to_string(), "1 result on this page");
    assert!(local.caveat().is_some());
  }

  #[test]
  fn mode_names() {
    assert_eq!(QueryMode::PageLocal.to_string(), "page-local");
    assert_eq!(FilterKind::Homeworld.to_string(), "homeworld");
  }
}
