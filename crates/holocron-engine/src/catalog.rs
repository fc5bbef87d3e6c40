//! The catalog controller: the engine behind the view.
//!
//! A [`Catalog`] owns the only [`QueryState`] slot and the records the query
//! runs over. Loads run as tokio tasks that report back through an event
//! channel; the view drains that channel with [`Catalog::pump`] (or awaits it
//! with [`Catalog::next_event`]) and renders [`Catalog::snapshot`].
//!
//! Every primary load gets a new generation and a new cancellation token.
//! Starting a load cancels the previous one, and events carrying an older
//! generation are discarded on arrival, so a slow response for a page the
//! user has left can never overwrite the page on screen.

use std::sync::Arc;

use holocron_core::{
  enriched::EnrichedPerson,
  error::FetchError,
  paging::{has_next, has_previous},
  person::PeoplePage,
  query::{
    FilterKind, FilterOptions, Filters, QueryEngine, QueryMode, QueryOutput,
    QueryState, ResultsSummary,
  },
  source::Source,
};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
  enrich::{Enricher, Progress},
  error::PrimaryFetchError,
};

// ─── Events ───────────────────────────────────────────────────────────────────

/// Results reported by background loads.
#[derive(Debug)]
pub enum CatalogEvent {
  /// Global mode: the full enriched set.
  CatalogLoaded {
    generation: u64,
    result:     Result<Vec<EnrichedPerson>, FetchError>,
  },
  /// Page-local mode: the full enriched set, used for filter options only.
  OptionsLoaded {
    result: Result<Vec<EnrichedPerson>, FetchError>,
  },
  /// Page-local mode: one upstream page, not yet enriched.
  PageLoaded {
    generation: u64,
    page:       usize,
    result:     Result<PeoplePage, FetchError>,
  },
  /// Page-local mode: one record of the current page has settled.
  RecordSettled {
    generation: u64,
    record:     EnrichedPerson,
  },
  /// Page-local mode: every record of the page has settled.
  EnrichmentFinished { generation: u64 },
}

// ─── Snapshot ─────────────────────────────────────────────────────────────────

/// What the results area should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
  /// The primary fetch is in flight, or the page is still enriching and
  /// nothing matches yet.
  Loading,
  /// The primary fetch failed; offer a retry.
  Failed,
  /// Nothing to show. `filtered` is true when a search or filter is active,
  /// in which case the view offers to clear them.
  Empty { filtered: bool },
  Ready,
}

/// A read-only view of the catalog for one render.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
  pub mode:                  QueryMode,
  pub view:                  ViewState,
  pub visible_records:       Vec<EnrichedPerson>,
  pub filtered_count:        usize,
  pub total_pages:           usize,
  pub current_page:          usize,
  pub has_previous:          bool,
  pub has_next:              bool,
  pub summary:               ResultsSummary,
  pub filter_options:        FilterOptions,
  pub search_query:          String,
  pub active_filters:        Filters,
  pub selected_record:       Option<EnrichedPerson>,
  pub is_loading_primary:    bool,
  pub is_loading_enrichment: bool,
  pub is_loading_options:    bool,
  pub error:                 Option<PrimaryFetchError>,
}

// ─── Catalog ──────────────────────────────────────────────────────────────────

/// Query state, loaded records, and the background loads that feed them.
///
/// Must be used from within a tokio runtime: intents spawn tasks.
pub struct Catalog<S: Source + 'static> {
  enricher:           Enricher<S>,
  engine:             QueryEngine,
  state:              QueryState,
  /// Global mode: the full set. Page-local mode: the current upstream page.
  records:            Vec<EnrichedPerson>,
  /// Upstream total, as reported by the last people page.
  upstream_count:     usize,
  options:            FilterOptions,
  loading_primary:    bool,
  loading_enrichment: bool,
  loading_options:    bool,
  error:              Option<PrimaryFetchError>,
  generation:         u64,
  /// Page-local mode: the upstream page the latest load asked for.
  requested_page:     Option<usize>,
  /// Parent of every task token; cancelled when the catalog is dropped.
  shutdown:           CancellationToken,
  /// Token of the current primary load.
  load_token:         CancellationToken,
  events_tx:          UnboundedSender<CatalogEvent>,
  events_rx:          UnboundedReceiver<CatalogEvent>,
}

impl<S: Source + 'static> Catalog<S> {
  pub fn new(source: Arc<S>, mode: QueryMode) -> Self {
    Self::with_enricher(Enricher::new(source), mode)
  }

  pub fn with_enricher(enricher: Enricher<S>, mode: QueryMode) -> Self {
    let (events_tx, events_rx) = unbounded_channel();
    let shutdown = CancellationToken::new();
    Self {
      enricher,
      engine: QueryEngine::new(mode),
      state: QueryState::default(),
      records: Vec::new(),
      upstream_count: 0,
      options: FilterOptions::default(),
      loading_primary: false,
      loading_enrichment: false,
      loading_options: false,
      error: None,
      generation: 0,
      requested_page: None,
      load_token: shutdown.child_token(),
      shutdown,
      events_tx,
      events_rx,
    }
  }

  pub fn mode(&self) -> QueryMode { self.engine.mode() }

  pub fn state(&self) -> &QueryState { &self.state }

  pub fn enricher(&self) -> &Enricher<S> { &self.enricher }

  /// Whether any load is still outstanding.
  pub fn is_busy(&self) -> bool {
    self.loading_primary || self.loading_enrichment || self.loading_options
  }

  /// Issue the initial loads.
  pub fn start(&mut self) {
    match self.mode() {
      QueryMode::Global => self.load_catalog(),
      QueryMode::PageLocal => {
        self.load_page(self.state.page());
        self.load_options();
      }
    }
  }

  // ── Intents ───────────────────────────────────────────────────────────────

  /// Go to `page`, clamped to the known page range.
  pub fn set_page(&mut self, page: usize) {
    let total = self.query().total_pages;
    let page = if total > 0 { page.clamp(1, total) } else { 1 };
    self.replace_state(self.state.with_page(page));
  }

  pub fn next_page(&mut self) { self.set_page(self.state.page() + 1); }

  pub fn previous_page(&mut self) {
    self.set_page(self.state.page().saturating_sub(1));
  }

  pub fn set_search(&mut self, search: impl Into<String>) {
    self.replace_state(self.state.with_search(search));
  }

  pub fn clear_search(&mut self) {
    self.replace_state(self.state.cleared_search());
  }

  /// Set one filter; an empty value clears it.
  pub fn set_filter(&mut self, kind: FilterKind, value: impl Into<String>) {
    self.replace_state(self.state.with_filter(kind, value));
  }

  pub fn clear_filters(&mut self) {
    self.replace_state(self.state.cleared_filters());
  }

  /// Clear search and filters together (the "no results" action).
  pub fn clear_all(&mut self) {
    self.replace_state(self.state.cleared_all());
  }

  pub fn select_record(&mut self, url: impl Into<String>) {
    self.replace_state(self.state.with_selection(url));
  }

  pub fn close_detail(&mut self) {
    self.replace_state(self.state.without_selection());
  }

  /// Re-issue the failed primary load for the current state.
  pub fn retry(&mut self) {
    info!(mode = %self.mode(), page = self.state.page(), "retrying");
    match self.mode() {
      QueryMode::Global => self.load_catalog(),
      QueryMode::PageLocal => {
        self.load_page(self.state.page());
        if self.options.is_empty() && !self.loading_options {
          self.load_options();
        }
      }
    }
  }

  fn replace_state(&mut self, next: QueryState) {
    self.state = next;
    if self.mode() == QueryMode::PageLocal
      && self.requested_page != Some(self.state.page())
    {
      self.load_page(self.state.page());
    }
  }

  // ── Loads ─────────────────────────────────────────────────────────────────

  /// Cancel the current primary load and begin a new generation.
  fn begin_load(&mut self) -> (u64, CancellationToken) {
    self.load_token.cancel();
    self.load_token = self.shutdown.child_token();
    self.generation += 1;
    self.loading_primary = true;
    self.loading_enrichment = false;
    self.error = None;
    (self.generation, self.load_token.clone())
  }

  fn load_catalog(&mut self) {
    let (generation, token) = self.begin_load();
    self.loading_options = true;
    info!(generation, "loading full catalog");

    let enricher = self.enricher.clone();
    let tx = self.events_tx.clone();
    tokio::spawn(async move {
      let result = tokio::select! {
        biased;
        _ = token.cancelled() => return,
        result = enricher.load_catalog() => result,
      };
      let _ = tx.send(CatalogEvent::CatalogLoaded { generation, result });
    });
  }

  fn load_page(&mut self, page: usize) {
    let (generation, token) = self.begin_load();
    self.requested_page = Some(page);
    self.records.clear();
    debug!(generation, page, "loading page");

    let enricher = self.enricher.clone();
    let tx = self.events_tx.clone();
    tokio::spawn(async move {
      let upstream_page = u32::try_from(page).unwrap_or(u32::MAX);
      let result = tokio::select! {
        biased;
        _ = token.cancelled() => return,
        result = enricher.source().fetch_people(upstream_page) => result,
      };
      let people = match &result {
        Ok(p) => p.results.clone(),
        Err(_) => Vec::new(),
      };
      let failed = result.is_err();
      if tx
        .send(CatalogEvent::PageLoaded {
          generation,
          page,
          result,
        })
        .is_err()
        || failed
      {
        return;
      }

      let progress = enricher
        .enrich_progressively(people, &token, |record| {
          let _ = tx.send(CatalogEvent::RecordSettled { generation, record });
        })
        .await;
      if progress == Progress::Completed {
        let _ = tx.send(CatalogEvent::EnrichmentFinished { generation });
      }
    });
  }

  fn load_options(&mut self) {
    self.loading_options = true;
    let enricher = self.enricher.clone();
    let tx = self.events_tx.clone();
    let token = self.shutdown.child_token();
    tokio::spawn(async move {
      let result = tokio::select! {
        biased;
        _ = token.cancelled() => return,
        result = enricher.load_catalog() => result,
      };
      let _ = tx.send(CatalogEvent::OptionsLoaded { result });
    });
  }

  // ── Events ────────────────────────────────────────────────────────────────

  /// Apply every event that is ready, without waiting. Returns how many
  /// were applied.
  pub fn pump(&mut self) -> usize {
    let mut applied = 0;
    while let Ok(event) = self.events_rx.try_recv() {
      self.apply(event);
      applied += 1;
    }
    applied
  }

  /// Wait for the next event and apply it.
  pub async fn next_event(&mut self) {
    if let Some(event) = self.events_rx.recv().await {
      self.apply(event);
    }
  }

  /// Apply events until no load is outstanding.
  pub async fn settle(&mut self) {
    while self.is_busy() {
      self.next_event().await;
    }
  }

  /// Fold one event into the catalog. Events from a superseded load are
  /// ignored.
  pub fn apply(&mut self, event: CatalogEvent) {
    match event {
      CatalogEvent::CatalogLoaded { generation, result } => {
        if self.is_stale(generation) {
          return;
        }
        self.loading_primary = false;
        self.loading_options = false;
        match result {
          Ok(records) => {
            self.upstream_count = records.len();
            self.options = FilterOptions::extract(&records);
            self.records = records;
          }
          Err(e) => self.fail(e),
        }
      }

      CatalogEvent::OptionsLoaded { result } => {
        self.loading_options = false;
        match result {
          Ok(records) => self.options = FilterOptions::extract(&records),
          Err(e) => warn!(error = %e, "filter options unavailable"),
        }
      }

      CatalogEvent::PageLoaded {
        generation,
        page,
        result,
      } => {
        if self.is_stale(generation) {
          return;
        }
        self.loading_primary = false;
        match result {
          Ok(upstream) => {
            debug!(page, records = upstream.results.len(), "page loaded");
            self.upstream_count = upstream.count;
            self.records = upstream
              .results
              .into_iter()
              .map(EnrichedPerson::placeholder)
              .collect();
            self.loading_enrichment = !self.records.is_empty();
          }
          Err(e) => self.fail(e),
        }
      }

      CatalogEvent::RecordSettled { generation, record } => {
        if self.is_stale(generation) {
          return;
        }
        if let Some(slot) = self.records.iter_mut().find(|r| r.url() == record.url())
        {
          *slot = record;
        }
      }

      CatalogEvent::EnrichmentFinished { generation } => {
        if self.is_stale(generation) {
          return;
        }
        self.loading_enrichment = false;
      }
    }
  }

  fn is_stale(&self, generation: u64) -> bool {
    let stale = generation != self.generation;
    if stale {
      debug!(generation, current = self.generation, "discarding stale event");
    }
    stale
  }

  fn fail(&mut self, error: FetchError) {
    warn!(error = %error, "primary fetch failed");
    self.records.clear();
    self.loading_enrichment = false;
    self.error = Some(error.into());
  }

  // ── Presentation ──────────────────────────────────────────────────────────

  fn query(&self) -> QueryOutput {
    self.engine.run(&self.records, &self.state, self.upstream_count)
  }

  /// The current view of the catalog.
  pub fn snapshot(&self) -> Snapshot {
    let output = self.query();
    // Placeholders cannot match homeworld or species filters, so an empty
    // result while the page is still enriching is not yet "no results".
    let view = if self.loading_primary {
      ViewState::Loading
    } else if self.error.is_some() {
      ViewState::Failed
    } else if output.visible.is_empty() && self.loading_enrichment {
      ViewState::Loading
    } else if output.visible.is_empty() {
      ViewState::Empty {
        filtered: self.state.is_filtered(),
      }
    } else {
      ViewState::Ready
    };
    let selected_record = self
      .state
      .selected()
      .and_then(|url| self.records.iter().find(|r| r.url() == url))
      .cloned();

    Snapshot {
      mode: self.mode(),
      view,
      has_previous: has_previous(output.current_page),
      has_next: has_next(output.current_page, output.total_pages),
      visible_records: output.visible,
      filtered_count: output.filtered_count,
      total_pages: output.total_pages,
      current_page: output.current_page,
      summary: output.summary,
      filter_options: self.options.clone(),
      search_query: self.state.search().to_owned(),
      active_filters: self.state.filters().clone(),
      selected_record,
      is_loading_primary: self.loading_primary,
      is_loading_enrichment: self.loading_enrichment,
      is_loading_options: self.loading_options,
      error: self.error.clone(),
    }
  }
}

impl<S: Source + 'static> Drop for Catalog<S> {
  fn drop(&mut self) { self.shutdown.cancel(); }
}
