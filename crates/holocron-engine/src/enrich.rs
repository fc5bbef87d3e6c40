//! The enrichment join: resolve a person's homeworld, species and films.
//!
//! For each person the three lookup groups run concurrently and are isolated
//! from one another. A failed group falls back to its default and is logged;
//! it never fails its siblings, the record, or the batch.

use std::sync::Arc;

use futures::{
  StreamExt,
  future::{join_all, try_join_all},
  stream::FuturesUnordered,
};
use holocron_core::{
  enriched::{DEFAULT_HOMEWORLD, DEFAULT_SPECIES, EnrichedPerson, EnrichmentStatus},
  entity::{Entity, EntityKind, Film, Planet, Species},
  error::FetchError,
  person::Person,
  source::Source,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::EntityCache;

/// How a progressive enrichment run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
  /// Every record settled and was delivered.
  Completed,
  /// The token was cancelled; undelivered records were dropped.
  Cancelled,
}

/// Joins people with their related entities through a shared cache.
///
/// Cheap to clone; clones share the source and the cache.
pub struct Enricher<S> {
  source: Arc<S>,
  cache:  Arc<EntityCache>,
}

impl<S> Clone for Enricher<S> {
  fn clone(&self) -> Self {
    Self {
      source: Arc::clone(&self.source),
      cache:  Arc::clone(&self.cache),
    }
  }
}

impl<S: Source + 'static> Enricher<S> {
  pub fn new(source: Arc<S>) -> Self {
    Self::with_cache(source, Arc::new(EntityCache::new()))
  }

  pub fn with_cache(source: Arc<S>, cache: Arc<EntityCache>) -> Self {
    Self { source, cache }
  }

  pub fn source(&self) -> &Arc<S> { &self.source }

  pub fn cache(&self) -> &Arc<EntityCache> { &self.cache }

  // ── Lookups ───────────────────────────────────────────────────────────────

  async fn lookup<T>(
    &self,
    kind: EntityKind,
    url: &str,
    narrow: fn(Entity) -> Option<T>,
  ) -> Result<T, FetchError> {
    let entity = self.cache.get_or_fetch(&self.source, kind, url).await?;
    narrow(entity).ok_or_else(|| FetchError::Decode {
      url:   url.to_owned(),
      cause: format!("cached entity is not a {kind}"),
    })
  }

  async fn homeworld(&self, person: &Person) -> Result<Option<Planet>, FetchError> {
    match person.homeworld.as_deref() {
      Some(url) => {
        self
          .lookup(EntityKind::Planet, url, Entity::into_planet)
          .await
          .map(Some)
      }
      None => Ok(None),
    }
  }

  async fn species(&self, person: &Person) -> Result<Option<Species>, FetchError> {
    match person.species.first() {
      Some(url) => {
        self
          .lookup(EntityKind::Species, url, Entity::into_species)
          .await
          .map(Some)
      }
      None => Ok(None),
    }
  }

  /// All films, concurrently, in the order the person lists them.
  async fn films(&self, person: &Person) -> Result<Vec<Film>, FetchError> {
    try_join_all(
      person
        .films
        .iter()
        .map(|url| self.lookup(EntityKind::Film, url, Entity::into_film)),
    )
    .await
  }

  // ── Join ──────────────────────────────────────────────────────────────────

  /// Enrich one person. Never fails: each lookup group that fails is
  /// replaced by its default.
  pub async fn enrich(&self, person: Person) -> EnrichedPerson {
    let (homeworld, species, films) = tokio::join!(
      self.homeworld(&person),
      self.species(&person),
      self.films(&person),
    );

    let homeworld = homeworld.unwrap_or_else(|e| {
      warn!(person = %person.name, error = %e, "homeworld lookup failed");
      None
    });
    let species = species.unwrap_or_else(|e| {
      warn!(person = %person.name, error = %e, "species lookup failed");
      None
    });
    let films = films.unwrap_or_else(|e| {
      warn!(person = %person.name, error = %e, "film lookup failed");
      Vec::new()
    });

    EnrichedPerson {
      homeworld_name: homeworld
        .as_ref()
        .map_or_else(|| DEFAULT_HOMEWORLD.to_owned(), |p| p.name.clone()),
      species_name: species
        .as_ref()
        .map_or_else(|| DEFAULT_SPECIES.to_owned(), |s| s.name.clone()),
      film_titles: films.into_iter().map(|f| f.title).collect(),
      homeworld,
      species,
      person,
      status: EnrichmentStatus::Settled,
    }
  }

  /// Enrich every person concurrently. Output order follows input order.
  pub async fn enrich_all(&self, people: Vec<Person>) -> Vec<EnrichedPerson> {
    join_all(people.into_iter().map(|p| self.enrich(p))).await
  }

  /// Enrich every person concurrently, handing each record to `on_settled`
  /// as soon as it settles.
  ///
  /// Once `token` is cancelled nothing more is delivered and the remaining
  /// lookups are dropped.
  pub async fn enrich_progressively<F>(
    &self,
    people: Vec<Person>,
    token: &CancellationToken,
    mut on_settled: F,
  ) -> Progress
  where
    F: FnMut(EnrichedPerson),
  {
    let mut pending: FuturesUnordered<_> =
      people.into_iter().map(|p| self.enrich(p)).collect();

    loop {
      tokio::select! {
        biased;
        _ = token.cancelled() => {
          debug!(remaining = pending.len(), "enrichment cancelled");
          return Progress::Cancelled;
        }
        next = pending.next() => match next {
          Some(record) => on_settled(record),
          None => return Progress::Completed,
        },
      }
    }
  }

  // ── Primary resource ──────────────────────────────────────────────────────

  /// Walk the people endpoint from page 1 until it reports no next page.
  ///
  /// Pages are fetched one after another since each page's `next` link is
  /// only known once it arrives. Any failed page fails the walk.
  pub async fn fetch_all_people(&self) -> Result<Vec<Person>, FetchError> {
    let mut people = Vec::new();
    let mut page = 1;
    loop {
      let batch = self.source.fetch_people(page).await?;
      let more = batch.has_next() && !batch.results.is_empty();
      debug!(page, fetched = batch.results.len(), total = batch.count, "people page");
      people.extend(batch.results);
      if !more {
        break;
      }
      page += 1;
    }
    Ok(people)
  }

  /// Fetch every person and enrich the full set.
  pub async fn load_catalog(&self) -> Result<Vec<EnrichedPerson>, FetchError> {
    let people = self.fetch_all_people().await?;
    let records = self.enrich_all(people).await;
    info!(
      records = records.len(),
      cached = self.cache.len(),
      "catalog enriched"
    );
    Ok(records)
  }
}
