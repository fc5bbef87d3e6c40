//! URL-keyed cache of related entities with in-flight deduplication.
//!
//! Each URL is in one of two states: resolved (`Ready`) or being fetched
//! (`InFlight`). While a request is in flight every caller for that URL awaits
//! the same shared future, so a URL is requested at most once at a time.
//! Failures are handed to every waiter and then forgotten, so a later lookup
//! tries again. Resolved entries are never evicted.

use std::{
  collections::HashMap,
  sync::{
    Arc, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicUsize, Ordering},
  },
};

use futures::{
  FutureExt,
  future::{BoxFuture, Shared},
};
use holocron_core::{
  entity::{Entity, EntityKind},
  error::FetchError,
  source::Source,
};
use tracing::debug;

type Pending = Shared<BoxFuture<'static, Result<Entity, FetchError>>>;

enum Slot {
  Ready(Entity),
  InFlight(Pending),
}

/// Counters describing how lookups were served.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
  /// Requests actually sent to the source.
  pub requests: usize,
  /// Lookups answered from a resolved entry.
  pub hits:     usize,
  /// Lookups that joined a request already in flight.
  pub joined:   usize,
}

/// Shared cache of planets, species and films keyed by URL.
#[derive(Default)]
pub struct EntityCache {
  slots:    Mutex<HashMap<String, Slot>>,
  requests: AtomicUsize,
  hits:     AtomicUsize,
  joined:   AtomicUsize,
}

impl EntityCache {
  pub fn new() -> Self { Self::default() }

  fn slots(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
    self.slots.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// The resolved entity for `url`, if any.
  pub fn get(&self, url: &str) -> Option<Entity> {
    match self.slots().get(url) {
      Some(Slot::Ready(entity)) => Some(entity.clone()),
      _ => None,
    }
  }

  /// Number of resolved entries.
  pub fn len(&self) -> usize {
    self
      .slots()
      .values()
      .filter(|s| matches!(s, Slot::Ready(_)))
      .count()
  }

  pub fn is_empty(&self) -> bool { self.len() == 0 }

  /// Number of URLs with a request currently in flight.
  pub fn in_flight(&self) -> usize {
    self
      .slots()
      .values()
      .filter(|s| matches!(s, Slot::InFlight(_)))
      .count()
  }

  pub fn stats(&self) -> CacheStats {
    CacheStats {
      requests: self.requests.load(Ordering::Relaxed),
      hits:     self.hits.load(Ordering::Relaxed),
      joined:   self.joined.load(Ordering::Relaxed),
    }
  }

  /// Resolve `url` as `kind`, from the cache when possible.
  ///
  /// Starts a request only when the URL is neither resolved nor in flight.
  pub async fn get_or_fetch<S>(
    &self,
    source: &Arc<S>,
    kind: EntityKind,
    url: &str,
  ) -> Result<Entity, FetchError>
  where
    S: Source + 'static,
  {
    let pending = {
      let mut slots = self.slots();
      match slots.get(url) {
        Some(Slot::Ready(entity)) => {
          self.hits.fetch_add(1, Ordering::Relaxed);
          return Ok(entity.clone());
        }
        Some(Slot::InFlight(pending)) => {
          self.joined.fetch_add(1, Ordering::Relaxed);
          pending.clone()
        }
        None => {
          debug!(%url, %kind, "cache miss");
          self.requests.fetch_add(1, Ordering::Relaxed);
          let source = Arc::clone(source);
          let owned = url.to_owned();
          let pending = async move { source.fetch_entity(kind, &owned).await }
            .boxed()
            .shared();
          slots.insert(url.to_owned(), Slot::InFlight(pending.clone()));
          pending
        }
      }
    };

    let result = pending.clone().await;

    // Settle the slot, unless another caller already did or a newer request
    // has replaced it.
    let mut slots = self.slots();
    let ours = matches!(
      slots.get(url),
      Some(Slot::InFlight(current)) if current.ptr_eq(&pending)
    );
    if ours {
      match &result {
        Ok(entity) => {
          slots.insert(url.to_owned(), Slot::Ready(entity.clone()));
        }
        Err(_) => {
          slots.remove(url);
        }
      }
    }
    result
  }
}
