//! The `Source` trait — read access to the upstream catalog API.
//!
//! Implemented over HTTP by `holocron-client`. The enrichment engine depends
//! on this abstraction, not on any concrete client, so it can be driven by an
//! in-memory source in tests.

use std::future::Future;

use crate::{
  entity::{Entity, EntityKind},
  error::FetchError,
  person::PeoplePage,
};

/// Stateless, read-only access to the four upstream endpoints.
///
/// Implementations perform no retries; a failed request is reported once and
/// retry policy is left to the caller. All methods return `Send` futures so
/// lookups can be spawned onto a multi-threaded runtime.
pub trait Source: Send + Sync {
  /// `GET {base}/people/?page={page}` (1-based).
  fn fetch_people(
    &self,
    page: u32,
  ) -> impl Future<Output = Result<PeoplePage, FetchError>> + Send + '_;

  /// `GET {url}`, decoded as `kind`.
  fn fetch_entity<'a>(
    &'a self,
    kind: EntityKind,
    url: &'a str,
  ) -> impl Future<Output = Result<Entity, FetchError>> + Send + 'a;
}
