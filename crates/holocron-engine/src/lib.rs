//! Enrichment join and catalog controller for Holocron.
//!
//! [`Enricher`] resolves each person's homeworld, species and films through a
//! shared, deduplicating [`EntityCache`]. [`Catalog`] drives loads on the
//! tokio runtime, owns the query state, and hands the view a read-only
//! [`Snapshot`] per render.

mod cache;
mod catalog;
mod enrich;

pub mod error;

pub use cache::{CacheStats, EntityCache};
pub use catalog::{Catalog, CatalogEvent, Snapshot, ViewState};
pub use enrich::{Enricher, Progress};
pub use error::PrimaryFetchError;

#[cfg(test)]
mod fake;
