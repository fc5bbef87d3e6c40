//! Core types and the query engine for the Holocron character catalog.
//!
//! No HTTP and no async runtime here: the resource client and the enrichment
//! engine build on these types.

pub mod enriched;
pub mod entity;
pub mod error;
pub mod format;
pub mod paging;
pub mod person;
pub mod query;
pub mod source;

pub use error::{FetchError, Result};
