//! HTTP implementation of [`holocron_core::source::Source`] over the SWAPI
//! JSON endpoints.

mod client;

pub mod error;

pub use client::{DEFAULT_BASE_URL, HttpSource, SourceConfig};
pub use error::{Error, Result};
