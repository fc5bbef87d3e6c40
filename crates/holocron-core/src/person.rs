//! Person — the primary resource, as listed by `GET /people/?page=n`.

use serde::{Deserialize, Serialize};

use crate::format::person_id;

/// Records per page of the primary resource. Fixed by the upstream API.
pub const PAGE_SIZE: usize = 10;

/// A character as returned by the people endpoint. Never modified after it
/// has been fetched; its URL is its identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
  pub name:       String,
  #[serde(default)]
  pub height:     String,
  #[serde(default)]
  pub mass:       String,
  #[serde(default)]
  pub hair_color: String,
  #[serde(default)]
  pub skin_color: String,
  #[serde(default)]
  pub eye_color:  String,
  #[serde(default)]
  pub birth_year: String,
  #[serde(default)]
  pub gender:     String,
  /// Planet URL. Some upstream records carry `null` or an empty string.
  #[serde(default, deserialize_with = "empty_as_none")]
  pub homeworld:  Option<String>,
  /// Species URLs in upstream order; only the first is ever resolved.
  #[serde(default)]
  pub species:    Vec<String>,
  /// Film URLs in upstream order.
  #[serde(default)]
  pub films:      Vec<String>,
  #[serde(default)]
  pub created:    String,
  #[serde(default)]
  pub edited:     String,
  pub url:        String,
}

impl Person {
  /// Numeric id parsed from the canonical URL, if it has one.
  pub fn id(&self) -> Option<u32> { person_id(&self.url) }
}

/// One page of the primary resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeoplePage {
  /// Total number of people across every page.
  pub count:    usize,
  pub next:     Option<String>,
  pub previous: Option<String>,
  pub results:  Vec<Person>,
}

impl PeoplePage {
  pub fn has_next(&self) -> bool { self.next.is_some() }

  /// Number of primary pages implied by `count`.
  pub fn total_pages(&self) -> usize { self.count.div_ceil(PAGE_SIZE) }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: serde::Deserializer<'de>,
{
  let raw = Option::<String>::deserialize(deserializer)?;
  Ok(raw.filter(|s| !s.trim().is_empty()))
}
