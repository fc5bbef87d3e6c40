//! Enriched records — a [`Person`] joined with its resolved relations.
//!
//! Enrichment is best effort. A lookup that fails leaves its field at the
//! documented default; the record itself is never dropped.

use serde::{Deserialize, Serialize};

use crate::{
  entity::{Planet, Species},
  person::Person,
};

/// Homeworld shown when the lookup failed or the person has none.
pub const DEFAULT_HOMEWORLD: &str = "Unknown";

/// Species shown when the lookup failed or the person lists none.
pub const DEFAULT_SPECIES: &str = "Human";

/// Homeworld marker shown while a record's enrichment is still in flight.
pub const PENDING_HOMEWORLD: &str = "Loading...";

/// Whether a record's lookups have all settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentStatus {
  Pending,
  Settled,
}

/// A [`Person`] plus the display values derived from its relations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedPerson {
  pub person:         Person,
  pub homeworld_name: String,
  pub species_name:   String,
  /// Film titles, in the order the person lists the films.
  pub film_titles:    Vec<String>,
  /// The resolved planet, kept for the detail view.
  pub homeworld:      Option<Planet>,
  /// The resolved first species, kept for the detail view.
  pub species:        Option<Species>,
  pub status:         EnrichmentStatus,
}

impl EnrichedPerson {
  /// The pending form of `person`, displayed until its lookups settle.
  pub fn placeholder(person: Person) -> Self {
    Self {
      person,
      homeworld_name: PENDING_HOMEWORLD.to_owned(),
      species_name: DEFAULT_SPECIES.to_owned(),
      film_titles: Vec::new(),
      homeworld: None,
      species: None,
      status: EnrichmentStatus::Pending,
    }
  }

  /// A settled record with every field at its default.
  pub fn with_defaults(person: Person) -> Self {
    Self {
      person,
      homeworld_name: DEFAULT_HOMEWORLD.to_owned(),
      species_name: DEFAULT_SPECIES.to_owned(),
      film_titles: Vec::new(),
      homeworld: None,
      species: None,
      status: EnrichmentStatus::Settled,
    }
  }

  /// Identity; always the source person's URL.
  pub fn url(&self) -> &str { &self.person.url }

  pub fn name(&self) -> &str { &self.person.name }

  pub fn is_pending(&self) -> bool {
    self.status == EnrichmentStatus::Pending
  }
}
