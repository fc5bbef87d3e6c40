//! Related entities referenced from a [`Person`](crate::person::Person).
//!
//! Only the fields the catalog displays are decoded; everything else the API
//! returns is ignored.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter};

// ─── Entities ────────────────────────────────────────────────────────────────

/// A planet (a person's homeworld).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Planet {
  pub name:       String,
  #[serde(default)]
  pub terrain:    String,
  #[serde(default)]
  pub climate:    String,
  #[serde(default)]
  pub population: String,
  #[serde(default)]
  pub diameter:   String,
  #[serde(default)]
  pub gravity:    String,
  #[serde(default)]
  pub url:        String,
}

/// A species.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Species {
  pub name:           String,
  #[serde(default)]
  pub classification: String,
  #[serde(default)]
  pub language:       String,
  #[serde(default)]
  pub url:            String,
}

/// A film.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Film {
  pub title:        String,
  #[serde(default)]
  pub episode_id:   u32,
  #[serde(default)]
  pub director:     String,
  #[serde(default)]
  pub release_date: String,
  #[serde(default)]
  pub url:          String,
}

// ─── Kind / union ────────────────────────────────────────────────────────────

/// Which related endpoint a URL points at.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub enum EntityKind {
  Planet,
  Species,
  Film,
}

/// A decoded related entity, as stored in the entity cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
pub enum Entity {
  Planet(Planet),
  Species(Species),
  Film(Film),
}

impl Entity {
  /// Decode a JSON body as the given kind.
  pub fn from_json(
    kind: EntityKind,
    body: serde_json::Value,
  ) -> Result<Self, serde_json::Error> {
    Ok(match kind {
      EntityKind::Planet => Self::Planet(serde_json::from_value(body)?),
      EntityKind::Species => Self::Species(serde_json::from_value(body)?),
      EntityKind::Film => Self::Film(serde_json::from_value(body)?),
    })
  }

  pub fn kind(&self) -> EntityKind {
    match self {
      Self::Planet(_) => EntityKind::Planet,
      Self::Species(_) => EntityKind::Species,
      Self::Film(_) => EntityKind::Film,
    }
  }

  /// The display label: planet/species name or film title.
  pub fn label(&self) -> &str {
    match self {
      Self::Planet(p) => &p.name,
      Self::Species(s) => &s.name,
      Self::Film(f) => &f.title,
    }
  }

  pub fn into_planet(self) -> Option<Planet> {
    match self {
      Self::Planet(p) => Some(p),
      _ => None,
    }
  }

  pub fn into_species(self) -> Option<Species> {
    match self {
      Self::Species(s) => Some(s),
      _ => None,
    }
  }

  pub fn into_film(self) -> Option<Film> {
    match self {
      Self::Film(f) => Some(f),
      _ => None,
    }
  }
}
