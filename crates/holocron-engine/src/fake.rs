//! In-memory [`Source`] for engine tests.
//!
//! Serves a fixed roster of people split into upstream-sized pages, a fixed
//! set of related entities, configurable failures, and gates that hold a URL's
//! response until the test releases it.

use std::{
  collections::{HashMap, HashSet},
  sync::{Arc, Mutex},
};

use holocron_core::{
  entity::{Entity, EntityKind, Film, Planet, Species},
  error::FetchError,
  person::{PAGE_SIZE, PeoplePage, Person},
  source::Source,
};
use tokio::sync::Semaphore;

pub const BASE: &str = "https://swapi.test/api";

pub fn planet_url(n: usize) -> String { format!("{BASE}/planets/{n}/") }
pub fn species_url(n: usize) -> String { format!("{BASE}/species/{n}/") }
pub fn film_url(n: usize) -> String { format!("{BASE}/films/{n}/") }
pub fn person_url(n: usize) -> String { format!("{BASE}/people/{n}/") }

pub fn person(
  n: usize,
  name: &str,
  homeworld: Option<String>,
  species: Vec<String>,
  films: Vec<String>,
) -> Person {
  Person {
    name: name.to_owned(),
    height: "172".into(),
    mass: "77".into(),
    hair_color: "blond".into(),
    skin_color: "fair".into(),
    eye_color: "blue".into(),
    birth_year: "19BBY".into(),
    gender: "n/a".into(),
    homeworld,
    species,
    films,
    created: "2014-12-09T13:50:51.644000Z".into(),
    edited: "2014-12-20T21:17:56.891000Z".into(),
    url: person_url(n),
  }
}

#[derive(Default)]
pub struct FakeSource {
  people:        Vec<Person>,
  entities:      HashMap<String, Entity>,
  /// Entity URLs that answer with HTTP 500.
  failing:       Mutex<HashSet<String>>,
  /// People pages that answer with the given status.
  failing_pages: Mutex<HashMap<u32, u16>>,
  gates:         Mutex<HashMap<String, Arc<Semaphore>>>,
  entity_hits:   Mutex<HashMap<String, usize>>,
  page_hits:     Mutex<HashMap<u32, usize>>,
}

impl FakeSource {
  /// Planets 1-3, species 1-2, films 1-3, no people.
  pub fn new() -> Self {
    let mut entities = HashMap::new();
    for (n, name) in [(1, "Tatooine"), (2, "Naboo"), (3, "Alderaan")] {
      entities.insert(
        planet_url(n),
        Entity::Planet(Planet {
          name:       name.into(),
          terrain:    "desert".into(),
          climate:    "arid".into(),
          population: "200000".into(),
          diameter:   "10465".into(),
          gravity:    "1 standard".into(),
          url:        planet_url(n),
        }),
      );
    }
    for (n, name) in [(1, "Droid"), (2, "Wookiee")] {
      entities.insert(
        species_url(n),
        Entity::Species(Species {
          name:           name.into(),
          classification: "artificial".into(),
          language:       "n/a".into(),
          url:            species_url(n),
        }),
      );
    }
    for (n, title) in [
      (1, "A New Hope"),
      (2, "The Empire Strikes Back"),
      (3, "Return of the Jedi"),
    ] {
      entities.insert(
        film_url(n),
        Entity::Film(Film {
          title:        title.into(),
          episode_id:   n as u32 + 3,
          director:     "George Lucas".into(),
          release_date: "1977-05-25".into(),
          url:          film_url(n),
        }),
      );
    }
    Self {
      entities,
      ..Self::default()
    }
  }

  /// `count` generated people, numbered from 1.
  ///
  /// Person `n` lives on planet `n % 3 + 1`, is a droid when `n` is odd, a
  /// wookiee when `n % 4 == 2`, and lists no species otherwise. Everyone
  /// appears in film 1; even numbers also appear in film 2.
  pub fn with_roster(count: usize) -> Self {
    let mut source = Self::new();
    source.people = (1..=count)
      .map(|n| {
        let species = if n % 2 == 1 {
          vec![species_url(1)]
        } else if n % 4 == 2 {
          vec![species_url(2)]
        } else {
          vec![]
        };
        let mut films = vec![film_url(1)];
        if n % 2 == 0 {
          films.push(film_url(2));
        }
        person(
          n,
          &format!("Trooper {n:02}"),
          Some(planet_url(n % 3 + 1)),
          species,
          films,
        )
      })
      .collect();
    source
  }

  pub fn with_people(people: Vec<Person>) -> Self {
    let mut source = Self::new();
    source.people = people;
    source
  }

  pub fn fail_entity(&self, url: &str) {
    self.failing.lock().unwrap().insert(url.to_owned());
  }

  pub fn fail_page(&self, page: u32, status: u16) {
    self.failing_pages.lock().unwrap().insert(page, status);
  }

  pub fn heal_page(&self, page: u32) {
    self.failing_pages.lock().unwrap().remove(&page);
  }

  pub fn heal_entity(&self, url: &str) {
    self.failing.lock().unwrap().remove(url);
  }

  /// Hold responses for `url` until [`FakeSource::release`].
  pub fn hold(&self, url: &str) {
    self
      .gates
      .lock()
      .unwrap()
      .insert(url.to_owned(), Arc::new(Semaphore::new(0)));
  }

  pub fn release(&self, url: &str) {
    if let Some(gate) = self.gates.lock().unwrap().get(url) {
      gate.close();
    }
  }

  pub fn entity_requests(&self, url: &str) -> usize {
    self
      .entity_hits
      .lock()
      .unwrap()
      .get(url)
      .copied()
      .unwrap_or(0)
  }

  pub fn total_entity_requests(&self) -> usize {
    self.entity_hits.lock().unwrap().values().sum()
  }

  pub fn page_requests(&self, page: u32) -> usize {
    self.page_hits.lock().unwrap().get(&page).copied().unwrap_or(0)
  }

  pub fn total_page_requests(&self) -> usize {
    self.page_hits.lock().unwrap().values().sum()
  }

  fn page(&self, page: u32) -> PeoplePage {
    let start = (page as usize).saturating_sub(1) * PAGE_SIZE;
    let results: Vec<Person> =
      self.people.iter().skip(start).take(PAGE_SIZE).cloned().collect();
    let has_next = start + PAGE_SIZE < self.people.len();
    PeoplePage {
      count: self.people.len(),
      next: has_next.then(|| format!("{BASE}/people/?page={}", page + 1)),
      previous: (page > 1).then(|| format!("{BASE}/people/?page={}", page - 1)),
      results,
    }
  }
}

impl Source for FakeSource {
  async fn fetch_people(&self, page: u32) -> Result<PeoplePage, FetchError> {
    *self.page_hits.lock().unwrap().entry(page).or_default() += 1;
    let failure = self.failing_pages.lock().unwrap().get(&page).copied();
    if let Some(status) = failure {
      return Err(FetchError::Network {
        status,
        url: format!("{BASE}/people/?page={page}"),
      });
    }
    Ok(self.page(page))
  }

  async fn fetch_entity<'a>(
    &'a self,
    kind: EntityKind,
    url: &'a str,
  ) -> Result<Entity, FetchError> {
    *self
      .entity_hits
      .lock()
      .unwrap()
      .entry(url.to_owned())
      .or_default() += 1;

    let gate = self.gates.lock().unwrap().get(url).cloned();
    if let Some(gate) = gate {
      // A closed semaphore means the gate was released.
      let _ = gate.acquire().await;
    }

    if self.failing.lock().unwrap().contains(url) {
      return Err(FetchError::Network {
        status: 500,
        url:    url.to_owned(),
      });
    }
    match self.entities.get(url) {
      Some(entity) if entity.kind() == kind => Ok(entity.clone()),
      Some(_) => Err(FetchError::Decode {
        url:   url.to_owned(),
        cause: format!("not a {kind}"),
      }),
      None => Err(FetchError::Network {
        status: 404,
        url:    url.to_owned(),
      }),
    }
  }
}
