//! Async HTTP client for the SWAPI JSON endpoints.

use std::time::Duration;

use holocron_core::{
  entity::{Entity, EntityKind},
  error::FetchError,
  person::PeoplePage,
  source::Source,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{Error, Result};

/// The public SWAPI mirror used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://swapi.dev/api";

/// Connection settings for the upstream API.
#[derive(Debug, Clone)]
pub struct SourceConfig {
  pub base_url: String,
  /// Upper bound on a single request, connect through body.
  pub timeout:  Duration,
}

impl Default for SourceConfig {
  fn default() -> Self {
    Self {
      base_url: DEFAULT_BASE_URL.to_owned(),
      timeout:  Duration::from_secs(30),
    }
  }
}

/// Async HTTP client for the upstream catalog API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based. Holds no
/// state beyond its connection pool; every call is one request, never
/// retried.
#[derive(Clone)]
pub struct HttpSource {
  client:   Client,
  base_url: String,
}

impl HttpSource {
  pub fn new(config: SourceConfig) -> Result<Self> {
    let base_url = config.base_url.trim().trim_end_matches('/').to_owned();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
      return Err(Error::BaseUrl(config.base_url));
    }
    let client = Client::builder().timeout(config.timeout).build()?;
    Ok(Self { client, base_url })
  }

  pub fn base_url(&self) -> &str { &self.base_url }

  /// `{base}/people/`
  pub fn people_url(&self) -> String { format!("{}/people/", self.base_url) }

  async fn get_json<T: DeserializeOwned>(
    &self,
    url: &str,
    query: &[(&str, String)],
  ) -> Result<T, FetchError> {
    debug!(%url, ?query, "GET");
    let mut req = self.client.get(url);
    if !query.is_empty() {
      req = req.query(query);
    }
    let resp = req
      .send()
      .await
      .map_err(|e| transport(url, &e))?;

    let status = resp.status();
    if !status.is_success() {
      return Err(FetchError::Network {
        status: status.as_u16(),
        url:    url.to_owned(),
      });
    }

    let body = resp.bytes().await.map_err(|e| transport(url, &e))?;
    serde_json::from_slice(&body).map_err(|e| FetchError::Decode {
      url:   url.to_owned(),
      cause: e.to_string(),
    })
  }
}

impl Source for HttpSource {
  async fn fetch_people(&self, page: u32) -> Result<PeoplePage, FetchError> {
    let url = self.people_url();
    self.get_json(&url, &[("page", page.to_string())]).await
  }

  async fn fetch_entity<'a>(
    &'a self,
    kind: EntityKind,
    url: &'a str,
  ) -> Result<Entity, FetchError> {
    let body: serde_json::Value = self.get_json(url, &[]).await?;
    Entity::from_json(kind, body).map_err(|e| FetchError::Decode {
      url:   url.to_owned(),
      cause: format!("not a {kind}: {e}"),
    })
  }
}

fn transport(url: &str, err: &reqwest::Error) -> FetchError {
  FetchError::Transport {
    url:   url.to_owned(),
    cause: err.to_string(),
  }
}
