//! Error type for `holocron-engine`.

use holocron_core::FetchError;
use thiserror::Error;

/// The primary list fetch failed; the view cannot show this page.
///
/// Lookup failures during enrichment never produce this error; they are
/// absorbed into default field values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct PrimaryFetchError {
  /// Human-readable summary shown in the failed view.
  pub message: String,
  #[source]
  pub source:  FetchError,
}

impl PrimaryFetchError {
  /// HTTP status of the failed request, if the server answered.
  pub fn status(&self) -> Option<u16> { self.source.status() }
}

impl From<FetchError> for PrimaryFetchError {
  fn from(source: FetchError) -> Self {
    Self {
      message: format!("Failed to load characters: {source}"),
      source,
    }
  }
}

#[cfg(test)]
mod tests {
  use std::error::Error as _;

  use super::*;

  #[test]
  fn message_carries_upstream_status() {
    let err = PrimaryFetchError::from(FetchError::Network {
      status: 500,
      url:    "https://swapi.dev/api/people/?page=1".into(),
    });
    assert!(err.message.starts_with("Failed to load characters: "));
    assert!(err.message.contains("500"));
    assert_eq!(err.to_string(), err.message);
    assert_eq!(err.status(), Some(500));
    assert!(err.source().is_some());
  }

  #[test]
  fn transport_failure_has_no_status() {
    let err = PrimaryFetchError::from(FetchError::Transport {
      url:   "https://swapi.dev/api/people/?page=1".into(),
      cause: "connection refused".into(),
    });
    assert_eq!(err.status(), None);
    assert!(err.message.contains("connection refused"));
  }
}
