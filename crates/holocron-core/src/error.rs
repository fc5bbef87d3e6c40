//! Error types for `holocron-core`.

use thiserror::Error;

/// A failed request against the upstream API.
///
/// `Clone` so a single failed lookup can be handed to every task awaiting the
/// same in-flight request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
  /// The server answered with a non-2xx status.
  #[error("HTTP error! status: {status} ({url})")]
  Network { status: u16, url: String },

  /// The request never produced a response (DNS, refused, timeout, ...).
  #[error("transport error for {url}: {cause}")]
  Transport { url: String, cause: String },

  /// A 2xx response whose body was not the expected JSON shape.
  #[error("could not decode response from {url}: {cause}")]
  Decode { url: String, cause: String },
}

impl FetchError {
  /// The URL of the request that failed.
  pub fn url(&self) -> &str {
    match self {
      Self::Network { url, .. }
      | Self::Transport { url, .. }
      | Self::Decode { url, .. } => url,
    }
  }

  /// The HTTP status, if the server answered at all.
  pub fn status(&self) -> Option<u16> {
    match self {
      Self::Network { status, .. } => Some(*status),
      _ => None,
    }
  }
}

pub type Result<T, E = FetchError> = std::result::Result<T, E>;
