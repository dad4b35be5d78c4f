//! Error types for `dueboard-trello`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Network, auth or server-side failure. Transient from the poller's
  /// point of view: the cycle is skipped and retried next interval.
  #[error("board source unavailable: {0}")]
  SourceUnavailable(String),

  /// The board answered, but the payload is missing required fields or
  /// carries invalid values. Never silently propagated as nulls.
  #[error("malformed board data: {0}")]
  MalformedSourceData(String),
}

impl From<reqwest::Error> for Error {
  fn from(e: reqwest::Error) -> Self {
    if e.is_decode() {
      Error::MalformedSourceData(e.to_string())
    } else {
      Error::SourceUnavailable(e.to_string())
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
