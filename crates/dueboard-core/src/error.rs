//! Error types for `dueboard-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The ledger was handed an unchanged due date. The poller's diff step
  /// must never let this happen; treat it as an assertion failure, not a
  /// condition to recover from.
  #[error("no-op due-date change for card {0}")]
  NoOpChange(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
