//! Dueboard API errors and their HTTP mapping.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
///
/// Lookups against resources the poller has never observed map to 404,
/// malformed query parameters to 400, and storage failures to 500. The
/// body is always `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
  /// The card id has never been observed on the board.
  #[error("card {0} not found")]
  CardNotFound(String),

  /// No change event carries this ledger id.
  #[error("reminder {0} not found")]
  ReminderNotFound(i64),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::CardNotFound(_) | ApiError::ReminderNotFound(_) => {
        StatusCode::NOT_FOUND
      }
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}
