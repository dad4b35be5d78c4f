//! Handlers for `/reminders` and `/mark-read/:id`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/reminders` | Optional `limit`, `offset`, `is_read`; newest first |
//! | `POST` | `/mark-read/:id` | `{"success": true}`, 404 for an unknown id |

use axum::{
  Json,
  extract::{Path, Query, State},
};
use dueboard_core::{
  event::ChangeEvent,
  store::{ChangeFilter, ReminderStore},
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{ApiContext, error::ApiError};

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  pub limit:   Option<usize>,
  pub offset:  Option<usize>,
  /// Restrict to read (`true`) or unread (`false`) events.
  pub is_read: Option<bool>,
}

/// `GET /reminders[?limit=...][&offset=...][&is_read=...]`
pub async fn list<S>(
  State(ctx): State<ApiContext<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<ChangeEvent>>, ApiError>
where
  S: ReminderStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let filter = ChangeFilter {
    is_read: params.is_read,
    limit:   params.limit,
    offset:  params.offset,
  };

  let (events, _total) = ctx
    .store
    .list_changes(filter)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(events))
}

/// `POST /mark-read/:id`
///
/// Idempotent: re-marking an already-read event still returns success.
pub async fn mark_read<S>(
  State(ctx): State<ApiContext<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError>
where
  S: ReminderStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  ctx
    .store
    .mark_read(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or(ApiError::ReminderNotFound(id))?;
  Ok(Json(json!({ "success": true })))
}
