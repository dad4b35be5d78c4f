//! Handlers for `/cards` and `/card/:id` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/cards` | All snapshots, due date ascending, undated last |
//! | `GET`  | `/card/:id` | Single snapshot, 404 if never observed |
//! | `GET`  | `/card/:id/history` | That card's change events, newest first |
//! | `GET`  | `/card/:id/notification-status` | `{notifications_muted, reason}` |

use axum::{
  Json,
  extract::{Path, State},
};
use chrono::Utc;
use dueboard_core::{
  card::CardSnapshot,
  comment::NotificationStatus,
  event::ChangeEvent,
  store::ReminderStore,
  suppression,
};

use crate::{ApiContext, error::ApiError};

/// `GET /cards`
pub async fn list<S>(
  State(ctx): State<ApiContext<S>>,
) -> Result<Json<Vec<CardSnapshot>>, ApiError>
where
  S: ReminderStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let cards = ctx
    .store
    .list_cards()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(cards))
}

/// `GET /card/:id`
pub async fn get_one<S>(
  State(ctx): State<ApiContext<S>>,
  Path(card_id): Path<String>,
) -> Result<Json<CardSnapshot>, ApiError>
where
  S: ReminderStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let card = ctx
    .store
    .get_card(&card_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or(ApiError::CardNotFound(card_id))?;
  Ok(Json(card))
}

/// `GET /card/:id/history`
pub async fn history<S>(
  State(ctx): State<ApiContext<S>>,
  Path(card_id): Path<String>,
) -> Result<Json<Vec<ChangeEvent>>, ApiError>
where
  S: ReminderStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let events = ctx
    .store
    .changes_for_card(&card_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(events))
}

/// `GET /card/:id/notification-status`
///
/// Evaluated against "now" on every call; the muted flag flips back to
/// `false` on its own once the latest comment ages out of the window.
pub async fn notification_status<S>(
  State(ctx): State<ApiContext<S>>,
  Path(card_id): Path<String>,
) -> Result<Json<NotificationStatus>, ApiError>
where
  S: ReminderStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  ctx
    .store
    .get_card(&card_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::CardNotFound(card_id.clone()))?;

  let latest = ctx
    .store
    .latest_comment(&card_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let status =
    suppression::notification_status(latest.as_ref(), ctx.reminder_delay, Utc::now());
  Ok(Json(status))
}
