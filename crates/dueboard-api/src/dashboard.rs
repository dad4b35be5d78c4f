//! Handler for `GET /dashboard-data` — the aggregate payload behind the
//! overview page.

use axum::{Json, extract::State};
use chrono::{Duration, Utc};
use dueboard_core::{card::ListCount, event::DailyCount, store::ReminderStore};
use serde::Serialize;

use crate::{ApiContext, error::ApiError};

/// How far back the activity chart reaches.
const ACTIVITY_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Serialize)]
pub struct StatusCount {
  pub is_read: bool,
  pub count:   u64,
}

#[derive(Debug, Serialize)]
pub struct DashboardData {
  /// Cards-per-list, counting only cards with a due date.
  pub lists:           Vec<ListCount>,
  /// Change events per day, oldest day first.
  pub activity:        Vec<DailyCount>,
  /// One entry per read-flag value.
  pub status:          Vec<StatusCount>,
  /// Comments that have suppressed a reminder.
  pub auto_suppressed: u64,
}

/// `GET /dashboard-data`
pub async fn data<S>(
  State(ctx): State<ApiContext<S>>,
) -> Result<Json<DashboardData>, ApiError>
where
  S: ReminderStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let store_err = |e: S::Error| ApiError::Store(Box::new(e));

  let lists = ctx.store.cards_per_list().await.map_err(store_err)?;
  let since = Utc::now() - Duration::days(ACTIVITY_WINDOW_DAYS);
  let activity = ctx.store.count_by_day(Some(since)).await.map_err(store_err)?;
  let counts = ctx.store.count_by_read_status().await.map_err(store_err)?;
  let auto_suppressed = ctx
    .store
    .suppressed_comment_count()
    .await
    .map_err(store_err)?;

  Ok(Json(DashboardData {
    lists,
    activity,
    status: vec![
      StatusCount { is_read: false, count: counts.unread },
      StatusCount { is_read: true, count: counts.read },
    ],
    auto_suppressed,
  }))
}
