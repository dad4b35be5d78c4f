//! Handler for `GET /comments`.
//!
//! The `bucket` param selects a rolling window anchored at the start of
//! the local day, converted to UTC before it reaches the store.

use axum::{
  Json,
  extract::{Query, State},
};
use chrono::{DateTime, Days, Local, NaiveTime, TimeZone, Utc};
use dueboard_core::{
  comment::Comment,
  store::{CommentFilter, ReminderStore},
};
use serde::{Deserialize, Serialize};

use crate::{ApiContext, error::ApiError};

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  pub card_id:    Option<String>,
  /// Restrict to comments that did (or did not) suppress a reminder.
  pub suppressed: Option<bool>,
  /// `today`, `week` or `month`.
  pub bucket:     Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CommentsResponse {
  pub comments: Vec<Comment>,
}

fn bucket_start(bucket: &str) -> Result<DateTime<Utc>, ApiError> {
  let days_back = match bucket {
    "today" => 0,
    "week" => 6,
    "month" => 29,
    other => {
      return Err(ApiError::BadRequest(format!(
        "unknown bucket {other:?}, expected today, week or month"
      )));
    }
  };

  let day = Local::now().date_naive() - Days::new(days_back);
  let naive = day.and_time(NaiveTime::MIN);
  // A DST transition can make local midnight nonexistent; fall back to
  // reading the naive timestamp as UTC.
  let start = naive
    .and_local_timezone(Local)
    .earliest()
    .map(|dt| dt.with_timezone(&Utc))
    .unwrap_or_else(|| Utc.from_utc_datetime(&naive));
  Ok(start)
}

/// `GET /comments[?card_id=...][&suppressed=...][&bucket=today|week|month]`
pub async fn list<S>(
  State(ctx): State<ApiContext<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<CommentsResponse>, ApiError>
where
  S: ReminderStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let filter = CommentFilter {
    card_id:       params.card_id,
    suppressed:    params.suppressed,
    created_after: params.bucket.as_deref().map(bucket_start).transpose()?,
  };

  let comments = ctx
    .store
    .list_comments(filter)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(CommentsResponse { comments }))
}
