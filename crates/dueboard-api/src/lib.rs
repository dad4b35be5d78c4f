//! JSON REST API for Dueboard.
//!
//! Exposes an axum [`Router`] backed by any
//! [`dueboard_core::store::ReminderStore`]. Auth, TLS, and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", dueboard_api::api_router(store.clone(), delay))
//! ```

pub mod cards;
pub mod comments;
pub mod dashboard;
pub mod error;
pub mod reminders;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use dueboard_core::store::ReminderStore;

pub use error::ApiError;

/// Shared handler state: the store plus the suppression window the
/// notification-status view evaluates against.
pub struct ApiContext<S> {
  pub store:          Arc<S>,
  pub reminder_delay: chrono::Duration,
}

impl<S> Clone for ApiContext<S> {
  fn clone(&self) -> Self {
    Self {
      store:          Arc::clone(&self.store),
      reminder_delay: self.reminder_delay,
    }
  }
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router
/// regardless of its own state type.
pub fn api_router<S>(store: Arc<S>, reminder_delay: chrono::Duration) -> Router<()>
where
  S: ReminderStore + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let ctx = ApiContext { store, reminder_delay };
  Router::new()
    // Dashboard
    .route("/dashboard-data", get(dashboard::data::<S>))
    // Cards
    .route("/cards", get(cards::list::<S>))
    .route("/card/{card_id}", get(cards::get_one::<S>))
    .route("/card/{card_id}/history", get(cards::history::<S>))
    .route(
      "/card/{card_id}/notification-status",
      get(cards::notification_status::<S>),
    )
    // Reminders
    .route("/reminders", get(reminders::list::<S>))
    .route("/mark-read/{id}", post(reminders::mark_read::<S>))
    // Comments
    .route("/comments", get(comments::list::<S>))
    .with_state(ctx)
}

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use chrono::{DateTime, Duration, TimeZone, Utc};
  use dueboard_core::{card::NewCard, comment::NewComment, store::ReminderStore as _};
  use dueboard_store_sqlite::SqliteStore;
  use serde_json::Value;
  use tower::ServiceExt as _;

  async fn make_store() -> Arc<SqliteStore> {
    Arc::new(SqliteStore::open_in_memory().await.unwrap())
  }

  fn router(store: Arc<SqliteStore>) -> Router<()> {
    api_router(store, Duration::hours(24))
  }

  fn dt(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 4, day, 9, 0, 0).unwrap()
  }

  fn card(id: &str, list: &str, due: Option<DateTime<Utc>>) -> NewCard {
    NewCard {
      card_id:     id.to_owned(),
      name:        format!("Card {id}"),
      list_name:   list.to_owned(),
      due_date:    due,
      url:         format!("https://board.example/c/{id}"),
      description: String::new(),
    }
  }

  fn comment(card_id: &str, id: &str, created_at: DateTime<Utc>) -> NewComment {
    NewComment {
      card_id:      card_id.to_owned(),
      comment_id:   id.to_owned(),
      comment_text: "noted".to_owned(),
      created_at,
    }
  }

  async fn get_json(store: Arc<SqliteStore>, uri: &str) -> (StatusCode, Value) {
    let resp = router(store)
      .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
      .await
      .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
  }

  async fn post_json(store: Arc<SqliteStore>, uri: &str) -> (StatusCode, Value) {
    let resp = router(store)
      .oneshot(
        Request::builder()
          .method("POST")
          .uri(uri)
          .body(Body::empty())
          .unwrap(),
      )
      .await
      .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
  }

  // ── Cards ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn cards_are_listed_in_due_order_with_undated_last() {
    let store = make_store().await;
    store.upsert_card(card("later", "Doing", Some(dt(20)))).await.unwrap();
    store.upsert_card(card("soon", "Doing", Some(dt(2)))).await.unwrap();
    store.upsert_card(card("none", "Backlog", None)).await.unwrap();

    let (status, body) = get_json(store, "/cards").await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body
      .as_array()
      .unwrap()
      .iter()
      .map(|c| c["card_id"].as_str().unwrap())
      .collect();
    assert_eq!(ids, vec!["soon", "later", "none"]);
  }

  #[tokio::test]
  async fn unknown_card_is_404() {
    let store = make_store().await;
    let (status, body) = get_json(store, "/card/ghost").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "card ghost not found");
  }

  #[tokio::test]
  async fn card_history_is_newest_first() {
    let store = make_store().await;
    store.upsert_card(card("c1", "Doing", Some(dt(1)))).await.unwrap();
    store.append_change("c1", Some(dt(1)), Some(dt(2))).await.unwrap();
    store.append_change("c1", Some(dt(2)), None).await.unwrap();

    let (status, body) = get_json(store, "/card/c1/history").await;
    assert_eq!(status, StatusCode::OK);
    let events = body.as_array().unwrap();
    assert_eq!(events.len(), 2);
    assert!(events[0]["new_due"].is_null());
    let old_due: DateTime<Utc> =
      events[1]["old_due"].as_str().unwrap().parse().unwrap();
    assert_eq!(old_due, dt(1));
  }

  // ── Notification status ─────────────────────────────────────────────────────

  #[tokio::test]
  async fn notification_status_unknown_card_is_404() {
    let store = make_store().await;
    let (status, _) = get_json(store, "/card/ghost/notification-status").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn recent_comment_mutes_notifications() {
    let store = make_store().await;
    store.upsert_card(card("c1", "Doing", None)).await.unwrap();
    store
      .insert_comments(vec![comment("c1", "com1", Utc::now() - Duration::hours(1))])
      .await
      .unwrap();

    let (status, body) = get_json(store, "/card/c1/notification-status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notifications_muted"], Value::Bool(true));
    assert!(!body["reason"].as_str().unwrap().is_empty());
  }

  #[tokio::test]
  async fn stale_comment_does_not_mute() {
    let store = make_store().await;
    store.upsert_card(card("c1", "Doing", None)).await.unwrap();
    store
      .insert_comments(vec![comment("c1", "com1", Utc::now() - Duration::hours(48))])
      .await
      .unwrap();

    let (_, body) = get_json(store, "/card/c1/notification-status").await;
    assert_eq!(body["notifications_muted"], Value::Bool(false));
  }

  // ── Reminders ───────────────────────────────────────────────────────────────

  async fn seed_events(store: &SqliteStore, n: u32) -> Vec<i64> {
    store.upsert_card(card("c1", "Doing", None)).await.unwrap();
    let mut ids = Vec::new();
    for day in 1..=n {
      let e = store
        .append_change("c1", None, Some(dt(day)))
        .await
        .unwrap();
      ids.push(e.id);
    }
    ids
  }

  #[tokio::test]
  async fn reminders_paginate_newest_first() {
    let store = make_store().await;
    let ids = seed_events(&store, 5).await;

    let (status, body) = get_json(store, "/reminders?limit=2&offset=1").await;
    assert_eq!(status, StatusCode::OK);
    let got: Vec<i64> = body
      .as_array()
      .unwrap()
      .iter()
      .map(|e| e["id"].as_i64().unwrap())
      .collect();
    // Newest first, skipping the most recent.
    assert_eq!(got, vec![ids[3], ids[2]]);
  }

  #[tokio::test]
  async fn reminders_filter_by_read_flag() {
    let store = make_store().await;
    let ids = seed_events(&store, 3).await;
    store.mark_read(ids[0]).await.unwrap();

    let (_, unread) = get_json(store.clone(), "/reminders?is_read=false").await;
    assert_eq!(unread.as_array().unwrap().len(), 2);
    let (_, read) = get_json(store, "/reminders?is_read=true").await;
    assert_eq!(read.as_array().unwrap().len(), 1);
    assert_eq!(read[0]["id"].as_i64().unwrap(), ids[0]);
  }

  #[tokio::test]
  async fn mark_read_succeeds_and_is_idempotent() {
    let store = make_store().await;
    let ids = seed_events(&store, 1).await;
    let uri = format!("/mark-read/{}", ids[0]);

    let (status, body) = post_json(store.clone(), &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], Value::Bool(true));

    // Second call is still a success.
    let (status, _) = post_json(store, &uri).await;
    assert_eq!(status, StatusCode::OK);
  }

  #[tokio::test]
  async fn mark_read_unknown_id_is_404() {
    let store = make_store().await;
    let (status, body) = post_json(store, "/mark-read/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "reminder 999 not found");
  }

  // ── Dashboard ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn dashboard_data_aggregates_all_sections() {
    let store = make_store().await;
    store.upsert_card(card("a", "Doing", Some(dt(1)))).await.unwrap();
    store.upsert_card(card("b", "Doing", Some(dt(2)))).await.unwrap();
    store.upsert_card(card("c", "Backlog", None)).await.unwrap();
    let e = store.append_change("a", None, Some(dt(5))).await.unwrap();
    store.mark_read(e.id).await.unwrap();
    store.append_change("b", None, Some(dt(6))).await.unwrap();
    store
      .insert_comments(vec![comment("a", "com1", Utc::now())])
      .await
      .unwrap();
    store.flag_comment_suppressed("a", "com1").await.unwrap();

    let (status, body) = get_json(store, "/dashboard-data").await;
    assert_eq!(status, StatusCode::OK);

    // Undated cards are excluded from the list counts.
    let lists = body["lists"].as_array().unwrap();
    assert_eq!(lists.len(), 1);
    assert_eq!(lists[0]["list_name"], "Doing");
    assert_eq!(lists[0]["count"], 2);

    let status_counts = body["status"].as_array().unwrap();
    assert_eq!(status_counts.len(), 2);
    assert_eq!(body["auto_suppressed"], 1);
    assert!(!body["activity"].as_array().unwrap().is_empty());
  }

  // ── Comments ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn comments_filter_by_card_and_suppressed() {
    let store = make_store().await;
    store
      .insert_comments(vec![
        comment("a", "com1", Utc::now() - Duration::hours(2)),
        comment("a", "com2", Utc::now() - Duration::hours(1)),
        comment("b", "com3", Utc::now()),
      ])
      .await
      .unwrap();
    store.flag_comment_suppressed("a", "com1").await.unwrap();

    let (_, body) = get_json(store.clone(), "/comments?card_id=a").await;
    assert_eq!(body["comments"].as_array().unwrap().len(), 2);

    let (_, body) = get_json(store, "/comments?suppressed=true").await;
    let comments = body["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["comment_id"], "com1");
  }

  #[tokio::test]
  async fn comments_bucket_limits_by_window() {
    let store = make_store().await;
    store
      .insert_comments(vec![
        comment("a", "fresh", Utc::now()),
        comment("a", "old", Utc::now() - Duration::days(40)),
      ])
      .await
      .unwrap();

    let (status, body) = get_json(store, "/comments?bucket=month").await;
    assert_eq!(status, StatusCode::OK);
    let comments = body["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["comment_id"], "fresh");
  }

  // Buckets are rolling windows anchored at the local day start, not
  // calendar-aligned periods: a three-day-old comment is always inside
  // `week` and a ten-day-old one always inside `month`, whatever weekday
  // or day-of-month today happens to be.
  #[tokio::test]
  async fn comment_buckets_are_rolling_windows() {
    let store = make_store().await;
    store
      .insert_comments(vec![
        comment("a", "recent", Utc::now() - Duration::days(3)),
        comment("a", "older", Utc::now() - Duration::days(10)),
      ])
      .await
      .unwrap();

    let (_, body) = get_json(store.clone(), "/comments?bucket=week").await;
    let ids: Vec<&str> = body["comments"]
      .as_array()
      .unwrap()
      .iter()
      .map(|c| c["comment_id"].as_str().unwrap())
      .collect();
    assert_eq!(ids, vec!["recent"]);

    let (_, body) = get_json(store.clone(), "/comments?bucket=month").await;
    assert_eq!(body["comments"].as_array().unwrap().len(), 2);

    let (_, body) = get_json(store, "/comments?bucket=today").await;
    assert!(body["comments"].as_array().unwrap().is_empty());
  }

  #[tokio::test]
  async fn comments_unknown_bucket_is_400() {
    let store = make_store().await;
    let (status, body) = get_json(store, "/comments?bucket=fortnight").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("fortnight"));
  }
}
