//! The `ReminderStore` trait and supporting query types.
//!
//! The trait covers all three durable tables — the card store, the change
//! ledger and the comment cache. It is implemented by storage backends
//! (e.g. `dueboard-store-sqlite`); the poller and the query service
//! depend on this abstraction, not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::{
  card::{CardSnapshot, ListCount, NewCard},
  comment::{Comment, NewComment},
  event::{ChangeEvent, DailyCount, ReadStatusCounts},
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for [`ReminderStore::list_changes`].
#[derive(Debug, Clone, Default)]
pub struct ChangeFilter {
  /// Restrict to read or unread events; `None` returns both.
  pub is_read: Option<bool>,
  /// Page size; the backend applies a default when absent.
  pub limit:   Option<usize>,
  pub offset:  Option<usize>,
}

/// Parameters for [`ReminderStore::list_comments`].
#[derive(Debug, Clone, Default)]
pub struct CommentFilter {
  pub card_id:       Option<String>,
  /// Restrict to comments that did (or did not) suppress a reminder.
  pub suppressed:    Option<bool>,
  /// Lower bound on `created_at`, typically a date-bucket boundary.
  pub created_after: Option<DateTime<Utc>>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the Dueboard durable stores.
///
/// The poller is the sole writer of cards, events (creation) and
/// comments; the query service is the sole writer of the `is_read`
/// mutation. Nothing ever deletes a row.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ReminderStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Card store ────────────────────────────────────────────────────────

  /// Insert the card if unseen, else overwrite all fields and bump
  /// `last_updated`. Idempotent under repeated identical input.
  fn upsert_card(
    &self,
    card: NewCard,
  ) -> impl Future<Output = Result<CardSnapshot, Self::Error>> + Send + '_;

  /// Retrieve a card by id. Returns `None` if never observed.
  fn get_card<'a>(
    &'a self,
    card_id: &'a str,
  ) -> impl Future<Output = Result<Option<CardSnapshot>, Self::Error>> + Send + 'a;

  /// All known cards, due date ascending with undated cards last.
  fn list_cards(
    &self,
  ) -> impl Future<Output = Result<Vec<CardSnapshot>, Self::Error>> + Send + '_;

  /// Cards-per-list counts over cards that have a due date.
  fn cards_per_list(
    &self,
  ) -> impl Future<Output = Result<Vec<ListCount>, Self::Error>> + Send + '_;

  // ── Change ledger ─────────────────────────────────────────────────────

  /// Append one due-date change event. Fails with a no-op-change error
  /// when `old_due == new_due`; callers must diff first.
  fn append_change<'a>(
    &'a self,
    card_id: &'a str,
    old_due: Option<DateTime<Utc>>,
    new_due: Option<DateTime<Utc>>,
  ) -> impl Future<Output = Result<ChangeEvent, Self::Error>> + Send + 'a;

  /// The ledger append and the snapshot upsert as one atomic unit, so a
  /// crash can never leave an event without its matching snapshot.
  /// `old_due` is the previously stored value; `card.due_date` is the new
  /// one, and the same no-op precondition applies.
  fn record_due_change(
    &self,
    card: NewCard,
    old_due: Option<DateTime<Utc>>,
  ) -> impl Future<Output = Result<(ChangeEvent, CardSnapshot), Self::Error>> + Send + '_;

  /// Page through events, most recent `created_at` first with a stable
  /// id-descending tie-break. Also returns the total matching count.
  fn list_changes(
    &self,
    filter: ChangeFilter,
  ) -> impl Future<Output = Result<(Vec<ChangeEvent>, u64), Self::Error>> + Send + '_;

  /// Full change history for one card, newest first.
  fn changes_for_card<'a>(
    &'a self,
    card_id: &'a str,
  ) -> impl Future<Output = Result<Vec<ChangeEvent>, Self::Error>> + Send + 'a;

  /// One-way read transition. Returns the event (read) on success,
  /// `None` for an unknown id. Marking an already-read event succeeds
  /// with no state change.
  fn mark_read(
    &self,
    event_id: i64,
  ) -> impl Future<Output = Result<Option<ChangeEvent>, Self::Error>> + Send + '_;

  /// Daily event counts for the activity chart, oldest day first.
  fn count_by_day(
    &self,
    since: Option<DateTime<Utc>>,
  ) -> impl Future<Output = Result<Vec<DailyCount>, Self::Error>> + Send + '_;

  fn count_by_read_status(
    &self,
  ) -> impl Future<Output = Result<ReadStatusCounts, Self::Error>> + Send + '_;

  // ── Comment cache ─────────────────────────────────────────────────────

  /// Store comments, ignoring any already cached (dedup on
  /// `(card_id, comment_id)`). Returns how many were actually inserted.
  fn insert_comments(
    &self,
    comments: Vec<NewComment>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// All cached comments for a card, newest first.
  fn comments_for_card<'a>(
    &'a self,
    card_id: &'a str,
  ) -> impl Future<Output = Result<Vec<Comment>, Self::Error>> + Send + 'a;

  /// The most recent cached comment for a card, if any.
  fn latest_comment<'a>(
    &'a self,
    card_id: &'a str,
  ) -> impl Future<Output = Result<Option<Comment>, Self::Error>> + Send + 'a;

  /// Filtered comment listing, newest first.
  fn list_comments(
    &self,
    filter: CommentFilter,
  ) -> impl Future<Output = Result<Vec<Comment>, Self::Error>> + Send + '_;

  /// Flag a comment as having suppressed a reminder. One-way, false→true.
  fn flag_comment_suppressed<'a>(
    &'a self,
    card_id: &'a str,
    comment_id: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// How many comments have suppressed a reminder, for the dashboard
  /// suppressed-vs-manual breakdown.
  fn suppressed_comment_count(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
