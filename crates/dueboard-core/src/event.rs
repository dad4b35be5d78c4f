//! Change events — the append-only ledger of due-date transitions.
//!
//! Events are immutable once written, apart from the one-way
//! `is_read` transition (false → true).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One recorded due-date transition for a card.
///
/// The `card_id` is a reference, not ownership: the event survives
/// whatever happens to the card row afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
  /// Surrogate id assigned by the store, strictly increasing.
  pub id:         i64,
  pub card_id:    String,
  pub old_due:    Option<DateTime<Utc>>,
  pub new_due:    Option<DateTime<Utc>>,
  /// Set once at write time; immutable.
  pub created_at: DateTime<Utc>,
  pub is_read:    bool,
}

/// One bar of the dashboard activity chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
  pub date:  NaiveDate,
  pub count: u64,
}

/// Read/unread totals over the whole ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadStatusCounts {
  pub read:   u64,
  pub unread: u64,
}
