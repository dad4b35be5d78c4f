//! Card comments fetched from the board, and the derived notification
//! status view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A comment observed on a board card.
///
/// Identified by `(card_id, comment_id)`; immutable after first
/// observation except for the one-way `suppressed_notification` flag,
/// which is set when this comment is the reason a reminder was withheld.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
  pub card_id:                 String,
  pub comment_id:              String,
  pub comment_text:            String,
  pub created_at:              DateTime<Utc>,
  pub suppressed_notification: bool,
}

/// A comment as fetched from the board source, before the store has seen it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewComment {
  pub card_id:      String,
  pub comment_id:   String,
  pub comment_text: String,
  pub created_at:   DateTime<Utc>,
}

/// The continuously evaluated "muted" view for a card — derived, never
/// stored. Reflects whether the most recent comment falls inside the
/// quiet window relative to now, independent of any specific change event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationStatus {
  pub notifications_muted: bool,
  pub reason:              String,
}
