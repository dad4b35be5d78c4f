//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 UTC strings, which keeps
//! lexicographic and chronological order aligned and lets SQLite's
//! `date()` function bucket them directly.

use chrono::{DateTime, NaiveDate, Utc};
use dueboard_core::{
  card::CardSnapshot,
  comment::Comment,
  event::ChangeEvent,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339()
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_opt_dt(dt: Option<DateTime<Utc>>) -> Option<String> {
  dt.map(encode_dt)
}

pub fn decode_opt_dt(s: Option<&str>) -> Result<Option<DateTime<Utc>>> {
  s.map(decode_dt).transpose()
}

/// Decode the `YYYY-MM-DD` output of SQLite's `date()`.
pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `cards` row.
pub struct RawCard {
  pub card_id:      String,
  pub name:         String,
  pub list_name:    String,
  pub due_date:     Option<String>,
  pub url:          String,
  pub description:  String,
  pub last_updated: String,
}

impl RawCard {
  pub fn into_snapshot(self) -> Result<CardSnapshot> {
    Ok(CardSnapshot {
      card_id:      self.card_id,
      name:         self.name,
      list_name:    self.list_name,
      due_date:     decode_opt_dt(self.due_date.as_deref())?,
      url:          self.url,
      description:  self.description,
      last_updated: decode_dt(&self.last_updated)?,
    })
  }
}

/// Raw strings read directly from a `reminders` row.
pub struct RawChangeEvent {
  pub id:         i64,
  pub card_id:    String,
  pub old_due:    Option<String>,
  pub new_due:    Option<String>,
  pub created_at: String,
  pub is_read:    bool,
}

impl RawChangeEvent {
  pub fn into_event(self) -> Result<ChangeEvent> {
    Ok(ChangeEvent {
      id:         self.id,
      card_id:    self.card_id,
      old_due:    decode_opt_dt(self.old_due.as_deref())?,
      new_due:    decode_opt_dt(self.new_due.as_deref())?,
      created_at: decode_dt(&self.created_at)?,
      is_read:    self.is_read,
    })
  }
}

/// Raw strings read directly from a `comments` row.
pub struct RawComment {
  pub card_id:                 String,
  pub comment_id:              String,
  pub comment_text:            String,
  pub created_at:              String,
  pub suppressed_notification: bool,
}

impl RawComment {
  pub fn into_comment(self) -> Result<Comment> {
    Ok(Comment {
      card_id:                 self.card_id,
      comment_id:              self.comment_id,
      comment_text:            self.comment_text,
      created_at:              decode_dt(&self.created_at)?,
      suppressed_notification: self.suppressed_notification,
    })
  }
}
