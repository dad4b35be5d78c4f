//! Card snapshots — the last-known state of every tracked card.
//!
//! A card row is created on first observation, overwritten in place on
//! every later poll, and never deleted. Cards that disappear from the
//! board simply stop being refreshed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The state of a single board card as of the last poll that observed it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardSnapshot {
  /// Opaque, stable identifier assigned by the board.
  pub card_id:      String,
  pub name:         String,
  pub list_name:    String,
  pub due_date:     Option<DateTime<Utc>>,
  pub url:          String,
  pub description:  String,
  /// Bumped on every poll that observes the card; monotonically
  /// non-decreasing per card.
  pub last_updated: DateTime<Utc>,
}

/// A card as fetched from the board source, before the store has assigned
/// `last_updated`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCard {
  pub card_id:     String,
  pub name:        String,
  pub list_name:   String,
  pub due_date:    Option<DateTime<Utc>>,
  pub url:         String,
  pub description: String,
}

/// How many cards with a due date sit in one board list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListCount {
  pub list_name: String,
  pub count:     u64,
}

/// A detected due-date transition for a single card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueDelta {
  pub old: Option<DateTime<Utc>>,
  pub new: Option<DateTime<Utc>>,
}

/// Compare a stored snapshot against a fresh observation of the same card.
///
/// Returns `Some` only when the due date actually changed. Absent→present
/// and present→absent transitions both count; two absent values do not.
/// Name, list, url and description changes are deliberately invisible
/// here: only due-date deltas enter the ledger.
pub fn due_delta(prior: &CardSnapshot, incoming: &NewCard) -> Option<DueDelta> {
  if prior.due_date == incoming.due_date {
    None
  } else {
    Some(DueDelta {
      old: prior.due_date,
      new: incoming.due_date,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn snapshot(due: Option<DateTime<Utc>>) -> CardSnapshot {
    CardSnapshot {
      card_id:      "c1".into(),
      name:         "Ship it".into(),
      list_name:    "Doing".into(),
      due_date:     due,
      url:          "https://board.example/c/c1".into(),
      description:  String::new(),
      last_updated: Utc::now(),
    }
  }

  fn observation(due: Option<DateTime<Utc>>) -> NewCard {
    NewCard {
      card_id:     "c1".into(),
      name:        "Ship it".into(),
      list_name:   "Doing".into(),
      due_date:    due,
      url:         "https://board.example/c/c1".into(),
      description: String::new(),
    }
  }

  fn dt(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap()
  }

  #[test]
  fn unchanged_due_date_is_not_a_delta() {
    assert!(due_delta(&snapshot(Some(dt(1))), &observation(Some(dt(1)))).is_none());
    assert!(due_delta(&snapshot(None), &observation(None)).is_none());
  }

  #[test]
  fn changed_due_date_is_a_delta() {
    let delta = due_delta(&snapshot(Some(dt(1))), &observation(Some(dt(2)))).unwrap();
    assert_eq!(delta.old, Some(dt(1)));
    assert_eq!(delta.new, Some(dt(2)));
  }

  #[test]
  fn absent_to_present_and_back_are_deltas() {
    let set = due_delta(&snapshot(None), &observation(Some(dt(3)))).unwrap();
    assert_eq!(set.old, None);
    assert_eq!(set.new, Some(dt(3)));

    let cleared = due_delta(&snapshot(Some(dt(3))), &observation(None)).unwrap();
    assert_eq!(cleared.old, Some(dt(3)));
    assert_eq!(cleared.new, None);
  }

  #[test]
  fn other_field_changes_are_invisible() {
    let mut incoming = observation(Some(dt(1)));
    incoming.name = "Renamed".into();
    incoming.list_name = "Done".into();
    assert!(due_delta(&snapshot(Some(dt(1))), &incoming).is_none());
  }
}
