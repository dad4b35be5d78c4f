//! The comment-suppression policy.
//!
//! A due-date change shortly after a human comment on the same card is
//! presumed to be an intentional, already-acknowledged edit. The
//! notification is withheld to reduce noise; the change event itself is
//! still recorded.

use chrono::{DateTime, Duration, Utc};

use crate::comment::{Comment, NotificationStatus};

/// Find the comment that suppresses a change detected at `at`, if any.
///
/// A comment qualifies when its timestamp falls inside the sliding window
/// `(at - window, at]`. When several qualify, only the most recent one is
/// returned — and only that one should be flagged.
pub fn suppressing_comment<'a>(
  comments: &'a [Comment],
  window: Duration,
  at: DateTime<Utc>,
) -> Option<&'a Comment> {
  comments
    .iter()
    .filter(|c| c.created_at <= at && at - c.created_at < window)
    .max_by_key(|c| c.created_at)
}

/// Evaluate the muted view for a card from its most recent comment.
pub fn notification_status(
  latest: Option<&Comment>,
  window: Duration,
  now: DateTime<Utc>,
) -> NotificationStatus {
  match latest {
    Some(c) if c.created_at <= now && now - c.created_at < window => NotificationStatus {
      notifications_muted: true,
      reason:              format!(
        "last comment at {} is within the {}h quiet window",
        c.created_at.to_rfc3339(),
        window.num_hours(),
      ),
    },
    Some(c) => NotificationStatus {
      notifications_muted: false,
      reason:              format!(
        "last comment at {} is outside the {}h quiet window",
        c.created_at.to_rfc3339(),
        window.num_hours(),
      ),
    },
    None => NotificationStatus {
      notifications_muted: false,
      reason:              "no comments on this card".to_string(),
    },
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn comment(id: &str, created_at: DateTime<Utc>) -> Comment {
    Comment {
      card_id:                 "c1".into(),
      comment_id:              id.into(),
      comment_text:            "looks fine".into(),
      created_at,
      suppressed_notification: false,
    }
  }

  fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
  }

  #[test]
  fn comment_one_hour_before_suppresses() {
    let comments = vec![comment("a", t0() - Duration::hours(1))];
    let hit = suppressing_comment(&comments, Duration::hours(24), t0());
    assert_eq!(hit.unwrap().comment_id, "a");
  }

  #[test]
  fn comment_outside_window_does_not_suppress() {
    let comments = vec![comment("a", t0() - Duration::hours(48))];
    assert!(suppressing_comment(&comments, Duration::hours(24), t0()).is_none());
  }

  #[test]
  fn comment_after_detection_time_does_not_suppress() {
    let comments = vec![comment("a", t0() + Duration::minutes(5))];
    assert!(suppressing_comment(&comments, Duration::hours(24), t0()).is_none());
  }

  // Pins the "most recent qualifying comment" reading: with two comments
  // inside the window, only the newer one is chosen.
  #[test]
  fn most_recent_qualifying_comment_wins() {
    let comments = vec![
      comment("older", t0() - Duration::hours(20)),
      comment("newer", t0() - Duration::hours(2)),
      comment("too_old", t0() - Duration::hours(30)),
    ];
    let hit = suppressing_comment(&comments, Duration::hours(24), t0());
    assert_eq!(hit.unwrap().comment_id, "newer");
  }

  #[test]
  fn window_boundary_is_exclusive() {
    let comments = vec![comment("edge", t0() - Duration::hours(24))];
    assert!(suppressing_comment(&comments, Duration::hours(24), t0()).is_none());
  }

  #[test]
  fn muted_with_fresh_comment() {
    let latest = comment("a", t0() - Duration::hours(2));
    let status = notification_status(Some(&latest), Duration::hours(24), t0());
    assert!(status.notifications_muted);
    assert!(status.reason.contains("within"));
  }

  #[test]
  fn not_muted_with_stale_comment() {
    let latest = comment("a", t0() - Duration::hours(48));
    let status = notification_status(Some(&latest), Duration::hours(24), t0());
    assert!(!status.notifications_muted);
  }

  #[test]
  fn not_muted_without_comments() {
    let status = notification_status(None, Duration::hours(24), t0());
    assert!(!status.notifications_muted);
    assert_eq!(status.reason, "no comments on this card");
  }
}
