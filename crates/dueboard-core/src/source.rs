//! Collaborator contracts: the external board data source and the
//! notification sink.
//!
//! Both are pluggable. The poller treats a source failure as "skip this
//! cycle" and a sink failure as "log and move on" — neither is ever
//! fatal to the process.

use std::future::Future;

use crate::{
  card::{CardSnapshot, NewCard},
  comment::NewComment,
  event::ChangeEvent,
};

/// A board data source: whatever system holds the cards being tracked.
pub trait BoardSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Current state of every card on the tracked board.
  fn fetch_cards(
    &self,
  ) -> impl Future<Output = Result<Vec<NewCard>, Self::Error>> + Send + '_;

  /// All comments currently visible on one card.
  fn fetch_comments<'a>(
    &'a self,
    card_id: &'a str,
  ) -> impl Future<Output = Result<Vec<NewComment>, Self::Error>> + Send + 'a;
}

/// An outbound notification sink. Delivery is best-effort; the poller
/// logs and swallows failures.
pub trait NotifySink: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn notify<'a>(
    &'a self,
    event: &'a ChangeEvent,
    card: &'a CardSnapshot,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
