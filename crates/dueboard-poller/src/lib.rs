//! The poll cycle: fetch board state, diff it against the card store,
//! record change events, apply the comment-suppression policy, and
//! invoke the notification sink.
//!
//! Cycles are strictly sequential — an overrunning cycle delays the next
//! tick rather than running in parallel with it.

pub mod notify;

use std::{collections::HashSet, time::Duration};

use thiserror::Error;
use tokio::time::MissedTickBehavior;

use dueboard_core::{
  card::{NewCard, due_delta},
  clock::Clock,
  source::{BoardSource, NotifySink},
  store::ReminderStore,
  suppression,
};

pub use notify::Notifier;

/// Hard floor on the poll interval, so a misconfigured value cannot
/// hammer the board API.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(10);

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PollerConfig {
  /// Time between cycles; clamped to [`MIN_POLL_INTERVAL`].
  pub interval:       Duration,
  /// The suppression quiet window (§ "reminder delay").
  pub reminder_delay: chrono::Duration,
  /// Bound on one cycle's card-list fetch. A timeout counts as a fetch
  /// failure: the cycle is skipped, not stalled.
  pub fetch_timeout:  Duration,
}

impl Default for PollerConfig {
  fn default() -> Self {
    Self {
      interval:       Duration::from_secs(60),
      reminder_delay: chrono::Duration::hours(24),
      fetch_timeout:  Duration::from_secs(30),
    }
  }
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// A failure inside one poll cycle. Never fatal to the process: the
/// caller logs it and waits for the next tick.
#[derive(Debug, Error)]
pub enum PollError {
  #[error("board fetch failed: {0}")]
  Fetch(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("board fetch timed out after {0:?}")]
  FetchTimeout(Duration),

  #[error("store error for card {card_id}: {source}")]
  Store {
    card_id: String,
    #[source]
    source:  Box<dyn std::error::Error + Send + Sync>,
  },
}

// ─── Cycle stats ─────────────────────────────────────────────────────────────

/// What one cycle did; logged after every cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
  pub cards_seen:      usize,
  /// Cards observed for the first time (baseline upserts, no event).
  pub baselines:       usize,
  /// Due-date change events written.
  pub changes:         usize,
  /// Changes whose notification was withheld by a recent comment.
  pub suppressed:      usize,
  /// Notifications actually delivered.
  pub notified:        usize,
  pub comments_stored: usize,
}

// ─── Poller ──────────────────────────────────────────────────────────────────

/// The periodic task that keeps the stores in sync with the board.
///
/// Sole writer of cards, events and comments; see the store trait for
/// the ownership rules.
pub struct Poller<B, S, N, C> {
  source: B,
  store:  S,
  sink:   N,
  clock:  C,
  config: PollerConfig,
}

impl<B, S, N, C> Poller<B, S, N, C>
where
  B: BoardSource,
  S: ReminderStore,
  N: NotifySink,
  C: Clock,
{
  pub fn new(source: B, store: S, sink: N, clock: C, mut config: PollerConfig) -> Self {
    if config.interval < MIN_POLL_INTERVAL {
      tracing::warn!(
        configured = ?config.interval,
        floor = ?MIN_POLL_INTERVAL,
        "poll interval below floor, clamping"
      );
      config.interval = MIN_POLL_INTERVAL;
    }
    Self { source, store, sink, clock, config }
  }

  /// Run until the process shuts down. Fetch failures and per-card store
  /// errors are logged and never escape.
  pub async fn run(&self) {
    let mut ticker = tokio::time::interval(self.config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(interval = ?self.config.interval, "poller started");
    loop {
      ticker.tick().await;
      match self.run_cycle().await {
        Ok(stats) => tracing::info!(?stats, "poll cycle complete"),
        Err(e) => tracing::warn!(error = %e, "poll cycle skipped"),
      }
    }
  }

  /// Execute exactly one poll cycle.
  ///
  /// On a card-list fetch failure nothing at all is written; per-card
  /// store failures skip that card only. Cards present in the store but
  /// absent from this fetch are left untouched — the system cannot tell
  /// "archived" apart from a transient omission.
  pub async fn run_cycle(&self) -> Result<CycleStats, PollError> {
    let cards = match tokio::time::timeout(
      self.config.fetch_timeout,
      self.source.fetch_cards(),
    )
    .await
    {
      Err(_) => return Err(PollError::FetchTimeout(self.config.fetch_timeout)),
      Ok(Err(e)) => return Err(PollError::Fetch(Box::new(e))),
      Ok(Ok(cards)) => cards,
    };

    let mut stats = CycleStats {
      cards_seen: cards.len(),
      ..Default::default()
    };
    let observed: Vec<String> = cards.iter().map(|c| c.card_id.clone()).collect();
    let mut comments_synced: HashSet<String> = HashSet::new();

    for card in cards {
      let card_id = card.card_id.clone();
      if let Err(e) = self
        .process_card(card, &mut stats, &mut comments_synced)
        .await
      {
        // One bad card must not poison the rest of the cycle.
        tracing::error!(card_id = %card_id, error = %e, "skipping card this cycle");
      }
    }

    for card_id in observed {
      if !comments_synced.contains(&card_id) {
        stats.comments_stored += self.sync_comments(&card_id).await;
      }
    }

    Ok(stats)
  }

  async fn process_card(
    &self,
    card: NewCard,
    stats: &mut CycleStats,
    comments_synced: &mut HashSet<String>,
  ) -> Result<(), PollError> {
    let store_err = |card_id: &str| {
      let card_id = card_id.to_owned();
      move |e: S::Error| PollError::Store { card_id, source: Box::new(e) }
    };

    let prior = self
      .store
      .get_card(&card.card_id)
      .await
      .map_err(store_err(&card.card_id))?;

    let Some(prior) = prior else {
      // First observation is a baseline, never a change.
      self
        .store
        .upsert_card(card.clone())
        .await
        .map_err(store_err(&card.card_id))?;
      stats.baselines += 1;
      return Ok(());
    };

    let Some(delta) = due_delta(&prior, &card) else {
      // Due date unchanged; refresh the mutable fields anyway.
      self
        .store
        .upsert_card(card.clone())
        .await
        .map_err(store_err(&card.card_id))?;
      return Ok(());
    };

    // Refresh this card's comments before deciding suppression, so a
    // comment posted since the last cycle still counts.
    stats.comments_stored += self.sync_comments(&card.card_id).await;
    comments_synced.insert(card.card_id.clone());

    let cached = self
      .store
      .comments_for_card(&card.card_id)
      .await
      .map_err(store_err(&card.card_id))?;
    let detected_at = self.clock.now();
    let suppressor =
      suppression::suppressing_comment(&cached, self.config.reminder_delay, detected_at)
        .cloned();

    let card_id = card.card_id.clone();
    let (event, snapshot) = self
      .store
      .record_due_change(card, delta.old)
      .await
      .map_err(store_err(&card_id))?;
    stats.changes += 1;

    tracing::info!(
      card_id = %event.card_id,
      card = %snapshot.name,
      old = ?event.old_due,
      new = ?event.new_due,
      "due date change recorded"
    );

    match suppressor {
      Some(c) => {
        self
          .store
          .flag_comment_suppressed(&c.card_id, &c.comment_id)
          .await
          .map_err(store_err(&card_id))?;
        stats.suppressed += 1;
        tracing::info!(
          card_id = %card_id,
          comment_id = %c.comment_id,
          "notification suppressed by recent comment"
        );
      }
      None => {
        if let Err(e) = self.sink.notify(&event, &snapshot).await {
          tracing::warn!(card_id = %card_id, error = %e, "notification sink failed");
        } else {
          stats.notified += 1;
        }
      }
    }

    Ok(())
  }

  /// Fetch and cache one card's comments. Comment failures never fail a
  /// cycle — the cache just stays stale for a round.
  async fn sync_comments(&self, card_id: &str) -> usize {
    match self.source.fetch_comments(card_id).await {
      Ok(comments) => match self.store.insert_comments(comments).await {
        Ok(n) => n,
        Err(e) => {
          tracing::error!(card_id = %card_id, error = %e, "failed to store comments");
          0
        }
      },
      Err(e) => {
        tracing::warn!(card_id = %card_id, error = %e, "comment fetch failed");
        0
      }
    }
  }
}
