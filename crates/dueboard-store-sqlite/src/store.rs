//! [`SqliteStore`] — the SQLite implementation of [`ReminderStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;

use dueboard_core::{
  card::{CardSnapshot, ListCount, NewCard},
  comment::{Comment, NewComment},
  event::{ChangeEvent, DailyCount, ReadStatusCounts},
  store::{ChangeFilter, CommentFilter, ReminderStore},
};

use crate::{
  Error, Result,
  encode::{
    RawCard, RawChangeEvent, RawComment, decode_date, encode_dt, encode_opt_dt,
  },
  schema::SCHEMA,
};

/// Default page size for [`ReminderStore::list_changes`].
const DEFAULT_PAGE_SIZE: usize = 50;

/// Hard cap on a requested page size. Also keeps the `as i64` cast in
/// range: an unclamped `usize::MAX` would wrap to `LIMIT -1`, which
/// SQLite reads as unbounded.
const MAX_PAGE_SIZE: usize = 500;

const CARD_COLUMNS: &str =
  "card_id, name, list_name, due_date, url, description, last_updated";
const EVENT_COLUMNS: &str = "id, card_id, old_due, new_due, created_at, is_read";
const COMMENT_COLUMNS: &str =
  "card_id, comment_id, comment_text, created_at, suppressed_notification";

// ─── Row mappers ─────────────────────────────────────────────────────────────

fn card_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawCard> {
  Ok(RawCard {
    card_id:      row.get(0)?,
    name:         row.get(1)?,
    list_name:    row.get(2)?,
    due_date:     row.get(3)?,
    url:          row.get(4)?,
    description:  row.get(5)?,
    last_updated: row.get(6)?,
  })
}

fn event_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawChangeEvent> {
  Ok(RawChangeEvent {
    id:         row.get(0)?,
    card_id:    row.get(1)?,
    old_due:    row.get(2)?,
    new_due:    row.get(3)?,
    created_at: row.get(4)?,
    is_read:    row.get(5)?,
  })
}

fn comment_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawComment> {
  Ok(RawComment {
    card_id:                 row.get(0)?,
    comment_id:              row.get(1)?,
    comment_text:            row.get(2)?,
    created_at:              row.get(3)?,
    suppressed_notification: row.get(4)?,
  })
}

/// Upsert one card row inside an existing statement context.
fn upsert_card_sql() -> &'static str {
  "INSERT INTO cards (card_id, name, list_name, due_date, url, description, last_updated)
   VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
   ON CONFLICT(card_id) DO UPDATE SET
       name         = excluded.name,
       list_name    = excluded.list_name,
       due_date     = excluded.due_date,
       url          = excluded.url,
       description  = excluded.description,
       last_updated = excluded.last_updated"
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// The Dueboard stores backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── ReminderStore impl ──────────────────────────────────────────────────────

impl ReminderStore for SqliteStore {
  type Error = Error;

  // ── Card store ────────────────────────────────────────────────────────────

  async fn upsert_card(&self, card: NewCard) -> Result<CardSnapshot> {
    let snapshot = CardSnapshot {
      card_id:      card.card_id,
      name:         card.name,
      list_name:    card.list_name,
      due_date:     card.due_date,
      url:          card.url,
      description:  card.description,
      last_updated: Utc::now(),
    };

    let card_id     = snapshot.card_id.clone();
    let name        = snapshot.name.clone();
    let list_name   = snapshot.list_name.clone();
    let due_str     = encode_opt_dt(snapshot.due_date);
    let url         = snapshot.url.clone();
    let description = snapshot.description.clone();
    let updated_str = encode_dt(snapshot.last_updated);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          upsert_card_sql(),
          rusqlite::params![
            card_id,
            name,
            list_name,
            due_str,
            url,
            description,
            updated_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(snapshot)
  }

  async fn get_card(&self, card_id: &str) -> Result<Option<CardSnapshot>> {
    let id = card_id.to_owned();

    let raw: Option<RawCard> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {CARD_COLUMNS} FROM cards WHERE card_id = ?1"),
              rusqlite::params![id],
              card_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCard::into_snapshot).transpose()
  }

  async fn list_cards(&self) -> Result<Vec<CardSnapshot>> {
    let raws: Vec<RawCard> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CARD_COLUMNS} FROM cards
           ORDER BY due_date IS NULL, due_date, card_id"
        ))?;
        let rows = stmt
          .query_map([], card_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCard::into_snapshot).collect()
  }

  async fn cards_per_list(&self) -> Result<Vec<ListCount>> {
    let counts: Vec<(String, i64)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT list_name, COUNT(*)
           FROM cards
           WHERE due_date IS NOT NULL
           GROUP BY list_name
           ORDER BY list_name",
        )?;
        let rows = stmt
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(
      counts
        .into_iter()
        .map(|(list_name, count)| ListCount {
          list_name,
          count: count as u64,
        })
        .collect(),
    )
  }

  // ── Change ledger ─────────────────────────────────────────────────────────

  async fn append_change(
    &self,
    card_id: &str,
    old_due: Option<DateTime<Utc>>,
    new_due: Option<DateTime<Utc>>,
  ) -> Result<ChangeEvent> {
    if old_due == new_due {
      return Err(dueboard_core::Error::NoOpChange(card_id.to_owned()).into());
    }

    let event = ChangeEvent {
      id: 0, // assigned below
      card_id: card_id.to_owned(),
      old_due,
      new_due,
      created_at: Utc::now(),
      is_read: false,
    };

    let id_param      = event.card_id.clone();
    let old_str       = encode_opt_dt(old_due);
    let new_str       = encode_opt_dt(new_due);
    let created_str   = encode_dt(event.created_at);

    let id: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO reminders (card_id, old_due, new_due, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_param, old_str, new_str, created_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(ChangeEvent { id, ..event })
  }

  async fn record_due_change(
    &self,
    card: NewCard,
    old_due: Option<DateTime<Utc>>,
  ) -> Result<(ChangeEvent, CardSnapshot)> {
    if old_due == card.due_date {
      return Err(dueboard_core::Error::NoOpChange(card.card_id).into());
    }

    let now = Utc::now();
    let event = ChangeEvent {
      id: 0, // assigned below
      card_id: card.card_id.clone(),
      old_due,
      new_due: card.due_date,
      created_at: now,
      is_read: false,
    };
    let snapshot = CardSnapshot {
      card_id:      card.card_id,
      name:         card.name,
      list_name:    card.list_name,
      due_date:     card.due_date,
      url:          card.url,
      description:  card.description,
      last_updated: now,
    };

    let ev_card_id  = event.card_id.clone();
    let old_str     = encode_opt_dt(event.old_due);
    let new_str     = encode_opt_dt(event.new_due);
    let created_str = encode_dt(event.created_at);

    let card_id     = snapshot.card_id.clone();
    let name        = snapshot.name.clone();
    let list_name   = snapshot.list_name.clone();
    let due_str     = encode_opt_dt(snapshot.due_date);
    let url         = snapshot.url.clone();
    let description = snapshot.description.clone();
    let updated_str = encode_dt(snapshot.last_updated);

    // Event write and snapshot upsert commit together: a crash mid-cycle
    // can never leave one without the other.
    let id: i64 = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO reminders (card_id, old_due, new_due, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![ev_card_id, old_str, new_str, created_str],
        )?;
        let id = tx.last_insert_rowid();
        tx.execute(
          upsert_card_sql(),
          rusqlite::params![
            card_id,
            name,
            list_name,
            due_str,
            url,
            description,
            updated_str,
          ],
        )?;
        tx.commit()?;
        Ok(id)
      })
      .await?;

    Ok((ChangeEvent { id, ..event }, snapshot))
  }

  async fn list_changes(
    &self,
    filter: ChangeFilter,
  ) -> Result<(Vec<ChangeEvent>, u64)> {
    let is_read = filter.is_read;
    let limit   = filter.limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE) as i64;
    let offset: i64 = filter.offset.unwrap_or(0).try_into().unwrap_or(i64::MAX);

    let (raws, total): (Vec<RawChangeEvent>, i64) = self
      .conn
      .call(move |conn| {
        let total: i64 = conn.query_row(
          "SELECT COUNT(*) FROM reminders WHERE (?1 IS NULL OR is_read = ?1)",
          rusqlite::params![is_read],
          |row| row.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
          "SELECT {EVENT_COLUMNS} FROM reminders
           WHERE (?1 IS NULL OR is_read = ?1)
           ORDER BY created_at DESC, id DESC
           LIMIT ?2 OFFSET ?3"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![is_read, limit, offset], event_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((rows, total))
      })
      .await?;

    let events = raws
      .into_iter()
      .map(RawChangeEvent::into_event)
      .collect::<Result<Vec<_>>>()?;

    Ok((events, total as u64))
  }

  async fn changes_for_card(&self, card_id: &str) -> Result<Vec<ChangeEvent>> {
    let id = card_id.to_owned();

    let raws: Vec<RawChangeEvent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {EVENT_COLUMNS} FROM reminders
           WHERE card_id = ?1
           ORDER BY created_at DESC, id DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id], event_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawChangeEvent::into_event).collect()
  }

  async fn mark_read(&self, event_id: i64) -> Result<Option<ChangeEvent>> {
    let raw: Option<RawChangeEvent> = self
      .conn
      .call(move |conn| {
        // Idempotent by construction: re-marking a read event matches the
        // row again and leaves it unchanged.
        conn.execute(
          "UPDATE reminders SET is_read = 1 WHERE id = ?1",
          rusqlite::params![event_id],
        )?;
        Ok(
          conn
            .query_row(
              &format!("SELECT {EVENT_COLUMNS} FROM reminders WHERE id = ?1"),
              rusqlite::params![event_id],
              event_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawChangeEvent::into_event).transpose()
  }

  async fn count_by_day(
    &self,
    since: Option<DateTime<Utc>>,
  ) -> Result<Vec<DailyCount>> {
    let since_str = encode_opt_dt(since);

    let counts: Vec<(String, i64)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT date(created_at) AS day, COUNT(*)
           FROM reminders
           WHERE (?1 IS NULL OR created_at >= ?1)
           GROUP BY day
           ORDER BY day",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![since_str], |row| {
            Ok((row.get(0)?, row.get(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    counts
      .into_iter()
      .map(|(day, count)| {
        Ok(DailyCount {
          date:  decode_date(&day)?,
          count: count as u64,
        })
      })
      .collect()
  }

  async fn count_by_read_status(&self) -> Result<ReadStatusCounts> {
    let rows: Vec<(bool, i64)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT is_read, COUNT(*) FROM reminders GROUP BY is_read",
        )?;
        let rows = stmt
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut counts = ReadStatusCounts::default();
    for (is_read, count) in rows {
      if is_read {
        counts.read = count as u64;
      } else {
        counts.unread = count as u64;
      }
    }
    Ok(counts)
  }

  // ── Comment cache ─────────────────────────────────────────────────────────

  async fn insert_comments(&self, comments: Vec<NewComment>) -> Result<usize> {
    let inserted: usize = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut inserted = 0;
        {
          let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO comments
               (card_id, comment_id, comment_text, created_at)
             VALUES (?1, ?2, ?3, ?4)",
          )?;
          for c in &comments {
            inserted += stmt.execute(rusqlite::params![
              c.card_id,
              c.comment_id,
              c.comment_text,
              encode_dt(c.created_at),
            ])?;
          }
        }
        tx.commit()?;
        Ok(inserted)
      })
      .await?;

    Ok(inserted)
  }

  async fn comments_for_card(&self, card_id: &str) -> Result<Vec<Comment>> {
    let id = card_id.to_owned();

    let raws: Vec<RawComment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {COMMENT_COLUMNS} FROM comments
           WHERE card_id = ?1
           ORDER BY created_at DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id], comment_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawComment::into_comment).collect()
  }

  async fn latest_comment(&self, card_id: &str) -> Result<Option<Comment>> {
    let id = card_id.to_owned();

    let raw: Option<RawComment> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {COMMENT_COLUMNS} FROM comments
                 WHERE card_id = ?1
                 ORDER BY created_at DESC
                 LIMIT 1"
              ),
              rusqlite::params![id],
              comment_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawComment::into_comment).transpose()
  }

  async fn list_comments(&self, filter: CommentFilter) -> Result<Vec<Comment>> {
    let card_id    = filter.card_id;
    let suppressed = filter.suppressed;
    let after_str  = encode_opt_dt(filter.created_after);

    let raws: Vec<RawComment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {COMMENT_COLUMNS} FROM comments
           WHERE (?1 IS NULL OR card_id = ?1)
             AND (?2 IS NULL OR suppressed_notification = ?2)
             AND (?3 IS NULL OR created_at >= ?3)
           ORDER BY created_at DESC"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![card_id, suppressed, after_str],
            comment_from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawComment::into_comment).collect()
  }

  async fn flag_comment_suppressed(
    &self,
    card_id: &str,
    comment_id: &str,
  ) -> Result<()> {
    let card = card_id.to_owned();
    let comment = comment_id.to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE comments SET suppressed_notification = 1
           WHERE card_id = ?1 AND comment_id = ?2",
          rusqlite::params![card, comment],
        )?;
        Ok(())
      })
      .await?;

    Ok(())
  }

  async fn suppressed_comment_count(&self) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM comments WHERE suppressed_notification = 1",
          [],
          |row| row.get(0),
        )?)
      })
      .await?;

    Ok(count as u64)
  }
}
