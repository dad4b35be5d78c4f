//! SQL schema for the Dueboard SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated
//! on the `PRAGMA user_version` number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Last-known state per card. Upserted in place; rows are never deleted.
-- Cards that disappear from the board simply stop being refreshed.
CREATE TABLE IF NOT EXISTS cards (
    card_id      TEXT PRIMARY KEY,
    name         TEXT NOT NULL,
    list_name    TEXT NOT NULL,
    due_date     TEXT,            -- RFC 3339 UTC or NULL
    url          TEXT NOT NULL,
    description  TEXT NOT NULL DEFAULT '',
    last_updated TEXT NOT NULL
);

-- The due-date change ledger. Append-only apart from the one-way
-- is_read transition; no DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS reminders (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    card_id    TEXT NOT NULL,
    old_due    TEXT,
    new_due    TEXT,
    created_at TEXT NOT NULL,
    is_read    INTEGER NOT NULL DEFAULT 0,
    CHECK (old_due IS NOT new_due)
);

-- Comments fetched from the board, deduplicated on (card_id, comment_id).
-- suppressed_notification flips false->true when the comment is the
-- reason a reminder was withheld.
CREATE TABLE IF NOT EXISTS comments (
    card_id                 TEXT NOT NULL,
    comment_id              TEXT NOT NULL,
    comment_text            TEXT NOT NULL,
    created_at              TEXT NOT NULL,
    suppressed_notification INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (card_id, comment_id)
);

CREATE INDEX IF NOT EXISTS reminders_card_idx    ON reminders(card_id);
CREATE INDEX IF NOT EXISTS reminders_created_idx ON reminders(created_at);
CREATE INDEX IF NOT EXISTS comments_card_idx     ON comments(card_id, created_at);

PRAGMA user_version = 1;
";
