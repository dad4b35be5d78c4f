//! Parsing boundary between the loosely-typed Trello JSON and the domain
//! types.
//!
//! Trello responses are full of optional fields; everything the tracker
//! actually relies on is validated here, and a missing or invalid
//! required field fails with [`Error::MalformedSourceData`] instead of
//! propagating nulls into the stores.

use chrono::{DateTime, Utc};
use dueboard_core::{card::NewCard, comment::NewComment};
use serde::Deserialize;

use crate::{Error, Result};

fn parse_dt(field: &str, s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::MalformedSourceData(format!("bad {field} timestamp {s:?}: {e}")))
}

// ─── Cards ───────────────────────────────────────────────────────────────────

/// One element of `GET /boards/{id}/cards`.
#[derive(Debug, Deserialize)]
pub struct RawCard {
  pub id:   Option<String>,
  pub name: Option<String>,
  pub desc: Option<String>,
  pub url:  Option<String>,
  pub due:  Option<String>,
  pub list: Option<RawList>,
}

#[derive(Debug, Deserialize)]
pub struct RawList {
  pub name: Option<String>,
}

impl RawCard {
  pub fn into_card(self) -> Result<NewCard> {
    let card_id = self
      .id
      .ok_or_else(|| Error::MalformedSourceData("card missing id".into()))?;
    let name = self
      .name
      .ok_or_else(|| Error::MalformedSourceData(format!("card {card_id} missing name")))?;
    let due_date = self
      .due
      .as_deref()
      .map(|s| parse_dt("due", s))
      .transpose()?;

    Ok(NewCard {
      // Trello omits the url on some token scopes; fall back to the
      // canonical short link.
      url: self
        .url
        .unwrap_or_else(|| format!("https://trello.com/c/{card_id}")),
      list_name: self
        .list
        .and_then(|l| l.name)
        .unwrap_or_else(|| "Unknown List".to_string()),
      description: self.desc.unwrap_or_default(),
      card_id,
      name,
      due_date,
    })
  }
}

// ─── Comments ────────────────────────────────────────────────────────────────

/// One element of `GET /cards/{id}/actions?filter=commentCard`.
#[derive(Debug, Deserialize)]
pub struct RawAction {
  pub id:   Option<String>,
  pub date: Option<String>,
  pub data: Option<RawActionData>,
}

#[derive(Debug, Deserialize)]
pub struct RawActionData {
  pub text: Option<String>,
}

impl RawAction {
  pub fn into_comment(self, card_id: &str) -> Result<NewComment> {
    let comment_id = self.id.ok_or_else(|| {
      Error::MalformedSourceData(format!("comment on card {card_id} missing id"))
    })?;
    let date = self.date.ok_or_else(|| {
      Error::MalformedSourceData(format!("comment {comment_id} missing date"))
    })?;

    Ok(NewComment {
      card_id:      card_id.to_owned(),
      comment_id,
      comment_text: self.data.and_then(|d| d.text).unwrap_or_default(),
      created_at:   parse_dt("date", &date)?,
    })
  }
}
