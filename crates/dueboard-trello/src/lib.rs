//! Trello client — the concrete [`BoardSource`] for the due-date monitor.
//!
//! Authentication, field selection and JSON decoding live here; the rest
//! of the system only ever sees [`NewCard`] and [`NewComment`] values or
//! a typed error.

pub mod error;
pub mod parse;

pub use error::{Error, Result};

use std::time::Duration;

use dueboard_core::{card::NewCard, comment::NewComment, source::BoardSource};
use serde::de::DeserializeOwned;

use parse::{RawAction, RawCard};

/// The public Trello REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.trello.com/1";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for the Trello API.
#[derive(Debug, Clone)]
pub struct TrelloConfig {
  pub api_key:  String,
  pub token:    String,
  pub board_id: String,
  pub base_url: String,
}

impl TrelloConfig {
  pub fn new(
    api_key: impl Into<String>,
    token: impl Into<String>,
    board_id: impl Into<String>,
  ) -> Self {
    Self {
      api_key:  api_key.into(),
      token:    token.into(),
      board_id: board_id.into(),
      base_url: DEFAULT_BASE_URL.to_string(),
    }
  }
}

/// Async HTTP client for one Trello board.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct TrelloClient {
  client: reqwest::Client,
  config: TrelloConfig,
}

impl TrelloClient {
  pub fn new(config: TrelloConfig) -> Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(REQUEST_TIMEOUT)
      .build()?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{path}", self.config.base_url.trim_end_matches('/'))
  }

  async fn get_json<T: DeserializeOwned>(
    &self,
    path: &str,
    extra: &[(&str, &str)],
  ) -> Result<T> {
    let mut query: Vec<(&str, &str)> = vec![
      ("key", self.config.api_key.as_str()),
      ("token", self.config.token.as_str()),
    ];
    query.extend_from_slice(extra);

    let resp = self
      .client
      .get(self.url(path))
      .query(&query)
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      return Err(Error::SourceUnavailable(format!("GET {path} → {status}")));
    }

    Ok(resp.json().await?)
  }
}

impl BoardSource for TrelloClient {
  type Error = Error;

  async fn fetch_cards(&self) -> Result<Vec<NewCard>> {
    let path = format!("/boards/{}/cards", self.config.board_id);
    let raws: Vec<RawCard> = self
      .get_json(&path, &[("fields", "id,due,name,desc,url"), ("list", "true")])
      .await?;

    raws.into_iter().map(RawCard::into_card).collect()
  }

  async fn fetch_comments(&self, card_id: &str) -> Result<Vec<NewComment>> {
    let path = format!("/cards/{card_id}/actions");
    let raws: Vec<RawAction> = self
      .get_json(&path, &[("filter", "commentCard")])
      .await?;

    raws
      .into_iter()
      .map(|a| a.into_comment(card_id))
      .collect()
  }
}
