//! The default [`NotifySink`]: a structured log line for every change,
//! plus an optional JSON webhook POST.

use std::time::Duration;

use dueboard_core::{card::CardSnapshot, event::ChangeEvent, source::NotifySink};
use thiserror::Error;

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum NotifyError {
  #[error("webhook delivery failed: {0}")]
  Webhook(#[from] reqwest::Error),

  #[error("webhook returned {0}")]
  Status(reqwest::StatusCode),
}

/// Log-and-webhook notification sink.
///
/// With no webhook configured this only logs, which is the stock
/// deployment — the change ledger itself is the durable record and the
/// query API is how users consume it.
#[derive(Clone)]
pub struct Notifier {
  client:      reqwest::Client,
  webhook_url: Option<String>,
}

impl Notifier {
  pub fn new(webhook_url: Option<String>) -> Result<Self, NotifyError> {
    let client = reqwest::Client::builder()
      .timeout(WEBHOOK_TIMEOUT)
      .build()?;
    Ok(Self { client, webhook_url })
  }
}

impl NotifySink for Notifier {
  type Error = NotifyError;

  async fn notify(&self, event: &ChangeEvent, card: &CardSnapshot) -> Result<(), NotifyError> {
    tracing::info!(
      card = %card.name,
      list = %card.list_name,
      old_due = ?event.old_due,
      new_due = ?event.new_due,
      url = %card.url,
      "due date reminder"
    );

    if let Some(url) = &self.webhook_url {
      let resp = self
        .client
        .post(url)
        .json(&serde_json::json!({ "event": event, "card": card }))
        .send()
        .await?;
      let status = resp.status();
      if !status.is_success() {
        return Err(NotifyError::Status(status));
      }
    }

    Ok(())
  }
}
