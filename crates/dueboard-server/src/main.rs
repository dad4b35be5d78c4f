//! dueboard server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, spawns the board poller, and serves the JSON
//! API over HTTP.
//!
//! Every setting can also come from the environment with a `DUEBOARD_`
//! prefix, e.g. `DUEBOARD_TRELLO__TOKEN` for the nested `trello.token`.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use anyhow::Context as _;
use axum::Router;
use clap::Parser;
use dueboard_core::clock::SystemClock;
use dueboard_poller::{Notifier, Poller, PollerConfig};
use dueboard_store_sqlite::SqliteStore;
use dueboard_trello::{TrelloClient, TrelloConfig};
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Dueboard due-date monitor")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
struct TrelloSettings {
  api_key:  String,
  token:    String,
  board_id: String,
}

/// Runtime server configuration, deserialised from `config.toml` plus
/// `DUEBOARD_*` environment overrides.
#[derive(Debug, Clone, Deserialize)]
struct ServerConfig {
  #[serde(default = "default_host")]
  host:                 String,
  #[serde(default = "default_port")]
  port:                 u16,
  #[serde(default = "default_store_path")]
  store_path:           PathBuf,
  trello:               TrelloSettings,
  #[serde(default = "default_poll_interval")]
  poll_interval_secs:   u64,
  #[serde(default = "default_reminder_delay")]
  reminder_delay_hours: i64,
  #[serde(default = "default_fetch_timeout")]
  fetch_timeout_secs:   u64,
  /// Optional webhook POST target; absent means log-only notifications.
  webhook_url:          Option<String>,
}

fn default_host() -> String {
  "127.0.0.1".to_string()
}

fn default_port() -> u16 {
  5000
}

fn default_store_path() -> PathBuf {
  PathBuf::from("dueboard.db")
}

fn default_poll_interval() -> u64 {
  60
}

fn default_reminder_delay() -> i64 {
  24
}

fn default_fetch_timeout() -> u64 {
  30
}

// ─── Entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("DUEBOARD").separator("__"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Expand `~` in store path.
  let store_path = expand_tilde(&server_cfg.store_path);

  // Open SQLite store.
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  // Board source and notification sink.
  let trello = TrelloClient::new(TrelloConfig::new(
    server_cfg.trello.api_key.clone(),
    server_cfg.trello.token.clone(),
    server_cfg.trello.board_id.clone(),
  ))
  .context("failed to build Trello client")?;

  let notifier = Notifier::new(server_cfg.webhook_url.clone())
    .context("failed to build notification sink")?;

  let reminder_delay = chrono::Duration::hours(server_cfg.reminder_delay_hours);
  let poller = Poller::new(
    trello,
    store.clone(),
    notifier,
    SystemClock,
    PollerConfig {
      interval: Duration::from_secs(server_cfg.poll_interval_secs),
      reminder_delay,
      fetch_timeout: Duration::from_secs(server_cfg.fetch_timeout_secs),
    },
  );

  tokio::spawn(async move { poller.run().await });

  // HTTP API.
  let app = Router::new()
    .nest("/api", dueboard_api::api_router(Arc::new(store), reminder_delay))
    .layer(TraceLayer::new_for_http());

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "failed to install shutdown handler");
    return std::future::pending().await;
  }
  tracing::info!("shutdown signal received");
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
