//! plaint server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) plus
//! `PLAINT_*` environment overrides, opens the SQLite store, wires both
//! classifier clients into the intake pipeline, and serves the JSON API.

mod config;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use anyhow::Context as _;
use clap::Parser;
use plaint_api::{AppState, SharedSecret};
use plaint_classify::{CategoryClient, SentimentClient};
use plaint_core::IntakePipeline;
use plaint_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

#[derive(Parser)]
#[command(author, version, about = "Plaint complaint intake server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let server_cfg = ServerConfig::load(&cli.config)?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let http = plaint_classify::http_client(Duration::from_secs(5))
    .context("failed to build HTTP client")?;
  let sentiment = SentimentClient::new(http.clone(), server_cfg.sentiment.clone());
  let category = CategoryClient::new(http, server_cfg.category.clone());

  let intake = IntakePipeline::new(Arc::new(store), sentiment, category)
    .with_timeout(server_cfg.classifier_timeout());

  let state = AppState {
    intake:      Arc::new(intake),
    secret:      Arc::new(SharedSecret::new(&server_cfg.api_key)),
    open_window: server_cfg.open_window(),
  };

  let app = plaint_api::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
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
