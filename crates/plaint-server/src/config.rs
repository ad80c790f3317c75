//! Runtime server configuration, deserialised from `config.toml` and
//! `PLAINT_*` environment variables.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::Context as _;
use chrono::TimeDelta;
use plaint_classify::{CategoryConfig, SentimentConfig};
use serde::Deserialize;

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 8000 }
fn default_store_path() -> PathBuf { PathBuf::from("complaints.db") }
fn default_classifier_timeout_secs() -> u64 { 10 }
fn default_open_window_hours() -> i64 { 1 }

#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                    String,
  #[serde(default = "default_port")]
  pub port:                    u16,
  #[serde(default = "default_store_path")]
  pub store_path:              PathBuf,
  /// Shared secret expected in the `complaint-api-key` header.
  pub api_key:                 String,
  #[serde(default = "default_classifier_timeout_secs")]
  pub classifier_timeout_secs: u64,
  #[serde(default = "default_open_window_hours")]
  pub open_window_hours:       i64,
  pub sentiment:               SentimentConfig,
  pub category:                CategoryConfig,
}

/// `PLAINT_API_KEY` sets `api_key`; nested keys use `__`, e.g.
/// `PLAINT_SENTIMENT__API_KEY`.
fn environment() -> config::Environment {
  config::Environment::with_prefix("PLAINT")
    .prefix_separator("_")
    .separator("__")
    .try_parsing(true)
}

impl ServerConfig {
  /// Layer the optional TOML file under `PLAINT_*` environment variables.
  pub fn load(path: &Path) -> anyhow::Result<Self> { Self::load_with(path, environment()) }

  fn load_with(path: &Path, env: config::Environment) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(env)
      .build()
      .context("failed to read config file")?;

    let cfg: Self = settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")?;
    cfg.validate()?;
    Ok(cfg)
  }

  fn validate(&self) -> anyhow::Result<()> {
    anyhow::ensure!(!self.api_key.is_empty(), "api_key must not be empty");
    anyhow::ensure!(self.classifier_timeout_secs > 0, "classifier_timeout_secs must be positive");
    anyhow::ensure!(self.open_window_hours > 0, "open_window_hours must be positive");
    Ok(())
  }

  pub fn classifier_timeout(&self) -> Duration {
    Duration::from_secs(self.classifier_timeout_secs)
  }

  pub fn open_window(&self) -> TimeDelta { TimeDelta::hours(self.open_window_hours) }
}
