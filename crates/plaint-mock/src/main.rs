//! plaint-mock binary: serves both mock providers on one port.
//!
//! Point the server at it with
//! `sentiment.endpoint = "http://127.0.0.1:8001/v1/sentiment"` and
//! `category.endpoint = "http://127.0.0.1:8001/v1/chat/completions"`, both
//! with `api_key = "mock-api-key"`.

use anyhow::Context as _;
use clap::Parser;
use plaint_mock::{DEFAULT_API_KEY, MockState};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Mock sentiment and category providers")]
struct Cli {
  #[arg(long, default_value = "127.0.0.1")]
  host:    String,
  #[arg(short, long, default_value_t = 8001)]
  port:    u16,
  /// Key both endpoints accept.
  #[arg(long, default_value = DEFAULT_API_KEY)]
  api_key: String,
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
  let app = plaint_mock::router(MockState::new(&cli.api_key));
  let address = format!("{}:{}", cli.host, cli.port);

  tracing::info!("Mock providers listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
