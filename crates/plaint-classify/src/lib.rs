//! HTTP clients for the two external classifiers.
//!
//! - [`SentimentClient`] talks to an APILayer-style sentiment endpoint.
//! - [`CategoryClient`] talks to an OpenAI-style chat-completions endpoint.
//!
//! Both make exactly one request per call and never retry. Per-call timeouts
//! are applied by the intake pipeline.

mod category;
mod sentiment;

use std::time::Duration;

use bytes::Bytes;
use plaint_core::ClassifyError;

pub use category::{CategoryClient, CategoryConfig, category_prompt};
pub use sentiment::{SentimentClient, SentimentConfig};

/// Build the HTTP client shared by both classifiers.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
pub fn http_client(connect_timeout: Duration) -> reqwest::Result<reqwest::Client> {
  reqwest::Client::builder()
    .connect_timeout(connect_timeout)
    .build()
}

fn transport(provider: &'static str, e: reqwest::Error) -> ClassifyError {
  ClassifyError::Transport { provider, message: e.to_string() }
}

fn malformed(provider: &'static str, message: impl ToString) -> ClassifyError {
  ClassifyError::Malformed { provider, message: message.to_string() }
}

/// Return the body of a 2xx response, or the status and body of anything else.
async fn success_body(
  provider: &'static str,
  resp: reqwest::Response,
) -> Result<Bytes, ClassifyError> {
  let status = resp.status();
  if !status.is_success() {
    let body = resp.text().await.unwrap_or_default();
    return Err(ClassifyError::Status { provider, status: status.as_u16(), body });
  }
  resp.bytes().await.map_err(|e| transport(provider, e))
}
