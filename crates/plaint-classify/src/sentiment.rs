//! Sentiment provider client.

use plaint_core::{
  ClassifyError,
  classify::{SENTIMENT, SentimentClassifier, SentimentReading},
};
use serde::Deserialize;
use tracing::debug;

use crate::{malformed, success_body, transport};

/// Connection settings for the sentiment provider.
#[derive(Clone, Deserialize)]
pub struct SentimentConfig {
  pub endpoint: String,
  /// Sent in the `apikey` header.
  pub api_key:  String,
}

#[derive(Deserialize)]
struct SentimentBody {
  sentiment: String,
  score:     Option<f64>,
}

/// Posts the raw complaint text and reads back `{"sentiment": ..., "score": ...}`.
#[derive(Clone)]
pub struct SentimentClient {
  http:   reqwest::Client,
  config: SentimentConfig,
}

impl SentimentClient {
  pub fn new(http: reqwest::Client, config: SentimentConfig) -> Self {
    Self { http, config }
  }
}

impl SentimentClassifier for SentimentClient {
  async fn analyze_sentiment(&self, text: &str) -> Result<SentimentReading, ClassifyError> {
    debug!(endpoint = %self.config.endpoint, "requesting sentiment");

    let resp = self
      .http
      .post(&self.config.endpoint)
      .header("apikey", &self.config.api_key)
      .body(text.to_owned())
      .send()
      .await
      .map_err(|e| transport(SENTIMENT, e))?;

    let body = success_body(SENTIMENT, resp).await?;
    let parsed: SentimentBody =
      serde_json::from_slice(&body).map_err(|e| malformed(SENTIMENT, e))?;

    Ok(SentimentReading { label: parsed.sentiment, score: parsed.score })
  }
}
