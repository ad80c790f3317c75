//! JSON REST API for Plaint.
//!
//! Exposes an axum [`Router`] over an [`IntakePipeline`]. Intake is open;
//! lifecycle routes sit behind the shared-secret gate in [`auth`]. TLS and
//! listening are the caller's responsibility.

pub mod auth;
pub mod complaints;
pub mod error;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use chrono::TimeDelta;
use plaint_core::{
  IntakePipeline,
  classify::{CategoryClassifier, SentimentClassifier},
  store::ComplaintStore,
};
use tower_http::trace::TraceLayer;

pub use auth::SharedSecret;
pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S, SC, CC> {
  pub intake:      Arc<IntakePipeline<S, SC, CC>>,
  pub secret:      Arc<SharedSecret>,
  /// How far back `open-recent` looks from the caller's `current_time`.
  pub open_window: TimeDelta,
}

impl<S, SC, CC> Clone for AppState<S, SC, CC> {
  fn clone(&self) -> Self {
    Self {
      intake:      Arc::clone(&self.intake),
      secret:      Arc::clone(&self.secret),
      open_window: self.open_window,
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the complaint API router.
pub fn router<S, SC, CC>(state: AppState<S, SC, CC>) -> Router
where
  S: ComplaintStore + 'static,
  SC: SentimentClassifier + 'static,
  CC: CategoryClassifier + 'static,
{
  Router::new()
    .route("/complaints/", post(complaints::create::<S, SC, CC>))
    .route("/complaints/close-status/", post(complaints::close::<S, SC, CC>))
    .route("/complaints/open-recent", get(complaints::open_recent::<S, SC, CC>))
    .route("/complaints/{id}", get(complaints::get_one::<S, SC, CC>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use chrono::Utc;
  use plaint_core::{
    ClassifyError,
    classify::{CATEGORY, SENTIMENT, SentimentReading},
  };
  use plaint_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use super::*;
  use crate::auth::API_KEY_HEADER;

  const KEY: &str = "test-key";

  /// Answers immediately with a fixed label, or fails when `None`.
  #[derive(Clone, Copy)]
  struct Fixed(Option<&'static str>);

  impl Fixed {
    fn answer(&self, provider: &'static str) -> Result<String, ClassifyError> {
      self.0.map(str::to_owned).ok_or(ClassifyError::Transport {
        provider,
        message: "connection refused".into(),
      })
    }
  }

  impl SentimentClassifier for Fixed {
    async fn analyze_sentiment(&self, _text: &str) -> Result<SentimentReading, ClassifyError> {
      let label = self.answer(SENTIMENT)?;
      Ok(SentimentReading { label, score: None })
    }
  }

  impl CategoryClassifier for Fixed {
    async fn analyze_category(&self, _text: &str) -> Result<String, ClassifyError> {
      self.answer(CATEGORY)
    }
  }

  async fn make_state(
    sentiment: Option<&'static str>,
    category: Option<&'static str>,
  ) -> AppState<SqliteStore, Fixed, Fixed> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    AppState {
      intake:      Arc::new(IntakePipeline::new(
        Arc::new(store),
        Fixed(sentiment),
        Fixed(category),
      )),
      secret:      Arc::new(SharedSecret::new(KEY)),
      open_window: TimeDelta::hours(1),
    }
  }

  async fn send(
    state: AppState<SqliteStore, Fixed, Fixed>,
    method: &str,
    uri: &str,
    key: Option<&str>,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = key {
      builder = builder.header(API_KEY_HEADER, key);
    }
    let body = match body {
      Some(json) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(json.to_string())
      }
      None => Body::empty(),
    };

    let resp = router(state).oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
  }

  async fn submit(state: &AppState<SqliteStore, Fixed, Fixed>, text: &str) -> Value {
    let (status, body) =
      send(state.clone(), "POST", "/complaints/", None, Some(json!({ "text": text }))).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
  }

  // ── Intake ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_returns_201_with_classification() {
    let state = make_state(Some("NEGATIVE"), Some("оплата")).await;
    let body = submit(&state, "charged twice").await;

    assert!(body["id"].is_i64());
    assert_eq!(body["status"], "open");
    assert_eq!(body["sentiment"], "negative");
    assert_eq!(body["category"], "payment");
  }

  #[tokio::test]
  async fn create_with_unknown_category_returns_null_category() {
    let state = make_state(Some("POSITIVE"), Some("payment")).await;
    let body = submit(&state, "great").await;
    assert_eq!(body["category"], Value::Null);
  }

  #[tokio::test]
  async fn create_when_category_fails_keeps_default() {
    let state = make_state(Some("POSITIVE"), None).await;
    let body = submit(&state, "great").await;
    assert_eq!(body["category"], "other");

    let id = body["id"].as_i64().unwrap();
    let (status, fetched) =
      send(state, "GET", &format!("/complaints/{id}"), Some(KEY), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["text"], "great");
  }

  #[tokio::test]
  async fn create_when_sentiment_fails_returns_500_and_stores_nothing() {
    let state = make_state(None, Some("оплата")).await;
    let (status, body) = send(
      state.clone(),
      "POST",
      "/complaints/",
      None,
      Some(json!({ "text": "anything" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("sentiment"));

    let listed = state
      .intake
      .store()
      .list_open_since(Utc::now(), TimeDelta::hours(1))
      .await
      .unwrap();
    assert!(listed.is_empty());
  }

  #[tokio::test]
  async fn create_with_empty_text_returns_400() {
    let state = make_state(Some("POSITIVE"), Some("оплата")).await;
    let (status, body) =
      send(state, "POST", "/complaints/", None, Some(json!({ "text": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
  }

  #[tokio::test]
  async fn create_with_whitespace_text_is_accepted() {
    let state = make_state(Some("NEUTRAL"), Some("другое")).await;
    let body = submit(&state, " ").await;
    assert_eq!(body["status"], "open");
    assert_eq!(body["sentiment"], "neutral");
  }

  // ── Close ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn close_twice_succeeds_both_times() {
    let state = make_state(Some("NEUTRAL"), Some("другое")).await;
    let id = submit(&state, "resolved already").await["id"].clone();

    for _ in 0..2 {
      let (status, body) = send(
        state.clone(),
        "POST",
        "/complaints/close-status/",
        Some(KEY),
        Some(json!({ "id": id })),
      )
      .await;
      assert_eq!(status, StatusCode::OK, "{body}");
      assert_eq!(body["id"], id);
      assert_eq!(body["status"], "closed");
      assert!(body["timestamp"].is_string());
    }
  }

  #[tokio::test]
  async fn close_unknown_id_returns_404() {
    let state = make_state(Some("NEUTRAL"), Some("другое")).await;
    let (status, _) = send(
      state,
      "POST",
      "/complaints/close-status/",
      Some(KEY),
      Some(json!({ "id": 999 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn close_with_wrong_key_returns_401() {
    let state = make_state(Some("NEUTRAL"), Some("другое")).await;
    let id = submit(&state, "please close").await["id"].clone();

    let (status, _) = send(
      state.clone(),
      "POST",
      "/complaints/close-status/",
      Some("nope"),
      Some(json!({ "id": id })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
      state,
      "POST",
      "/complaints/close-status/",
      None,
      Some(json!({ "id": id })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
  }

  // ── Open recent ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn open_recent_lists_only_open_complaints() {
    let state = make_state(Some("NEGATIVE"), Some("техническая")).await;
    let keep = submit(&state, "app crashes").await["id"].clone();
    let gone = submit(&state, "fixed now").await["id"].clone();
    send(
      state.clone(),
      "POST",
      "/complaints/close-status/",
      Some(KEY),
      Some(json!({ "id": gone })),
    )
    .await;

    let now = Utc::now().format("%Y-%m-%dT%H:%M:%S%.fZ").to_string();
    let (status, body) = send(
      state,
      "GET",
      &format!("/complaints/open-recent?current_time={now}"),
      Some(KEY),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], keep);
    assert_eq!(items[0]["text"], "app crashes");
    assert_eq!(items[0]["status"], "open");
    assert_eq!(items[0]["sentiment"], "negative");
    assert_eq!(items[0]["category"], "technical");
  }

  #[tokio::test]
  async fn open_recent_excludes_complaints_older_than_window() {
    let state = make_state(Some("NEGATIVE"), Some("оплата")).await;
    submit(&state, "refund please").await;

    let later = (Utc::now() + TimeDelta::hours(2))
      .format("%Y-%m-%dT%H:%M:%S")
      .to_string();
    let (status, body) = send(
      state,
      "GET",
      &format!("/complaints/open-recent?current_time={later}"),
      Some(KEY),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
  }

  #[tokio::test]
  async fn open_recent_with_bad_time_returns_400() {
    let state = make_state(Some("NEGATIVE"), Some("оплата")).await;
    let (status, body) = send(
      state.clone(),
      "GET",
      "/complaints/open-recent?current_time=not-a-date",
      Some(KEY),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) =
      send(state, "GET", "/complaints/open-recent", Some(KEY), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn open_recent_requires_key() {
    let state = make_state(Some("NEGATIVE"), Some("оплата")).await;
    let (status, _) = send(
      state,
      "GET",
      "/complaints/open-recent?current_time=2024-05-01T00:00:00Z",
      None,
      None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
  }

  // ── Get one ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn get_unknown_returns_404() {
    let state = make_state(Some("NEGATIVE"), Some("оплата")).await;
    let (status, _) = send(state, "GET", "/complaints/12345", Some(KEY), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }
}
