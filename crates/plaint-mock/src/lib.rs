//! Stand-in sentiment and category providers for local development.
//!
//! Both endpoints speak the same wire format as the real services, with
//! deterministic keyword rules in place of a model:
//!
//! | Path | Auth | Answer |
//! |------|------|--------|
//! | `POST /v1/sentiment` | `apikey: <key>` | `good`/`love` → POSITIVE, `bad`/`hate` → NEGATIVE, `ok`/`fine` → WEAK_POSITIVE, else NEUTRAL |
//! | `POST /v1/chat/completions` | `Authorization: Bearer <key>` | `!оплата` → оплата, `!техническая` → техническая, else другое |

use std::sync::Arc;

use axum::{
  Json, Router,
  extract::State,
  http::{HeaderMap, StatusCode, header::AUTHORIZATION},
  response::{IntoResponse, Response},
  routing::post,
};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

/// Key both mock endpoints accept unless told otherwise.
pub const DEFAULT_API_KEY: &str = "mock-api-key";

/// Longer sentiment input is refused with 413, as the real service does.
pub const MAX_TEXT_LENGTH: usize = 2000;

#[derive(Clone)]
pub struct MockState {
  api_key: Arc<str>,
}

impl MockState {
  pub fn new(api_key: &str) -> Self { Self { api_key: Arc::from(api_key) } }
}

pub fn router(state: MockState) -> Router {
  Router::new()
    .route("/v1/sentiment", post(sentiment))
    .route("/v1/chat/completions", post(chat_completions))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Sentiment ───────────────────────────────────────────────────────────────

fn sentiment_error(status: StatusCode, message: &str) -> Response {
  (status, Json(json!({ "error": message }))).into_response()
}

/// Keyword rules, checked in order.
pub fn sentiment_label(text: &str) -> &'static str {
  let lower = text.to_lowercase();
  if lower.contains("good") || lower.contains("love") {
    "POSITIVE"
  } else if lower.contains("bad") || lower.contains("hate") {
    "NEGATIVE"
  } else if lower.contains("ok") || lower.contains("fine") {
    "WEAK_POSITIVE"
  } else {
    "NEUTRAL"
  }
}

fn sentiment_score(label: &str) -> f64 {
  match label {
    "POSITIVE" => 0.8,
    "WEAK_POSITIVE" => 0.4,
    "NEGATIVE" => -0.8,
    _ => 0.0,
  }
}

async fn sentiment(
  State(state): State<MockState>,
  headers: HeaderMap,
  text: String,
) -> Response {
  let presented = headers.get("apikey").and_then(|v| v.to_str().ok());
  if presented != Some(&*state.api_key) {
    return sentiment_error(StatusCode::UNAUTHORIZED, "Invalid API Key");
  }
  if text.trim().is_empty() {
    return sentiment_error(StatusCode::BAD_REQUEST, "text parameter is required");
  }
  if text.chars().count() > MAX_TEXT_LENGTH {
    return sentiment_error(
      StatusCode::PAYLOAD_TOO_LARGE,
      "text too long, maximum 2000 characters",
    );
  }

  let label = sentiment_label(&text);
  tracing::debug!(label, "mock sentiment");
  Json(json!({ "score": sentiment_score(label), "text": text, "sentiment": label }))
    .into_response()
}

// ─── Chat completions ────────────────────────────────────────────────────────

fn chat_error(status: StatusCode, detail: &str) -> Response {
  (status, Json(json!({ "detail": detail }))).into_response()
}

/// Picks a category from `!`-prefixed markers in the prompt.
pub fn category_answer(prompt: &str) -> &'static str {
  let lower = prompt.to_lowercase();
  if lower.contains("!оплата") {
    "оплата"
  } else if lower.contains("!техническая") {
    "техническая"
  } else {
    "другое"
  }
}

async fn chat_completions(
  State(state): State<MockState>,
  headers: HeaderMap,
  Json(body): Json<Value>,
) -> Response {
  let expected = format!("Bearer {}", state.api_key);
  let presented = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
  if presented != Some(expected.as_str()) {
    return chat_error(StatusCode::UNAUTHORIZED, "Invalid API Key");
  }

  let Some(first) = body["messages"].get(0) else {
    return chat_error(StatusCode::BAD_REQUEST, "Missing messages");
  };
  let category = category_answer(first["content"].as_str().unwrap_or_default());
  tracing::debug!(category, "mock category");

  Json(json!({
    "choices": [{ "message": { "role": "assistant", "content": category } }]
  }))
  .into_response()
}
