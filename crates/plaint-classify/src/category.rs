//! Category provider client.
//!
//! The provider is a chat model asked, with a single constrained prompt, to
//! answer with one word from the category vocabulary. The answer is returned
//! as-is (trimmed); matching against the vocabulary happens downstream.

use plaint_core::{
  ClassifyError,
  classify::{CATEGORY, CategoryClassifier},
  complaint::Category,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{malformed, success_body, transport};

fn default_model() -> String { "gpt-3.5-turbo".to_owned() }

/// Connection settings for the category provider.
#[derive(Clone, Deserialize)]
pub struct CategoryConfig {
  pub endpoint: String,
  /// Sent as `Authorization: Bearer <api_key>`.
  pub api_key:  String,
  #[serde(default = "default_model")]
  pub model:    String,
}

/// The instruction sent to the model for `text`.
pub fn category_prompt(text: &str) -> String {
  let options = Category::ALL
    .iter()
    .map(|c| c.provider_label())
    .collect::<Vec<_>>()
    .join(", ");
  format!(
    "Определи категорию жалобы: \"{text}\". Варианты: {options}. Ответ только одним словом."
  )
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
  model:       &'a str,
  messages:    [ChatMessage<'a>; 1],
  temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
  role:    &'a str,
  content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
  #[serde(default)]
  choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
  message: Option<ReplyMessage>,
}

#[derive(Deserialize)]
struct ReplyMessage {
  content: Option<String>,
}

// ─── Client ──────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct CategoryClient {
  http:   reqwest::Client,
  config: CategoryConfig,
}

impl CategoryClient {
  pub fn new(http: reqwest::Client, config: CategoryConfig) -> Self {
    Self { http, config }
  }
}

impl CategoryClassifier for CategoryClient {
  async fn analyze_category(&self, text: &str) -> Result<String, ClassifyError> {
    debug!(endpoint = %self.config.endpoint, model = %self.config.model, "requesting category");

    let prompt = category_prompt(text);
    let request = ChatRequest {
      model:       &self.config.model,
      messages:    [ChatMessage { role: "user", content: &prompt }],
      temperature: 0.0,
    };

    let resp = self
      .http
      .post(&self.config.endpoint)
      .bearer_auth(&self.config.api_key)
      .json(&request)
      .send()
      .await
      .map_err(|e| transport(CATEGORY, e))?;

    let body = success_body(CATEGORY, resp).await?;
    let parsed: ChatResponse =
      serde_json::from_slice(&body).map_err(|e| malformed(CATEGORY, e))?;

    let content = parsed
      .choices
      .into_iter()
      .next()
      .and_then(|c| c.message)
      .and_then(|m| m.content)
      .ok_or_else(|| malformed(CATEGORY, "missing choices[0].message.content"))?;

    Ok(content.trim().to_owned())
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use serde_json::json;
  use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method, path},
  };

  use super::*;

  fn client(server: &MockServer) -> CategoryClient {
    CategoryClient::new(
      crate::http_client(Duration::from_secs(5)).unwrap(),
      CategoryConfig {
        endpoint: format!("{}/v1/chat/completions", server.uri()),
        api_key:  "mock-api-key".into(),
        model:    default_model(),
      },
    )
  }

  fn reply(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
      "choices": [{ "message": { "role": "assistant", "content": content } }]
    }))
  }

  #[test]
  fn prompt_embeds_text_and_vocabulary() {
    let prompt = category_prompt("не проходит оплата");
    assert!(prompt.contains("\"не проходит оплата\""));
    assert!(prompt.contains("техническая, оплата, другое"));
  }

  #[tokio::test]
  async fn sends_constrained_prompt_with_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/v1/chat/completions"))
      .and(header("authorization", "Bearer mock-api-key"))
      .and(body_partial_json(json!({
        "model": "gpt-3.5-turbo",
        "temperature": 0.0,
        "messages": [{ "role": "user", "content": category_prompt("card declined") }],
      })))
      .respond_with(reply("оплата"))
      .expect(1)
      .mount(&server)
      .await;

    let label = client(&server).analyze_category("card declined").await.unwrap();
    assert_eq!(label, "оплата");
  }

  #[tokio::test]
  async fn answer_is_trimmed_but_not_validated() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .respond_with(reply("  Something Else \n"))
      .mount(&server)
      .await;

    let label = client(&server).analyze_category("x").await.unwrap();
    assert_eq!(label, "Something Else");
  }

  #[tokio::test]
  async fn empty_choices_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
      .mount(&server)
      .await;

    let err = client(&server).analyze_category("x").await.unwrap_err();
    assert!(matches!(err, ClassifyError::Malformed { provider: CATEGORY, .. }));
  }

  #[tokio::test]
  async fn missing_content_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .respond_with(
        ResponseTemplate::new(200)
          .set_body_json(json!({ "choices": [{ "message": { "role": "assistant" } }] })),
      )
      .mount(&server)
      .await;

    let err = client(&server).analyze_category("x").await.unwrap_err();
    assert!(matches!(err, ClassifyError::Malformed { provider: CATEGORY, .. }));
  }

  #[tokio::test]
  async fn unauthorized_is_a_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .respond_with(
        ResponseTemplate::new(401).set_body_json(json!({ "detail": "Invalid API Key" })),
      )
      .mount(&server)
      .await;

    let err = client(&server).analyze_category("x").await.unwrap_err();
    assert!(matches!(err, ClassifyError::Status { provider: CATEGORY, status: 401, .. }));
  }
}
