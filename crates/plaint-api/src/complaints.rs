//! Handlers for `/complaints` endpoints.
//!
//! | Method | Path | Gate | Notes |
//! |--------|------|------|-------|
//! | `POST` | `/complaints/` | – | Body: `{"text":"..."}`; returns 201 + [`IntakeView`] |
//! | `POST` | `/complaints/close-status/` | key | Body: `{"id":1}`; returns [`ClosedView`] |
//! | `GET`  | `/complaints/open-recent` | key | `?current_time=<ISO 8601>` |
//! | `GET`  | `/complaints/{id}` | key | Full complaint; 404 if unknown |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use plaint_core::{
  classify::{CategoryClassifier, SentimentClassifier},
  complaint::{Category, Complaint, ComplaintId, Sentiment, Status},
  store::ComplaintStore,
};
use serde::{Deserialize, Serialize};

use crate::{AppState, auth::Authorized, error::ApiError};

// ─── Views ───────────────────────────────────────────────────────────────────

/// Response body of `POST /complaints/`.
#[derive(Debug, Serialize)]
pub struct IntakeView {
  pub id:        ComplaintId,
  pub status:    Status,
  pub sentiment: Option<Sentiment>,
  pub category:  Option<Category>,
}

impl From<Complaint> for IntakeView {
  fn from(c: Complaint) -> Self {
    Self { id: c.id, status: c.status, sentiment: c.sentiment, category: c.category }
  }
}

/// Response body of `POST /complaints/close-status/`.
#[derive(Debug, Serialize)]
pub struct ClosedView {
  pub id:        ComplaintId,
  pub status:    Status,
  pub timestamp: DateTime<Utc>,
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub text: String,
}

/// `POST /complaints/` — runs the intake pipeline.
pub async fn create<S, SC, CC>(
  State(state): State<AppState<S, SC, CC>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ComplaintStore + 'static,
  SC: SentimentClassifier + 'static,
  CC: CategoryClassifier + 'static,
{
  let complaint = state.intake.submit(&body.text).await?.into_complaint();
  Ok((StatusCode::CREATED, Json(IntakeView::from(complaint))))
}

// ─── Close ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CloseBody {
  pub id: ComplaintId,
}

/// `POST /complaints/close-status/` — body: `{"id": 1}`.
pub async fn close<S, SC, CC>(
  _: Authorized,
  State(state): State<AppState<S, SC, CC>>,
  Json(body): Json<CloseBody>,
) -> Result<Json<ClosedView>, ApiError>
where
  S: ComplaintStore + 'static,
  SC: SentimentClassifier + 'static,
  CC: CategoryClassifier + 'static,
{
  let complaint = state
    .intake
    .store()
    .close(body.id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("complaint {} not found", body.id)))?;

  Ok(Json(ClosedView {
    id:        complaint.id,
    status:    complaint.status,
    timestamp: complaint.timestamp,
  }))
}

// ─── Open recent ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct OpenRecentParams {
  pub current_time: Option<String>,
}

/// Parse an ISO 8601 date-time. Values without an offset are taken as UTC;
/// a bare date means midnight.
pub fn parse_reference_time(raw: &str) -> Option<DateTime<Utc>> {
  let raw = raw.trim();
  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return Some(dt.with_timezone(&Utc));
  }
  for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
      return Some(naive.and_utc());
    }
  }
  NaiveDate::parse_from_str(raw, "%Y-%m-%d")
    .ok()
    .and_then(|d| d.and_hms_opt(0, 0, 0))
    .map(|naive| naive.and_utc())
}

/// `GET /complaints/open-recent?current_time=<ISO 8601>`
pub async fn open_recent<S, SC, CC>(
  _: Authorized,
  State(state): State<AppState<S, SC, CC>>,
  Query(params): Query<OpenRecentParams>,
) -> Result<Json<Vec<Complaint>>, ApiError>
where
  S: ComplaintStore + 'static,
  SC: SentimentClassifier + 'static,
  CC: CategoryClassifier + 'static,
{
  let reference = params
    .current_time
    .as_deref()
    .and_then(parse_reference_time)
    .ok_or_else(|| {
      ApiError::BadRequest("current_time must be an ISO 8601 date-time".to_owned())
    })?;

  let complaints = state
    .intake
    .store()
    .list_open_since(reference, state.open_window)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(complaints))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /complaints/{id}`
pub async fn get_one<S, SC, CC>(
  _: Authorized,
  State(state): State<AppState<S, SC, CC>>,
  Path(id): Path<ComplaintId>,
) -> Result<Json<Complaint>, ApiError>
where
  S: ComplaintStore + 'static,
  SC: SentimentClassifier + 'static,
  CC: CategoryClassifier + 'static,
{
  let complaint = state
    .intake
    .store()
    .get(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("complaint {id} not found")))?;
  Ok(Json(complaint))
}
