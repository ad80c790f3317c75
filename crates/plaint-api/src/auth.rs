//! Shared-secret gate: an extractor comparing the `complaint-api-key` header
//! against the configured key.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, request::Parts},
};
use plaint_core::{
  classify::{CategoryClassifier, SentimentClassifier},
  store::ComplaintStore,
};
use sha2::{Digest as _, Sha256};

use crate::{AppState, error::ApiError};

/// Header carrying the caller's key.
pub const API_KEY_HEADER: &str = "complaint-api-key";

/// The configured key, held only as a SHA-256 digest.
#[derive(Clone)]
pub struct SharedSecret {
  digest: Vec<u8>,
}

impl SharedSecret {
  pub fn new(secret: &str) -> Self {
    Self { digest: Sha256::digest(secret.as_bytes()).to_vec() }
  }

  pub fn matches(&self, presented: &str) -> bool {
    Sha256::digest(presented.as_bytes()).as_slice() == self.digest.as_slice()
  }
}

/// Zero-size marker: present in the handler means the request carried the key.
pub struct Authorized;

/// Check the key directly from headers. A missing header is the same failure
/// as a wrong key.
pub fn verify_key(headers: &HeaderMap, secret: &SharedSecret) -> Result<(), ApiError> {
  let presented = headers
    .get(API_KEY_HEADER)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;

  if secret.matches(presented) {
    Ok(())
  } else {
    Err(ApiError::Unauthorized)
  }
}

impl<S, SC, CC> FromRequestParts<AppState<S, SC, CC>> for Authorized
where
  S: ComplaintStore + 'static,
  SC: SentimentClassifier + 'static,
  CC: CategoryClassifier + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, SC, CC>,
  ) -> Result<Self, Self::Rejection> {
    verify_key(&parts.headers, &state.secret)?;
    Ok(Authorized)
  }
}
