//! Classifier traits and their shared error type.
//!
//! Implementations live in `plaint-classify`. Both traits return the
//! provider's raw answer; mapping onto the closed label sets happens in
//! [`crate::complaint`].

use std::{future::Future, time::Duration};

use thiserror::Error;

/// Provider name used in errors and logs for the sentiment service.
pub const SENTIMENT: &str = "sentiment";
/// Provider name used in errors and logs for the category service.
pub const CATEGORY: &str = "category";

/// A failed call to a remote classifier.
#[derive(Debug, Error)]
pub enum ClassifyError {
  #[error("{provider} request failed: {message}")]
  Transport {
    provider: &'static str,
    message:  String,
  },

  #[error("{provider} returned HTTP {status}: {body}")]
  Status {
    provider: &'static str,
    status:   u16,
    body:     String,
  },

  #[error("{provider} response malformed: {message}")]
  Malformed {
    provider: &'static str,
    message:  String,
  },

  #[error("{provider} did not answer within {timeout:?}")]
  Timeout {
    provider: &'static str,
    timeout:  Duration,
  },
}

/// Raw result of a sentiment call.
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentReading {
  /// Provider-defined label, e.g. `"POSITIVE"` or `"WEAK_NEGATIVE"`.
  pub label: String,
  pub score: Option<f64>,
}

/// A remote service that labels text by sentiment.
pub trait SentimentClassifier: Send + Sync {
  fn analyze_sentiment<'a>(
    &'a self,
    text: &'a str,
  ) -> impl Future<Output = Result<SentimentReading, ClassifyError>> + Send + 'a;
}

/// A remote service that answers with a single category word.
///
/// The answer is not validated against the vocabulary here.
pub trait CategoryClassifier: Send + Sync {
  fn analyze_category<'a>(
    &'a self,
    text: &'a str,
  ) -> impl Future<Output = Result<String, ClassifyError>> + Send + 'a;
}
