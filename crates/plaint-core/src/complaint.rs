//! Complaint — the single persisted entity — and its closed label sets.
//!
//! Classifier output arrives as opaque strings. The mapping functions here are
//! total: every raw label produces a value, never an error.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Identity ────────────────────────────────────────────────────────────────

/// Store-assigned integer identifier. Immutable once assigned.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ComplaintId(pub i64);

impl fmt::Display for ComplaintId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// Lifecycle status. Transitions only `Open → Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
  #[default]
  Open,
  Closed,
}

impl Status {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Open => "open",
      Self::Closed => "closed",
    }
  }
}

// ─── Sentiment ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
  Positive,
  Negative,
  Neutral,
}

impl Sentiment {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Positive => "positive",
      Self::Negative => "negative",
      Self::Neutral => "neutral",
    }
  }

  /// Map a provider label onto the closed set, case-insensitively.
  ///
  /// Anything outside `positive | negative | neutral` (including graded
  /// labels like `WEAK_POSITIVE`) collapses to [`Sentiment::Neutral`].
  pub fn from_label(raw: &str) -> Self {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("positive") {
      Self::Positive
    } else if raw.eq_ignore_ascii_case("negative") {
      Self::Negative
    } else {
      Self::Neutral
    }
  }
}

// ─── Category ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
  Technical,
  Payment,
  #[default]
  Other,
}

impl Category {
  /// Every category, in the order offered to the provider.
  pub const ALL: [Category; 3] = [Self::Technical, Self::Payment, Self::Other];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Technical => "technical",
      Self::Payment => "payment",
      Self::Other => "other",
    }
  }

  /// The literal word the category provider is asked to answer with.
  pub fn provider_label(self) -> &'static str {
    match self {
      Self::Technical => "техническая",
      Self::Payment => "оплата",
      Self::Other => "другое",
    }
  }

  /// Exact match of a provider answer against [`Category::provider_label`].
  /// The masculine `технический` is also taken as [`Category::Technical`].
  ///
  /// Returns `None` for anything else, including the English codes. Callers
  /// store `None` as an unset category rather than keeping a prior value.
  pub fn from_label(raw: &str) -> Option<Self> {
    if raw == "технический" {
      return Some(Self::Technical);
    }
    Self::ALL.into_iter().find(|c| c.provider_label() == raw)
  }
}

// ─── Complaint ───────────────────────────────────────────────────────────────

/// A stored complaint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Complaint {
  pub id:        ComplaintId,
  pub text:      String,
  pub status:    Status,
  /// Store-assigned creation time; never changes.
  pub timestamp: DateTime<Utc>,
  pub sentiment: Option<Sentiment>,
  pub category:  Option<Category>,
}

/// Input to [`crate::store::ComplaintStore::insert`].
/// `id` and `timestamp` are always assigned by the store.
#[derive(Debug, Clone)]
pub struct NewComplaint {
  pub text:      String,
  pub sentiment: Option<Sentiment>,
  pub category:  Option<Category>,
  pub status:    Status,
}

impl NewComplaint {
  /// An open complaint with the default (`other`) category.
  pub fn new(text: impl Into<String>, sentiment: Sentiment) -> Self {
    Self {
      text:      text.into(),
      sentiment: Some(sentiment),
      category:  Some(Category::default()),
      status:    Status::Open,
    }
  }
}
