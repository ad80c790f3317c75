//! The intake pipeline: classify, persist, enrich.
//!
//! For each complaint both classifiers are started together. The sentiment
//! answer gates the first write; the category answer, whenever it arrives, is
//! applied as a second write to the same row. Total latency is bounded by the
//! slower of the two calls.
//!
//! ```text
//!   submit ──┬── sentiment ── insert ──┐
//!            └── category ─────────────┴── set_category ── Enriched
//! ```
//!
//! A sentiment failure aborts the intake and drops the in-flight category
//! call. A category failure leaves the complaint [`Intake::Persisted`] with
//! its default category. There is no compensation: a storage failure on the
//! second write leaves the first write in place.

use std::{future::Future, sync::Arc, time::Duration};

use tracing::{debug, warn};

use crate::{
  Error, Result,
  classify::{CATEGORY, CategoryClassifier, ClassifyError, SENTIMENT, SentimentClassifier},
  complaint::{Complaint, NewComplaint, Sentiment},
  store::ComplaintStore,
};

/// Default per-call classifier timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// Where a successful intake ended up.
#[derive(Debug, Clone, PartialEq)]
pub enum Intake {
  /// Stored with sentiment and the default category; category
  /// classification failed.
  Persisted(Complaint),
  /// The category answer was applied (possibly clearing the category).
  Enriched(Complaint),
}

impl Intake {
  pub fn complaint(&self) -> &Complaint {
    match self {
      Self::Persisted(c) | Self::Enriched(c) => c,
    }
  }

  pub fn into_complaint(self) -> Complaint {
    match self {
      Self::Persisted(c) | Self::Enriched(c) => c,
    }
  }

  pub fn is_enriched(&self) -> bool { matches!(self, Self::Enriched(_)) }
}

// ─── Pipeline ────────────────────────────────────────────────────────────────

/// Drives both classifiers and the two store writes for one complaint at a
/// time. Shared across requests; holds no per-request state.
pub struct IntakePipeline<S, SC, CC> {
  store:     Arc<S>,
  sentiment: SC,
  category:  CC,
  timeout:   Duration,
}

impl<S, SC, CC> IntakePipeline<S, SC, CC>
where
  S: ComplaintStore,
  SC: SentimentClassifier,
  CC: CategoryClassifier,
{
  pub fn new(store: Arc<S>, sentiment: SC, category: CC) -> Self {
    Self { store, sentiment, category, timeout: DEFAULT_TIMEOUT }
  }

  /// Bound each classifier call by `timeout`.
  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  /// Run one complaint through the pipeline.
  #[tracing::instrument(skip_all, fields(len = text.len()))]
  pub async fn submit(&self, text: &str) -> Result<Intake> {
    if text.is_empty() {
      return Err(Error::EmptyText);
    }

    let persist = async {
      let reading =
        with_timeout(SENTIMENT, self.timeout, self.sentiment.analyze_sentiment(text))
          .await?;
      debug!(label = %reading.label, score = ?reading.score, "sentiment classified");

      let input = NewComplaint::new(text, Sentiment::from_label(&reading.label));
      let complaint = self.store.insert(input).await.map_err(Error::storage)?;
      debug!(id = %complaint.id, "complaint persisted");
      Ok::<_, Error>(complaint)
    };

    let categorize = async {
      Ok::<_, Error>(
        with_timeout(CATEGORY, self.timeout, self.category.analyze_category(text)).await,
      )
    };

    // A persist failure short-circuits and drops the category call.
    let (complaint, label) = tokio::try_join!(persist, categorize)?;

    match label {
      Ok(raw) => self.enrich(complaint, &raw).await,
      Err(e) => {
        warn!(id = %complaint.id, error = %e, "category enrichment skipped");
        Ok(Intake::Persisted(complaint))
      }
    }
  }

  /// The single `Persisted → Enriched` transition.
  async fn enrich(&self, complaint: Complaint, raw_label: &str) -> Result<Intake> {
    let id = complaint.id;
    let updated = self
      .store
      .set_category(id, raw_label)
      .await
      .map_err(Error::storage)?
      .ok_or(Error::ComplaintNotFound(id))?;

    if updated.category.is_none() {
      warn!(%id, label = raw_label, "category label outside vocabulary; cleared");
    }
    Ok(Intake::Enriched(updated))
  }
}

async fn with_timeout<T>(
  provider: &'static str,
  timeout: Duration,
  call: impl Future<Output = Result<T, ClassifyError>>,
) -> Result<T, ClassifyError> {
  tokio::time::timeout(timeout, call)
    .await
    .map_err(|_| ClassifyError::Timeout { provider, timeout })?
}

// ─── Tests ───────────────────────────────────────────────────────────────────
