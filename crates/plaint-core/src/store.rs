//! The `ComplaintStore` trait.
//!
//! Implemented by storage backends (e.g. `plaint-store-sqlite`). The intake
//! pipeline and the HTTP layer depend on this abstraction, not on any concrete
//! backend. Each call is expected to be atomic on return.

use std::future::Future;

use chrono::{DateTime, TimeDelta, Utc};

use crate::complaint::{Complaint, ComplaintId, NewComplaint};

/// Abstraction over a complaint store backend.
///
/// Methods addressing an existing complaint return `Ok(None)` when the id is
/// unknown.
pub trait ComplaintStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a new complaint. The store assigns `id` and `timestamp`.
  fn insert(
    &self,
    input: NewComplaint,
  ) -> impl Future<Output = Result<Complaint, Self::Error>> + Send + '_;

  fn get(
    &self,
    id: ComplaintId,
  ) -> impl Future<Output = Result<Option<Complaint>, Self::Error>> + Send + '_;

  /// Overwrite the category with the mapping of `raw_label`.
  ///
  /// A label outside the provider vocabulary clears the category.
  fn set_category<'a>(
    &'a self,
    id: ComplaintId,
    raw_label: &'a str,
  ) -> impl Future<Output = Result<Option<Complaint>, Self::Error>> + Send + 'a;

  /// Mark a complaint closed. Closing a closed complaint succeeds.
  fn close(
    &self,
    id: ComplaintId,
  ) -> impl Future<Output = Result<Option<Complaint>, Self::Error>> + Send + '_;

  /// All open complaints with `timestamp >= reference - window`, in no
  /// particular order.
  fn list_open_since(
    &self,
    reference: DateTime<Utc>,
    window: TimeDelta,
  ) -> impl Future<Output = Result<Vec<Complaint>, Self::Error>> + Send + '_;
}
