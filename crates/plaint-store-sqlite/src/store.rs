//! [`SqliteStore`] — the SQLite implementation of [`ComplaintStore`].

use std::path::Path;

use chrono::{DateTime, SubsecRound as _, TimeDelta, Utc};
use rusqlite::OptionalExtension as _;

use plaint_core::{
  complaint::{Category, Complaint, ComplaintId, NewComplaint, Status},
  store::ComplaintStore,
};

use crate::{
  Result,
  encode::{RawComplaint, encode_dt},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A complaint store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    tracing::debug!(path = %path.as_ref().display(), "opening complaint store");
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert with an explicit creation time. `insert` passes the current time.
  pub(crate) async fn insert_at(
    &self,
    input: NewComplaint,
    at: DateTime<Utc>,
  ) -> Result<Complaint> {
    // Stored at microsecond precision; keep the returned value identical.
    let timestamp     = at.trunc_subsecs(6);
    let text          = input.text.clone();
    let status_str    = input.status.as_str();
    let at_str        = encode_dt(timestamp);
    let sentiment_str = input.sentiment.map(|s| s.as_str());
    let category_str  = input.category.map(|c| c.as_str());

    let id: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO complaints (text, status, timestamp, sentiment, category)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![text, status_str, at_str, sentiment_str, category_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Complaint {
      id: ComplaintId(id),
      text: input.text,
      status: input.status,
      timestamp,
      sentiment: input.sentiment,
      category: input.category,
    })
  }

  /// Run an `UPDATE ... RETURNING` statement against one row.
  async fn update_one(
    &self,
    sql: &'static str,
    id: ComplaintId,
    value: Option<&'static str>,
  ) -> Result<Option<Complaint>> {
    let raw: Option<RawComplaint> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(sql, rusqlite::params![id.0, value], RawComplaint::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawComplaint::into_complaint).transpose()
  }
}

/// First stored instant inside the window. Stored timestamps have microsecond
/// precision, so a sub-microsecond start rounds up rather than down.
fn window_start(reference: DateTime<Utc>, window: TimeDelta) -> DateTime<Utc> {
  let start = reference - window;
  let floor = start.trunc_subsecs(6);
  if floor < start { floor + TimeDelta::microseconds(1) } else { floor }
}

// ─── ComplaintStore impl ─────────────────────────────────────────────────────

const SET_CATEGORY_SQL: &str = "UPDATE complaints SET category = ?2 WHERE id = ?1
   RETURNING id, text, status, timestamp, sentiment, category";

const CLOSE_SQL: &str = "UPDATE complaints SET status = ?2 WHERE id = ?1
   RETURNING id, text, status, timestamp, sentiment, category";

impl ComplaintStore for SqliteStore {
  type Error = crate::Error;

  async fn insert(&self, input: NewComplaint) -> Result<Complaint> {
    self.insert_at(input, Utc::now()).await
  }

  async fn get(&self, id: ComplaintId) -> Result<Option<Complaint>> {
    let raw: Option<RawComplaint> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, text, status, timestamp, sentiment, category
               FROM complaints WHERE id = ?1",
              rusqlite::params![id.0],
              RawComplaint::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawComplaint::into_complaint).transpose()
  }

  async fn set_category(
    &self,
    id: ComplaintId,
    raw_label: &str,
  ) -> Result<Option<Complaint>> {
    // No match clears the column; it does not keep the previous value.
    let category = Category::from_label(raw_label).map(Category::as_str);
    self.update_one(SET_CATEGORY_SQL, id, category).await
  }

  async fn close(&self, id: ComplaintId) -> Result<Option<Complaint>> {
    self.update_one(CLOSE_SQL, id, Some(Status::Closed.as_str())).await
  }

  async fn list_open_since(
    &self,
    reference: DateTime<Utc>,
    window: TimeDelta,
  ) -> Result<Vec<Complaint>> {
    let start_str = encode_dt(window_start(reference, window));
    let open_str  = Status::Open.as_str();

    let raws: Vec<RawComplaint> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, text, status, timestamp, sentiment, category
           FROM complaints
           WHERE status = ?1 AND timestamp >= ?2",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![open_str, start_str], RawComplaint::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawComplaint::into_complaint).collect()
  }
}
