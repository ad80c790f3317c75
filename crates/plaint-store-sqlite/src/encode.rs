//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.

use chrono::{DateTime, SecondsFormat, Utc};
use plaint_core::complaint::{Category, Complaint, ComplaintId, Sentiment, Status};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// Fixed-width so that lexical order in SQL matches chronological order.
pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Labels ──────────────────────────────────────────────────────────────────

pub fn decode_status(s: &str) -> Result<Status> {
  match s {
    "open" => Ok(Status::Open),
    "closed" => Ok(Status::Closed),
    other => Err(Error::UnknownLabel { column: "status", value: other.to_owned() }),
  }
}

pub fn decode_sentiment(s: &str) -> Result<Sentiment> {
  match s {
    "positive" => Ok(Sentiment::Positive),
    "negative" => Ok(Sentiment::Negative),
    "neutral" => Ok(Sentiment::Neutral),
    other => Err(Error::UnknownLabel { column: "sentiment", value: other.to_owned() }),
  }
}

pub fn decode_category(s: &str) -> Result<Category> {
  match s {
    "technical" => Ok(Category::Technical),
    "payment" => Ok(Category::Payment),
    "other" => Ok(Category::Other),
    other => Err(Error::UnknownLabel { column: "category", value: other.to_owned() }),
  }
}

// ─── Row type ────────────────────────────────────────────────────────────────

/// Raw values read directly from a `complaints` row, selected in the order
/// `id, text, status, timestamp, sentiment, category`.
pub struct RawComplaint {
  pub id:        i64,
  pub text:      String,
  pub status:    String,
  pub timestamp: String,
  pub sentiment: Option<String>,
  pub category:  Option<String>,
}

impl RawComplaint {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:        row.get(0)?,
      text:      row.get(1)?,
      status:    row.get(2)?,
      timestamp: row.get(3)?,
      sentiment: row.get(4)?,
      category:  row.get(5)?,
    })
  }

  pub fn into_complaint(self) -> Result<Complaint> {
    Ok(Complaint {
      id:        ComplaintId(self.id),
      text:      self.text,
      status:    decode_status(&self.status)?,
      timestamp: decode_dt(&self.timestamp)?,
      sentiment: self.sentiment.as_deref().map(decode_sentiment).transpose()?,
      category:  self.category.as_deref().map(decode_category).transpose()?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;

  #[test]
  fn encoded_timestamps_sort_chronologically() {
    let whole = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let later = whole + chrono::TimeDelta::microseconds(1);
    assert!(encode_dt(whole) < encode_dt(later));
    assert_eq!(encode_dt(whole).len(), encode_dt(later).len());
  }

  #[test]
  fn timestamp_roundtrip() {
    let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 15).unwrap();
    assert_eq!(decode_dt(&encode_dt(at)).unwrap(), at);
  }

  #[test]
  fn unknown_stored_label_is_an_error() {
    let err = decode_category("оплата").unwrap_err();
    assert!(matches!(err, Error::UnknownLabel { column: "category", .. }));
  }
}
