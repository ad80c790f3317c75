//! SQL schema for the Plaint SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS complaints (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    text       TEXT NOT NULL,
    status     TEXT NOT NULL DEFAULT 'open',  -- 'open' | 'closed'
    timestamp  TEXT NOT NULL,                 -- RFC 3339 UTC, fixed width; server-assigned
    sentiment  TEXT,                          -- 'positive' | 'negative' | 'neutral'
    category   TEXT                           -- 'technical' | 'payment' | 'other'
);

CREATE INDEX IF NOT EXISTS complaints_open_idx ON complaints(status, timestamp);

PRAGMA user_version = 1;
";
