//! SQLite persistence for series, rounds, rankings and the operation log.
//!
//! Every call opens its own connection to the database file, the same way the
//! request handlers are expected to run: synchronously, inside
//! `tokio::task::spawn_blocking`.

pub mod operation_log;
pub mod rankings;
pub mod series;

use chrono::{SecondsFormat, Utc};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub use rankings::RankingStore;

/// Failures of the SQLite layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A series or round id that does not exist. Maps to HTTP 404.
    #[error("not found: {0}")]
    NotFound(String),
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS series (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    season      TEXT,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS rounds (
    id            TEXT PRIMARY KEY,
    series_id     TEXT NOT NULL REFERENCES series(id) ON DELETE CASCADE,
    name          TEXT NOT NULL,
    round_number  INTEGER,
    race_date     TEXT,
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS rankings (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    round_id          TEXT NOT NULL REFERENCES rounds(id) ON DELETE CASCADE,
    driver_identity   TEXT NOT NULL,
    rank              INTEGER NOT NULL DEFAULT 999,
    points            INTEGER NOT NULL DEFAULT 0,
    tier              TEXT,
    safety_score      INTEGER NOT NULL DEFAULT 0,
    podiums           INTEGER NOT NULL DEFAULT 0,
    finished_races    INTEGER NOT NULL DEFAULT 0,
    total_races       INTEGER NOT NULL DEFAULT 0,
    raw_payload_json  TEXT NOT NULL,
    created_at        TEXT NOT NULL,
    UNIQUE (round_id, driver_identity)
);

CREATE INDEX IF NOT EXISTS idx_rounds_series ON rounds(series_id);

CREATE TABLE IF NOT EXISTS operation_logs (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    action      TEXT NOT NULL,
    target      TEXT,
    detail      TEXT,
    created_at  TEXT NOT NULL
);
";

/// Handle to the SQLite database file. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    /// Points at `path`; nothing is opened until the first `connect`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Opens a fresh connection with foreign keys enforced and a busy timeout,
    /// so concurrent handlers wait for each other instead of failing.
    pub fn connect(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(conn)
    }

    /// Creates missing tables. Safe to call on every start.
    pub fn init(&self) -> Result<(), StoreError> {
        self.connect()?.execute_batch(SCHEMA)?;
        Ok(())
    }
}

/// RFC 3339 UTC timestamp used for every `created_at` column.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::Database;
    use tempfile::TempDir;

    /// A freshly initialised database living as long as the returned directory.
    pub fn temp_database() -> (TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let database = Database::new(dir.path().join("rankings.sqlite"));
        database.init().unwrap();
        (dir, database)
    }
}
