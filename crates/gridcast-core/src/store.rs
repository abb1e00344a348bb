// SQLite persistence: key-value snapshots (with TTL) and calibration weights.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::weights::CalibrationWeights;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("snapshot serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// SQLite-backed store for snapshots and calibration weights.
///
/// Snapshot writes are last-write-wins upserts: concurrent writers for the
/// same key race harmlessly. Calibration updates run read-modify-write inside
/// a single transaction so two concurrent retrospectives cannot double-apply
/// a smoothing step.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a store at `path` and ensure the schema exists.
    /// Pass `":memory:"` for an ephemeral in-memory store (useful for tests).
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS snapshots (
                key        TEXT PRIMARY KEY,
                value      TEXT NOT NULL,
                expires_at TEXT,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS calibration_weights (
                league_id   TEXT NOT NULL,
                season      TEXT NOT NULL,
                adp         REAL NOT NULL,
                need        REAL NOT NULL,
                tendency    REAL NOT NULL,
                news        REAL NOT NULL,
                rookie      REAL NOT NULL,
                sample_size INTEGER NOT NULL,
                updated_at  TEXT NOT NULL,
                PRIMARY KEY (league_id, season)
            );
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the database connection.
    ///
    /// Panics if the mutex is poisoned (another thread panicked while
    /// holding the lock). This should never happen in normal operation.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("store mutex poisoned")
    }

    // -- Key-value snapshots ------------------------------------------------

    /// Fetch and deserialize the value at `key`.
    ///
    /// Expired rows are treated as absent and lazily deleted on read.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let conn = self.conn();
        let row: Option<(String, Option<String>)> = conn
            .query_row(
                "SELECT value, expires_at FROM snapshots WHERE key = ?1",
                params![key],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .optional()?;

        let Some((value, expires_at)) = row else {
            return Ok(None);
        };

        if let Some(expiry) = expires_at.as_deref().and_then(parse_timestamp) {
            if expiry <= Utc::now() {
                debug!("snapshot key '{}' expired, deleting", key);
                conn.execute("DELETE FROM snapshots WHERE key = ?1", params![key])?;
                return Ok(None);
            }
        }

        Ok(Some(serde_json::from_str(&value)?))
    }

    /// Serialize and upsert `value` at `key`, overwriting any existing row
    /// (last-write-wins; idempotent, safe to call repeatedly).
    pub fn upsert_json<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<(), StoreError> {
        let json = serde_json::to_string(value)?;
        let now = Utc::now();
        let expires_at = ttl.map(|d| (now + d).to_rfc3339());

        self.conn().execute(
            "INSERT INTO snapshots (key, value, expires_at, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(key) DO UPDATE SET
                 value = excluded.value,
                 expires_at = excluded.expires_at,
                 updated_at = excluded.updated_at",
            params![key, json, expires_at, now.to_rfc3339()],
        )?;
        Ok(())
    }

    // -- Calibration weights ------------------------------------------------

    /// Load the persisted weights for a league/season, if any.
    pub fn load_weights(
        &self,
        league_id: &str,
        season: &str,
    ) -> Result<Option<CalibrationWeights>, StoreError> {
        let conn = self.conn();
        let row = conn
            .query_row(
                "SELECT adp, need, tendency, news, rookie, sample_size
                 FROM calibration_weights WHERE league_id = ?1 AND season = ?2",
                params![league_id, season],
                |r| {
                    Ok(CalibrationWeights {
                        league_id: league_id.to_string(),
                        season: season.to_string(),
                        adp: r.get(0)?,
                        need: r.get(1)?,
                        tendency: r.get(2)?,
                        news: r.get(3)?,
                        rookie: r.get(4)?,
                        sample_size: r.get(5)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    /// Atomically read-modify-write the weights row for a league/season.
    ///
    /// The closure receives the stored weights (or neutral weights when no
    /// row exists yet) and returns the replacement. The whole step runs in
    /// one transaction, so concurrent retrospectives serialize here.
    pub fn update_weights<F>(
        &self,
        league_id: &str,
        season: &str,
        apply: F,
    ) -> Result<CalibrationWeights, StoreError>
    where
        F: FnOnce(CalibrationWeights) -> CalibrationWeights,
    {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let current = tx
            .query_row(
                "SELECT adp, need, tendency, news, rookie, sample_size
                 FROM calibration_weights WHERE league_id = ?1 AND season = ?2",
                params![league_id, season],
                |r| {
                    Ok(CalibrationWeights {
                        league_id: league_id.to_string(),
                        season: season.to_string(),
                        adp: r.get(0)?,
                        need: r.get(1)?,
                        tendency: r.get(2)?,
                        news: r.get(3)?,
                        rookie: r.get(4)?,
                        sample_size: r.get(5)?,
                    })
                },
            )
            .optional()?
            .unwrap_or_else(|| CalibrationWeights::neutral(league_id, season));

        let updated = apply(current);

        tx.execute(
            "INSERT INTO calibration_weights
                 (league_id, season, adp, need, tendency, news, rookie, sample_size, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(league_id, season) DO UPDATE SET
                 adp = excluded.adp,
                 need = excluded.need,
                 tendency = excluded.tendency,
                 news = excluded.news,
                 rookie = excluded.rookie,
                 sample_size = excluded.sample_size,
                 updated_at = excluded.updated_at",
            params![
                updated.league_id,
                updated.season,
                updated.adp,
                updated.need,
                updated.tendency,
                updated.news,
                updated.rookie,
                updated.sample_size,
                Utc::now().to_rfc3339(),
            ],
        )?;

        tx.commit()?;
        Ok(updated)
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
