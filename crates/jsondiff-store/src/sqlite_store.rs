//! SQLite implementation of `DiffStore`
//!
//! One row per saved diff. The JSON value is stored as compact text and
//! parsed again on read; object key order survives because the workspace
//! builds serde_json with `preserve_order`.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{TimeZone, Utc};
use jsondiff_core::errors::{ExError, ExErrorKind, ExResult};
use jsondiff_core::{DiffId, DiffStore, SavedDiff};
use rusqlite::{Connection, OptionalExtension};

use crate::db;
use crate::errors::{corrupt_state, from_rusqlite, Result};
use crate::migrations::apply_migrations;

/// Durable diff store backed by a single SQLite connection
pub struct SqliteDiffStore {
    conn: Mutex<Connection>,
}

impl SqliteDiffStore {
    /// Open (or create) the database file and bring its schema up to date
    ///
    /// # Errors
    ///
    /// Returns `Io` or `Persistence` if the file cannot be opened, configured
    /// or migrated.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = db::open(path)?;
        Self::from_connection(conn)
    }

    /// Private in-memory database, mostly for tests
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if configuration or migration fails.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(db::open_in_memory()?)
    }

    /// Take ownership of an existing connection, configuring and migrating it
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if configuration or migration fails.
    pub fn from_connection(mut conn: Connection) -> Result<Self> {
        db::configure(&conn)?;
        apply_migrations(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Number of stored diffs
    ///
    /// # Errors
    ///
    /// Returns `Persistence` on query failure.
    pub fn count(&self) -> Result<u64> {
        let conn = self.lock()?;
        let n: i64 = conn
            .query_row("SELECT COUNT(*) FROM saved_diffs", [], |row| row.get(0))
            .map_err(from_rusqlite)?;
        Ok(n.max(0) as u64)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| {
            ExError::new(ExErrorKind::Internal)
                .with_op("sqlite_store")
                .with_message("connection lock poisoned")
        })
    }
}

impl DiffStore for SqliteDiffStore {
    fn get(&self, id: &DiffId) -> ExResult<Option<SavedDiff>> {
        let conn = self.lock()?;
        let row: Option<(String, i64)> = conn
            .query_row(
                "SELECT state_json, created_at FROM saved_diffs WHERE id = ?1",
                [id.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|e| from_rusqlite(e).with_entity_id(id.as_str()))?;
        drop(conn);

        let Some((state_json, created_ms)) = row else {
            return Ok(None);
        };

        let state: serde_json::Value =
            serde_json::from_str(&state_json).map_err(|e| corrupt_state(id.as_str(), e))?;
        let created = Utc
            .timestamp_millis_opt(created_ms)
            .single()
            .unwrap_or_else(Utc::now);

        Ok(Some(SavedDiff::with_created(id.clone(), state, created)))
    }

    fn put(&self, diff: &SavedDiff) -> ExResult<()> {
        let state_json = serde_json::to_string(diff.state()).map_err(|e| {
            ExError::new(ExErrorKind::Serialization)
                .with_op("sqlite_put")
                .with_entity_id(diff.id().as_str())
                .with_message(e.to_string())
        })?;

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO saved_diffs (id, state_json, created_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![
                diff.id().as_str(),
                state_json,
                diff.created().timestamp_millis()
            ],
        )
        .map_err(|e| from_rusqlite(e).with_entity_id(diff.id().as_str()))?;

        Ok(())
    }

    fn contains(&self, id: &DiffId) -> ExResult<bool> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM saved_diffs WHERE id = ?1)",
            [id.as_str()],
            |row| row.get(0),
        )
        .map_err(|e| from_rusqlite(e).with_entity_id(id.as_str()))
    }
}

impl std::fmt::Debug for SqliteDiffStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteDiffStore").finish_non_exhaustive()
    }
}
