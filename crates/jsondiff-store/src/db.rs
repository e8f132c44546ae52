//! Database connection management

use std::path::Path;

use rusqlite::Connection;

use crate::errors::{from_rusqlite, io_error, Result};

/// Open a SQLite database at the given path, creating parent directories
///
/// # Errors
///
/// Returns `Io` if the parent directory cannot be created, `Persistence` if
/// SQLite refuses the file.
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| io_error("db_open", e))?;
    }
    Connection::open(path).map_err(from_rusqlite)
}

/// Open an in-memory SQLite database (for testing)
///
/// # Errors
///
/// Returns `Persistence` if SQLite cannot allocate the database.
pub fn open_in_memory() -> Result<Connection> {
    Connection::open_in_memory().map_err(from_rusqlite)
}

/// Configure a connection
///
/// In-memory databases ignore the WAL request and keep the `memory` journal.
///
/// # Errors
///
/// Returns `Persistence` if a pragma fails.
pub fn configure(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
        .map_err(from_rusqlite)?;

    // journal_mode returns a row, so it cannot go through execute
    let mode: String = conn
        .query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))
        .map_err(from_rusqlite)?;
    tracing::debug!(journal_mode = %mode, "sqlite journal mode set");

    Ok(())
}
