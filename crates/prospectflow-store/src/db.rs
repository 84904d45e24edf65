//! Database connection management

use crate::errors::from_rusqlite;
use prospectflow_core::errors::Result;
use rusqlite::Connection;
use std::path::Path;

/// Open a SQLite database at the given path
///
/// # Errors
///
/// `Store` if the file cannot be opened.
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    Connection::open(path).map_err(|e| from_rusqlite("open", e))
}

/// Open an in-memory SQLite database
///
/// # Errors
///
/// `Store` if SQLite cannot allocate the database.
pub fn open_in_memory() -> Result<Connection> {
    Connection::open_in_memory().map_err(|e| from_rusqlite("open", e))
}

/// Configure a connection
///
/// Foreign keys are always on. WAL is only requested for file databases;
/// in-memory databases ignore it.
///
/// # Errors
///
/// `Store` if a pragma is rejected.
pub fn configure(conn: &Connection, file_backed: bool) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|e| from_rusqlite("configure", e))?;

    if file_backed {
        conn.execute_batch("PRAGMA journal_mode = WAL;")
            .map_err(|e| from_rusqlite("configure", e))?;
    }

    Ok(())
}
