//! Error helpers for prospectflow-store
//!
//! Maps rusqlite failures onto `PipelineError`, recognising the two unique
//! indexes the engine depends on.

use prospectflow_core::errors::PipelineError;
use rusqlite::ffi;

/// Index guarding Prospect email uniqueness
pub const PROSPECT_EMAIL_INDEX: &str = "prospects.email";

/// Index guarding one Client per Prospect
pub const CLIENT_PROSPECT_INDEX: &str = "clients.prospect_id";

/// Wrap a rusqlite error as a store failure for `op`
pub fn from_rusqlite(op: &str, err: rusqlite::Error) -> PipelineError {
    PipelineError::store(op, err.to_string())
}

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> PipelineError {
    PipelineError::store(
        "migration",
        format!("Migration {} failed: {}", migration_id, reason),
    )
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> PipelineError {
    PipelineError::store(
        "migration_checksum",
        format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ),
    )
}

/// Whether `err` is a UNIQUE violation on `column` (`table.column`)
pub fn is_unique_violation(err: &rusqlite::Error, column: &str) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(code, Some(message)) => {
            code.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE && message.contains(column)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_unique_violation_detection() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE prospects (id TEXT PRIMARY KEY, email TEXT NOT NULL);
             CREATE UNIQUE INDEX idx_prospects_email ON prospects(email);
             INSERT INTO prospects VALUES ('p1', 'a@x.com');",
        )
        .unwrap();

        let err = conn
            .execute("INSERT INTO prospects VALUES ('p2', 'a@x.com')", [])
            .unwrap_err();
        assert!(is_unique_violation(&err, PROSPECT_EMAIL_INDEX));
        assert!(!is_unique_violation(&err, CLIENT_PROSPECT_INDEX));
    }

    #[test]
    fn test_store_error_keeps_op() {
        let err = from_rusqlite("get_client", rusqlite::Error::InvalidQuery);
        assert!(matches!(err, PipelineError::Store { ref op, .. } if op == "get_client"));
    }
}
