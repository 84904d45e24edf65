//! Repository layer mapping documents to SQLite rows

mod rows;
pub mod sqlite_store;

pub use sqlite_store::SqliteStore;
