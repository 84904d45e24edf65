//! ProspectFlow Store - SQLite persistence for the entity store
//!
//! Provides:
//! - Connection bootstrap (`db`)
//! - Checksummed embedded migrations
//! - `SqliteStore`, the `EntityStore` implementation used by the server

pub mod db;
pub mod errors;
pub mod migrations;
pub mod repo;

pub use repo::SqliteStore;
