//! ProspectFlow Core - domain model and integrity rules
//!
//! This crate holds everything the conversion engine is written against:
//! - Prospect, Client and Interaction documents with their wire names
//! - Error facility (`PipelineError`, `ExError`, `ExErrorKind`)
//! - Logging facility (profiles, lifecycle macros, test capture)
//! - Validation layer with declarative per-entity schemas
//! - The `EntityStore` interface and an in-memory implementation
//! - Pure aggregation math for statistics

pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod queries;
pub mod rules;
pub mod store;

pub use prospectflow_core_types as types;

pub use errors::{ExError, ExErrorKind, ExResult, PipelineError, Result};
pub use model::{Client, ClientView, Interaction, InteractionType, Prospect, ProspectStatus};
pub use store::{EntityStore, MemoryStore};

#[doc(hidden)]
pub mod __private {
    pub use tracing;
}
