//! ProspectFlow Engine - Orchestration layer
//!
//! Sequences the multi-document workflows (conversion, revert, identity
//! update, interaction history) over an `EntityStore` and owns lifecycle
//! logging for every operation.

pub mod commands;

pub use commands::conversion::RevertOutcome;
