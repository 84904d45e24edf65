//! Command handlers with boundary logging.
//!
//! ## Logging Ownership
//!
//! The engine layer owns lifecycle logging:
//! - `log_op_start!` at entry
//! - `log_op_end!` on success
//! - `log_op_error!` on failure
//! - `log_integrity_warning!` when one write of a workflow landed and its
//!   counterpart did not
//!
//! Lower layers (store, core) use only `tracing::debug!()` for internal details.

pub mod conversion;
pub mod interaction;
pub mod prospect;
pub mod statistics;

use prospectflow_core::errors::{ExError, PipelineError};
use std::time::Instant;

pub(crate) fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

/// Convert at the engine boundary, tagging the operation unless the store
/// already named the failing call
pub(crate) fn boundary_error(op: &str, err: PipelineError) -> ExError {
    let ex = ExError::from(err);
    if ex.op().is_some() {
        ex
    } else {
        ex.with_op(op)
    }
}
