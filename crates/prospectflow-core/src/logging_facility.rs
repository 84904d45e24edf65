//! Structured logging facility for ProspectFlow
//!
//! - Single initialization point via `init(profile)`
//! - Lifecycle macros (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//! - `log_integrity_warning!` for non-fatal cross-document drift
//! - Test capture mode for deterministic assertions
//!
//! # Usage
//!
//! ```rust
//! use prospectflow_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, init_with_filter, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
