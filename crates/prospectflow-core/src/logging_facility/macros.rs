//! Canonical logging macros
//!
//! The engine owns operation lifecycle logging: one `log_op_start!` at
//! entry, then exactly one of `log_op_end!` or `log_op_error!`.

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use prospectflow_core::log_op_start;
/// log_op_start!("prospect_create");
/// log_op_start!("client_convert", prospect_id = "p1");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        $crate::__private::tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        $crate::__private::tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use prospectflow_core::log_op_end;
/// log_op_end!("prospect_create", duration_ms = 3);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        $crate::__private::tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        $crate::__private::tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an operation error
///
/// Accepts anything convertible into `ExError`.
///
/// # Example
///
/// ```
/// # use prospectflow_core::{log_op_error, errors::PipelineError};
/// let err = PipelineError::ClientNotFound { client_id: "c1".to_string() };
/// log_op_error!("client_revert", err, duration_ms = 1);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        $crate::__private::tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
            reason = ex_err.message(),
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        $crate::__private::tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
            reason = ex_err.message(),
            $($field)*
        );
    }};
}

/// Log a non-fatal cross-document inconsistency
///
/// Used when one write of a multi-step workflow succeeded and its
/// counterpart did not, so the two collections disagree until repaired.
///
/// # Example
///
/// ```
/// # use prospectflow_core::log_integrity_warning;
/// log_integrity_warning!("client_revert", "referenced prospect is missing", prospect_id = "p1");
/// ```
#[macro_export]
macro_rules! log_integrity_warning {
    ($op:expr, $reason:expr) => {
        $crate::__private::tracing::warn!(
            component = module_path!(),
            op = $op,
            event = $crate::types::schema::EVENT_INTEGRITY_WARNING,
            err.code = $crate::errors::ExErrorKind::IntegrityWarning.code(),
            reason = %$reason,
        );
    };
    ($op:expr, $reason:expr, $($field:tt)*) => {
        $crate::__private::tracing::warn!(
            component = module_path!(),
            op = $op,
            event = $crate::types::schema::EVENT_INTEGRITY_WARNING,
            err.code = $crate::errors::ExErrorKind::IntegrityWarning.code(),
            reason = %$reason,
            $($field)*
        );
    };
}
