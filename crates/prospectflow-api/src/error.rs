//! HTTP error mapping
//!
//! The status code is derived from the error kind alone; the body carries
//! the message and the stable code.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use prospectflow_core::errors::{ExError, ExErrorKind, PipelineError};
use serde_json::json;

#[derive(Debug)]
pub struct ApiError(pub ExError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        status_for(self.0.kind())
    }
}

pub fn status_for(kind: ExErrorKind) -> StatusCode {
    match kind {
        ExErrorKind::ValidationFailed | ExErrorKind::MissingId | ExErrorKind::DuplicateEmail => {
            StatusCode::BAD_REQUEST
        }
        ExErrorKind::NotFound | ExErrorKind::DeleteRaceLost => StatusCode::NOT_FOUND,
        ExErrorKind::AlreadyConverted | ExErrorKind::ProspectHasClient => StatusCode::CONFLICT,
        ExErrorKind::IntegrityWarning
        | ExErrorKind::StoreFailure
        | ExErrorKind::Serialization
        | ExErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<ExError> for ApiError {
    fn from(err: ExError) -> Self {
        ApiError(err)
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        ApiError(ExError::from(err))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(
            ExError::new(ExErrorKind::ValidationFailed).with_message(rejection.body_text()),
        )
    }
}

impl IntoResponse for ApiError {
    /// The `ExError` rides along in the response extensions so the
    /// correlation middleware can tag and log it with the request's ids.
    fn into_response(self) -> Response {
        let status = self.status();
        let body = json!({
            "success": false,
            "error": self.0.message(),
            "code": self.0.code(),
        });

        let mut response = (status, Json(body)).into_response();
        response.extensions_mut().insert(self.0);
        response
    }
}
