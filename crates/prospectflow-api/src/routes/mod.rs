//! Route modules, one per resource
//!
//! Each resource answers only the methods it lists; anything else gets
//! `405` with an `Allow` header and a plain-text body.

pub mod clients;
pub mod interactions;
pub mod prospects;
pub mod statistics;

use std::future::{ready, Ready};

use axum::extract::rejection::JsonRejection;
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use prospectflow_core::errors::PipelineError;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;

/// `?id=` on update and delete requests
#[derive(Debug, Default, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

impl IdQuery {
    /// # Errors
    ///
    /// `MissingId` when the parameter is absent or blank.
    pub fn require(self, resource: &str) -> Result<String, ApiError> {
        match self.id.map(|id| id.trim().to_string()) {
            Some(id) if !id.is_empty() => Ok(id),
            _ => Err(ApiError::from(PipelineError::MissingId {
                resource: resource.to_string(),
            })),
        }
    }
}

/// Unwrap a JSON body, turning extractor rejections into validation errors
pub(crate) fn body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    payload.map(|Json(value)| value).map_err(ApiError::from)
}

/// Fallback handler answering `405` for methods outside `allow`
pub(crate) fn method_not_allowed(
    allow: &'static str,
) -> impl Fn(Method) -> Ready<Response> + Clone + Send + Sync + 'static {
    move |method: Method| {
        ready(
            (
                StatusCode::METHOD_NOT_ALLOWED,
                [(header::ALLOW, allow)],
                format!("Method {} Not Allowed", method),
            )
                .into_response(),
        )
    }
}
