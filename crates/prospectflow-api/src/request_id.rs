//! Request correlation
//!
//! Every request runs inside a span carrying its `request_id`. A valid
//! inbound `x-request-id` is reused, otherwise one is generated; the id is
//! echoed on the response. Failed requests are logged here, with the
//! request's ids attached to the `ExError`.

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use prospectflow_core::errors::ExError;
use prospectflow_core::types::RequestContext;
use tracing::Instrument;

pub const REQUEST_ID_HEADER: &str = "x-request-id";
pub const TRACE_ID_HEADER: &str = "x-trace-id";

pub async fn correlate(mut request: Request, next: Next) -> Response {
    let context = {
        let header = |name: &str| {
            request
                .headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned)
        };
        RequestContext::from_headers(
            header(REQUEST_ID_HEADER).as_deref(),
            header(TRACE_ID_HEADER).as_deref(),
        )
    };

    let span = tracing::info_span!(
        "request",
        request_id = %context.request_id.as_str(),
        trace_id = context.trace_id.as_ref().map(|t| t.as_str()).unwrap_or(""),
        method = %request.method(),
        path = %request.uri().path(),
    );

    request.extensions_mut().insert(context.clone());

    let mut response = next.run(request).instrument(span).await;

    if let Some(err) = response.extensions_mut().remove::<ExError>() {
        let err = correlated(err, &context);
        log_failure(response.status().is_server_error(), &err);
        response.extensions_mut().insert(err);
    }

    if let Ok(value) = HeaderValue::from_str(context.request_id.as_str()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

fn correlated(err: ExError, context: &RequestContext) -> ExError {
    let err = err.with_request_id(context.request_id.clone());
    match &context.trace_id {
        Some(trace_id) => err.with_trace_id(trace_id.clone()),
        None => err,
    }
}

fn log_failure(server_error: bool, err: &ExError) {
    let request_id = err.request_id().map(|id| id.as_str()).unwrap_or("");
    let trace_id = err.trace_id().map(|id| id.as_str()).unwrap_or("");
    if server_error {
        tracing::error!(request_id, trace_id, err.code = err.code(), "{}", err);
    } else {
        tracing::debug!(request_id, trace_id, err.code = err.code(), "{}", err);
    }
}
