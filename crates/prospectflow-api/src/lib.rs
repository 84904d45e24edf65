//! ProspectFlow HTTP surface
//!
//! JSON endpoints over the pipeline engine. Handlers parse and validate the
//! payload, hand the typed request to an engine command on the blocking
//! pool, and map `ExError` kinds to status codes.

pub mod config;
pub mod error;
pub mod request_id;
pub mod routes;
pub mod state;

use axum::{middleware, Router};

pub use config::{Overrides, ServerConfig};
pub use error::ApiError;
pub use state::AppState;

/// Build the application router with request correlation applied
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes::prospects::router())
        .merge(routes::clients::router())
        .merge(routes::interactions::router())
        .merge(routes::statistics::router())
        .layer(middleware::from_fn(request_id::correlate))
        .with_state(state)
}
