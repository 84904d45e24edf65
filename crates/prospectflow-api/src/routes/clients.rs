//! `/clients`
//!
//! POST converts a Prospect, PUT edits a converted identity, DELETE reverts.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use prospectflow_core::model::ClientView;
use prospectflow_core::rules::{parse_client_update, parse_conversion_request};
use prospectflow_engine::commands::conversion::{
    client_convert, client_list, client_revert, client_update,
};
use serde_json::{json, Value};

use super::{body, method_not_allowed, IdQuery};
use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/clients",
        get(list)
            .post(convert)
            .put(update)
            .delete(revert)
            .fallback(method_not_allowed("GET, POST, PUT, DELETE")),
    )
}

async fn list(State(state): State<AppState>) -> Result<Json<Vec<ClientView>>, ApiError> {
    state.run(client_list).await.map(Json)
}

async fn convert(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<ClientView>), ApiError> {
    let request = parse_conversion_request(&body(payload)?)?;
    let view = state
        .run(move |store| client_convert(store, request))
        .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn update(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ClientView>, ApiError> {
    let id = query.require("Client")?;
    let update = parse_client_update(&body(payload)?)?;
    state
        .run(move |store| client_update(store, &id, update))
        .await
        .map(Json)
}

async fn revert(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<Json<Value>, ApiError> {
    let id = query.require("Client")?;
    let outcome = state.run(move |store| client_revert(store, &id)).await?;

    let message = if outcome.prospect_reverted {
        "Client deleted and prospect status reverted"
    } else {
        "Client deleted; prospect status could not be reverted"
    };
    Ok(Json(json!({
        "success": true,
        "message": message,
        "clientId": outcome.client_id,
        "prospectId": outcome.prospect_id,
        "prospectReverted": outcome.prospect_reverted,
    })))
}
