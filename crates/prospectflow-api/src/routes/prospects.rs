use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use prospectflow_core::model::Prospect;
use prospectflow_core::rules::{parse_new_prospect, parse_prospect_update};
use prospectflow_engine::commands::prospect::{
    prospect_create, prospect_delete, prospect_list, prospect_update,
};
use serde_json::Value;

use super::{body, method_not_allowed, IdQuery};
use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/prospects",
        get(list)
            .post(create)
            .put(update)
            .delete(remove)
            .fallback(method_not_allowed("GET, POST, PUT, DELETE")),
    )
}

async fn list(State(state): State<AppState>) -> Result<Json<Vec<Prospect>>, ApiError> {
    state.run(prospect_list).await.map(Json)
}

async fn create(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Prospect>), ApiError> {
    let input = parse_new_prospect(&body(payload)?)?;
    let prospect = state
        .run(move |store| prospect_create(store, input))
        .await?;
    Ok((StatusCode::CREATED, Json(prospect)))
}

async fn update(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Prospect>, ApiError> {
    let id = query.require("Prospect")?;
    let update = parse_prospect_update(&body(payload)?)?;
    state
        .run(move |store| prospect_update(store, &id, update))
        .await
        .map(Json)
}

async fn remove(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<StatusCode, ApiError> {
    let id = query.require("Prospect")?;
    state.run(move |store| prospect_delete(store, &id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
