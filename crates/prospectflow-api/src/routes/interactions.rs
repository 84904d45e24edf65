use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use prospectflow_core::model::{Interaction, InteractionFilter};
use prospectflow_core::rules::parse_interaction;
use prospectflow_engine::commands::interaction::{
    interaction_create, interaction_delete, interaction_list, interaction_update,
};
use serde::Deserialize;
use serde_json::Value;

use super::{body, method_not_allowed, IdQuery};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct ListQuery {
    #[serde(rename = "prospectId")]
    prospect_id: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/interactions",
        get(list)
            .post(create)
            .put(update)
            .delete(remove)
            .fallback(method_not_allowed("GET, POST, PUT, DELETE")),
    )
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Interaction>>, ApiError> {
    let filter = InteractionFilter {
        prospect_id: query
            .prospect_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty()),
    };
    state
        .run(move |store| interaction_list(store, &filter))
        .await
        .map(Json)
}

async fn create(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Interaction>), ApiError> {
    let input = parse_interaction(&body(payload)?)?;
    let interaction = state
        .run(move |store| interaction_create(store, input))
        .await?;
    Ok((StatusCode::CREATED, Json(interaction)))
}

async fn update(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Interaction>, ApiError> {
    let id = query.require("Interaction")?;
    let input = parse_interaction(&body(payload)?)?;
    state
        .run(move |store| interaction_update(store, &id, input))
        .await
        .map(Json)
}

async fn remove(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<StatusCode, ApiError> {
    let id = query.require("Interaction")?;
    state
        .run(move |store| interaction_delete(store, &id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
