use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use prospectflow_core::model::InteractionTypeCount;
use prospectflow_core::queries::ConversionRate;
use prospectflow_engine::commands::statistics::{
    statistics_conversion_rate, statistics_interaction_stats,
};

use super::method_not_allowed;
use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/statistics/conversion-rate",
            get(conversion_rate).fallback(method_not_allowed("GET")),
        )
        .route(
            "/statistics/interaction-stats",
            get(interaction_stats).fallback(method_not_allowed("GET")),
        )
}

async fn conversion_rate(State(state): State<AppState>) -> Result<Json<ConversionRate>, ApiError> {
    state.run(statistics_conversion_rate).await.map(Json)
}

async fn interaction_stats(
    State(state): State<AppState>,
) -> Result<Json<Vec<InteractionTypeCount>>, ApiError> {
    state.run(statistics_interaction_stats).await.map(Json)
}
