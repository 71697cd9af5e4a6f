use axum::{
    extract::{State, rejection::JsonRejection},
    response::Json,
};

use folio_model::{ClickCount, ClickRequest};

use crate::infra::{app_state::AppState, errors::AppResult};

pub async fn record_click(
    State(state): State<AppState>,
    payload: Result<Json<ClickRequest>, JsonRejection>,
) -> AppResult<Json<ClickCount>> {
    let Json(request) = payload?;
    Ok(Json(state.analytics.record(&request.button_type).await?))
}

pub async fn list_clicks(State(state): State<AppState>) -> AppResult<Json<Vec<ClickCount>>> {
    Ok(Json(state.analytics.counts().await?))
}
