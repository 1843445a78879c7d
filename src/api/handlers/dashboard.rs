use super::{api_error, ApiResult};
use crate::api::models::{DashboardResponse, RefreshRequest};
use crate::api::AppState;
use crate::dashboard::DashboardSnapshot;
use axum::{extract::State, response::Json};
use chrono::Utc;

pub async fn get_dashboard(State(state): State<AppState>) -> ApiResult<DashboardResponse> {
    let display = state.service.display();
    Ok(Json(DashboardResponse {
        snapshot: display.snapshot().await,
        current: display.current().await,
        last_error: display.last_error().await,
    }))
}

/// Runs a full fetch cycle for the requested selection and range.
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> ApiResult<DashboardSnapshot> {
    let selection = request
        .selection
        .unwrap_or_else(|| state.service.catalog().full_selection());
    let range = request
        .range
        .unwrap_or_else(|| state.config.dashboard.default_range.token().to_string());

    let snapshot = state
        .service
        .refresh(&selection, &range, Utc::now())
        .await
        .map_err(api_error)?;
    Ok(Json(snapshot))
}
