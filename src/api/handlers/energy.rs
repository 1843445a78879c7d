use super::{api_error, range_or, ApiResult};
use crate::api::models::{EnergySeriesParams, EnergySeriesResponse};
use crate::api::AppState;
use crate::dashboard::CurrentValues;
use crate::models::PowerPair;
use axum::{
    extract::{Query, State},
    response::Json,
};
use chrono::Utc;

/// Reconciled production/consumption series for a window. Sensors not named
/// in the query keep their configured role.
pub async fn get_series(
    State(state): State<AppState>,
    Query(params): Query<EnergySeriesParams>,
) -> ApiResult<EnergySeriesResponse> {
    let roles = state.service.roles();
    let pair = PowerPair {
        production: params
            .production
            .unwrap_or_else(|| roles.production.clone()),
        consumption: params
            .consumption
            .unwrap_or_else(|| roles.consumption.clone()),
    };
    let range = range_or(params.range.as_deref(), state.config.dashboard.default_range);
    let window = range.window(Utc::now());

    let panel = state
        .service
        .load_energy(&pair, window)
        .await
        .map_err(api_error)?;

    Ok(Json(EnergySeriesResponse::new(
        range,
        window,
        panel.pair,
        panel.series,
        panel.statistics,
    )))
}

/// Current values as last stored by the poller, if any.
pub async fn get_latest(State(state): State<AppState>) -> ApiResult<Option<CurrentValues>> {
    Ok(Json(state.service.display().current().await))
}
