use super::{api_error, range_or, ApiResult};
use crate::api::models::{AvailableSensorsResponse, SamplesParams, SamplesResponse, SensorGroup};
use crate::api::AppState;
use crate::models::SensorKind;
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use chrono::Utc;

pub async fn get_catalog(State(state): State<AppState>) -> ApiResult<Vec<SensorGroup>> {
    let catalog = state.service.catalog();
    Ok(Json(
        SensorKind::ALL
            .into_iter()
            .map(|kind| SensorGroup {
                kind,
                sensors: catalog.sensors(kind).to_vec(),
            })
            .collect(),
    ))
}

/// Power entities currently reporting in watts.
pub async fn get_available(State(state): State<AppState>) -> ApiResult<AvailableSensorsResponse> {
    let entities = state
        .service
        .available_power_sensors()
        .await
        .map_err(api_error)?;
    Ok(Json(AvailableSensorsResponse {
        unit: "W".into(),
        entities,
    }))
}

/// Merged samples of one sensor kind. Without `ids` every catalog sensor of
/// the kind is loaded.
pub async fn get_series(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(params): Query<SamplesParams>,
) -> ApiResult<SamplesResponse> {
    let kind: SensorKind = kind.parse().map_err(api_error)?;
    let mut ids = params.ids();
    if ids.is_empty() {
        ids = state
            .service
            .catalog()
            .sensors(kind)
            .iter()
            .map(|s| s.id.clone())
            .collect();
    }
    let range = range_or(params.range.as_deref(), state.config.dashboard.default_range);
    let window = range.window(Utc::now());

    let samples = state
        .service
        .load_samples(&ids, window)
        .await
        .map_err(api_error)?;

    Ok(Json(SamplesResponse {
        kind,
        range,
        window,
        samples,
    }))
}
