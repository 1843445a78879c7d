use crate::api::handlers::{dashboard, energy, health, sensors};
use crate::config::Config;
use crate::dashboard::DashboardService;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tower_http::LatencyUnit;
use tracing::Level;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<DashboardService>,
    pub config: Config,
}

impl AppState {
    pub fn new(service: Arc<DashboardService>, config: Config) -> Self {
        Self { service, config }
    }
}

pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new().route("/health", get(health::health));

    let api_routes = Router::new()
        .route("/api/v1/sensors", get(sensors::get_catalog))
        .route("/api/v1/sensors/available", get(sensors::get_available))
        .route("/api/v1/sensors/{kind}/series", get(sensors::get_series))
        .route("/api/v1/energy/series", get(energy::get_series))
        .route("/api/v1/energy/latest", get(energy::get_latest))
        .route("/api/v1/dashboard", get(dashboard::get_dashboard))
        .route("/api/v1/dashboard/refresh", post(dashboard::refresh));

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .with_state(state)
        .layer(tower_http::cors::CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Millis),
                ),
        )
}
