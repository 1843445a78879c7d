use crate::dashboard::{CurrentValues, DashboardSnapshot};
use crate::models::SensorSelection;
use serde::{Deserialize, Serialize};

/// Body of a refresh call. Missing fields fall back to the configured
/// default range and to every catalog sensor.
#[derive(Debug, Default, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub selection: Option<SensorSelection>,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub snapshot: Option<DashboardSnapshot>,
    pub current: Option<CurrentValues>,
    pub last_error: Option<String>,
}
