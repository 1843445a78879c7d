pub mod dashboard;
pub mod energy;
pub mod sensors;

use serde::{Deserialize, Serialize};

pub use dashboard::{DashboardResponse, RefreshRequest};
pub use energy::{EnergySeriesParams, EnergySeriesResponse};
pub use sensors::{AvailableSensorsResponse, SamplesParams, SamplesResponse, SensorGroup};

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
