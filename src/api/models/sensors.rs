use crate::models::{SensorConfig, SensorKind, SensorSample};
use crate::series::{QueryWindow, TimeRange};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct SensorGroup {
    pub kind: SensorKind,
    pub sensors: Vec<SensorConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AvailableSensorsResponse {
    pub unit: String,
    pub entities: Vec<String>,
}

/// `ids` is a comma separated list of entity ids.
#[derive(Debug, Default, Deserialize)]
pub struct SamplesParams {
    pub range: Option<String>,
    pub ids: Option<String>,
}

impl SamplesParams {
    pub fn ids(&self) -> Vec<String> {
        self.ids
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(String::from)
            .collect()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SamplesResponse {
    pub kind: SensorKind,
    pub range: TimeRange,
    pub window: QueryWindow,
    pub samples: Vec<SensorSample>,
}
