use crate::models::{PowerPair, SeriesPoint, Share, Statistics};
use crate::series::{QueryWindow, TimeRange};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct EnergySeriesParams {
    pub range: Option<String>,
    pub production: Option<String>,
    pub consumption: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EnergySeriesResponse {
    pub range: TimeRange,
    pub window: QueryWindow,
    pub pair: PowerPair,
    pub series: Vec<SeriesPoint>,
    pub statistics: Statistics,
    pub total_production_kwh: f64,
    pub total_consumption_kwh: f64,
    pub current_share: Option<Share>,
    pub total_share: Option<Share>,
}

impl EnergySeriesResponse {
    pub fn new(
        range: TimeRange,
        window: QueryWindow,
        pair: PowerPair,
        series: Vec<SeriesPoint>,
        statistics: Statistics,
    ) -> Self {
        Self {
            range,
            window,
            pair,
            series,
            total_production_kwh: statistics.total_production_kwh(),
            total_consumption_kwh: statistics.total_consumption_kwh(),
            current_share: statistics.current_share(),
            total_share: statistics.total_share(),
            statistics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_energy_series_response_serialization() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let statistics = Statistics {
            current_production: 300.0,
            current_consumption: 100.0,
            total_production: 1500.0,
            total_consumption: 500.0,
        };
        let response = EnergySeriesResponse::new(
            TimeRange::SixHours,
            TimeRange::SixHours.window(now),
            PowerPair {
                production: "sensor.p".into(),
                consumption: "sensor.c".into(),
            },
            Vec::new(),
            statistics,
        );

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["range"], "6h");
        assert_eq!(json["total_production_kwh"], 1.5);
        assert_eq!(json["current_share"]["production_pct"], 75.0);
        assert!(json["window"]["end"].as_str().unwrap().starts_with("2025-01-01T12:00:00"));
    }
}
