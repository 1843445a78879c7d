use crate::error::AppError;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// One row of the telemetry table, as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawReading {
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub entity_id: String,
    #[serde(default, deserialize_with = "deserialize_state")]
    pub state: String,
    #[serde(rename = "unit_of_measurement", alias = "unit", default)]
    pub unit: String,
}

impl RawReading {
    pub fn new(
        timestamp: DateTime<Utc>,
        entity_id: impl Into<String>,
        state: impl Into<String>,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            entity_id: entity_id.into(),
            state: state.into(),
            unit: unit.into(),
        }
    }

    /// Parses `state` as a finite number.
    pub fn value(&self) -> Result<f64, AppError> {
        self.state
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| AppError::Parse {
                entity_id: self.entity_id.clone(),
                state: self.state.clone(),
            })
    }
}

/// Accepts RFC 3339 timestamps and zone-less ones, the latter taken as UTC.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .map_err(|e| serde::de::Error::custom(format!("invalid timestamp '{}': {}", raw, e)))
}

/// `null` states become empty strings and fail later as non-numeric.
fn deserialize_state<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// One aligned (production, consumption) pair. Both channels are non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub timestamp: DateTime<Utc>,
    pub production: f64,
    pub consumption: f64,
    pub unit: String,
}

/// A reading of a non-power sensor (temperature, humidity, CO2).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSample {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub entity_id: String,
}

impl TryFrom<&RawReading> for SensorSample {
    type Error = AppError;

    fn try_from(reading: &RawReading) -> Result<Self, Self::Error> {
        Ok(Self {
            timestamp: reading.timestamp,
            value: reading.value()?,
            entity_id: reading.entity_id.clone(),
        })
    }
}
