#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use energy_dashboard::models::RawReading;
use energy_dashboard::repositories::{ReadingSource, RetrievalError};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

pub const PRODUCTION: &str = "sensor.ecu_current_power";
pub const CONSUMPTION: &str = "sensor.shellyproem50_08f9e0e6d6c8_em0_power";

/// In-memory table of readings keyed by entity id.
#[derive(Default)]
pub struct FakeSource {
    rows: Mutex<BTreeMap<String, Vec<RawReading>>>,
    failing: AtomicBool,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, reading: RawReading) {
        let mut rows = self.rows.lock().unwrap();
        let entry = rows.entry(reading.entity_id.clone()).or_default();
        entry.push(reading);
        entry.sort_by_key(|r| r.timestamp);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), RetrievalError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RetrievalError::Status {
                status: 503,
                message: "service unavailable".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ReadingSource for FakeSource {
    async fn fetch_readings(
        &self,
        entity_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<RawReading>, RetrievalError> {
        self.check()?;
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .get(entity_id)
            .map(|readings| {
                readings
                    .iter()
                    .filter(|r| r.timestamp >= start && r.timestamp <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn fetch_latest_pair(
        &self,
        id_a: &str,
        id_b: &str,
    ) -> Result<Option<(RawReading, RawReading)>, RetrievalError> {
        self.check()?;
        let rows = self.rows.lock().unwrap();
        let latest = |id: &str| rows.get(id).and_then(|r| r.last().cloned());
        Ok(latest(id_a).zip(latest(id_b)))
    }

    async fn list_entities(&self, unit: &str) -> Result<Vec<String>, RetrievalError> {
        self.check()?;
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|(_, readings)| readings.iter().any(|r| r.unit == unit))
            .map(|(id, _)| id.clone())
            .collect())
    }
}

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

pub fn reading(entity_id: &str, minutes: i64, state: &str, unit: &str) -> RawReading {
    RawReading::new(base_time() + Duration::minutes(minutes), entity_id, state, unit)
}

/// A reading `minutes_ago` before `now`, for handlers that window on the wall clock.
pub fn recent(
    now: DateTime<Utc>,
    entity_id: &str,
    minutes_ago: i64,
    state: &str,
    unit: &str,
) -> RawReading {
    RawReading::new(now - Duration::minutes(minutes_ago), entity_id, state, unit)
}
