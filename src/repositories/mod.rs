pub mod supabase;

pub use supabase::SupabaseSource;

use crate::models::RawReading;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Backend returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Unauthorized - session missing or expired")]
    Unauthorized,
}

/// Read access to the telemetry table.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReadingSource: Send + Sync {
    /// Readings of one entity with `start <= timestamp <= end`, ascending.
    async fn fetch_readings(
        &self,
        entity_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<RawReading>, RetrievalError>;

    /// Most recent reading of each entity, `None` when either has no rows.
    async fn fetch_latest_pair(
        &self,
        id_a: &str,
        id_b: &str,
    ) -> Result<Option<(RawReading, RawReading)>, RetrievalError>;

    /// Distinct entity ids that report in `unit`, sorted.
    async fn list_entities(&self, unit: &str) -> Result<Vec<String>, RetrievalError>;
}
