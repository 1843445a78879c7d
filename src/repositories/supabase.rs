use super::{ReadingSource, RetrievalError};
use crate::config::SupabaseConfig;
use crate::models::RawReading;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

/// PostgREST access to the Home Assistant telemetry table.
pub struct SupabaseSource {
    base_url: String,
    api_key: String,
    table: String,
    access_token: RwLock<Option<String>>,
    client: Client,
    max_retries: u32,
    retry_delay: Duration,
}

#[derive(Debug, Deserialize)]
struct EntityRow {
    entity_id: String,
}

impl SupabaseSource {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        table: impl Into<String>,
    ) -> Result<Self, RetrievalError> {
        let client = Client::builder().timeout(Duration::from_secs(15)).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            table: table.into(),
            access_token: RwLock::new(None),
            client,
            max_retries: 3,
            retry_delay: Duration::from_millis(500),
        })
    }

    pub fn from_config(cfg: &SupabaseConfig) -> Result<Self, RetrievalError> {
        Ok(Self::new(&cfg.url, &cfg.anon_key, &cfg.table)?
            .with_retry_config(cfg.max_retries, Duration::from_millis(cfg.retry_delay_ms)))
    }

    pub fn with_retry_config(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.max_retries = max_retries.max(1);
        self.retry_delay = retry_delay;
        self
    }

    /// Use a signed-in user's token instead of the anon key as bearer.
    pub async fn set_access_token(&self, token: Option<String>) {
        *self.access_token.write().await = token;
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    async fn request(&self) -> RequestBuilder {
        let bearer = self
            .access_token
            .read()
            .await
            .clone()
            .unwrap_or_else(|| self.api_key.clone());
        self.client
            .get(self.table_url())
            .header("apikey", &self.api_key)
            .bearer_auth(bearer)
    }

    /// Sends the query, retrying transport failures with exponential backoff.
    async fn fetch_rows<T>(&self, query: &[(&str, String)]) -> Result<Vec<T>, RetrievalError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let mut attempts = 0;
        let mut delay = self.retry_delay;

        let response = loop {
            attempts += 1;
            match self.request().await.query(query).send().await {
                Ok(response) => break response,
                Err(e) if attempts >= self.max_retries => {
                    error!("Request failed after {} attempts: {}", attempts, e);
                    return Err(RetrievalError::Http(e));
                }
                Err(e) => {
                    warn!(
                        "Request failed (attempt {}/{}): {}. Retrying in {:?}",
                        attempts, self.max_retries, e, delay
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
            }
        };

        match response.status() {
            status if status.is_success() => Ok(response.json::<Vec<T>>().await?),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                error!(table = %self.table, "backend rejected credentials");
                Err(RetrievalError::Unauthorized)
            }
            status => {
                let message = response.text().await.unwrap_or_default();
                error!(table = %self.table, %status, %message, "backend query failed");
                Err(RetrievalError::Status {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }

    async fn latest_for(&self, entity_id: &str) -> Result<Option<RawReading>, RetrievalError> {
        let rows: Vec<RawReading> = self
            .fetch_rows(&[
                ("select", "*".to_string()),
                ("entity_id", format!("eq.{}", entity_id)),
                ("order", "timestamp.desc".to_string()),
                ("limit", "1".to_string()),
            ])
            .await?;
        Ok(rows.into_iter().next())
    }
}

fn iso(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[async_trait]
impl ReadingSource for SupabaseSource {
    async fn fetch_readings(
        &self,
        entity_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<RawReading>, RetrievalError> {
        let rows: Vec<RawReading> = self
            .fetch_rows(&[
                ("select", "*".to_string()),
                ("entity_id", format!("eq.{}", entity_id)),
                ("timestamp", format!("gte.{}", iso(start))),
                ("timestamp", format!("lte.{}", iso(end))),
                ("order", "timestamp.asc".to_string()),
            ])
            .await?;
        debug!(entity_id, rows = rows.len(), %start, %end, "fetched readings");
        Ok(rows)
    }

    async fn fetch_latest_pair(
        &self,
        id_a: &str,
        id_b: &str,
    ) -> Result<Option<(RawReading, RawReading)>, RetrievalError> {
        let (a, b) = futures::try_join!(self.latest_for(id_a), self.latest_for(id_b))?;
        Ok(a.zip(b))
    }

    async fn list_entities(&self, unit: &str) -> Result<Vec<String>, RetrievalError> {
        let rows: Vec<EntityRow> = self
            .fetch_rows(&[
                ("select", "entity_id".to_string()),
                ("unit_of_measurement", format!("eq.{}", unit)),
                ("order", "entity_id.asc".to_string()),
            ])
            .await?;
        let mut ids: Vec<String> = rows.into_iter().map(|r| r.entity_id).collect();
        ids.sort();
        ids.dedup();
        debug!(unit, entities = ids.len(), "listed entities");
        Ok(ids)
    }
}
