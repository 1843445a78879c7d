use super::display::{CurrentValues, DashboardSnapshot, DisplayState, EnergyPanel};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{
    PowerPair, PowerRoles, RawReading, SensorCatalog, SensorKind, SensorSample, SensorSelection,
    SeriesPoint,
};
use crate::repositories::ReadingSource;
use crate::series::{aggregate, merge_samples, reconcile, QueryWindow, ReconcilePolicy, TimeRange};
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, info};

/// What to load for one chart panel.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelRequest {
    Power(PowerPair),
    Samples {
        kind: SensorKind,
        sensors: Vec<String>,
    },
}

/// The loaded data for one chart panel.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelData {
    Energy(EnergyPanel),
    Samples {
        kind: SensorKind,
        samples: Vec<SensorSample>,
    },
}

pub struct DashboardService {
    source: Arc<dyn ReadingSource>,
    catalog: SensorCatalog,
    roles: PowerRoles,
    policy: ReconcilePolicy,
    display: DisplayState,
}

impl DashboardService {
    pub fn new(
        source: Arc<dyn ReadingSource>,
        catalog: SensorCatalog,
        roles: PowerRoles,
        policy: ReconcilePolicy,
    ) -> Self {
        Self {
            source,
            catalog,
            roles,
            policy,
            display: DisplayState::new(),
        }
    }

    pub fn from_config(source: Arc<dyn ReadingSource>, cfg: &Config) -> Self {
        Self::new(
            source,
            cfg.sensors.catalog.clone(),
            cfg.sensors.power.clone(),
            cfg.dashboard.policy,
        )
    }

    pub fn catalog(&self) -> &SensorCatalog {
        &self.catalog
    }

    pub fn roles(&self) -> &PowerRoles {
        &self.roles
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    /// Turns a selection into panel requests. A non-empty power selection
    /// must name two distinct sensors.
    pub fn requests_for(&self, selection: &SensorSelection) -> Result<Vec<PanelRequest>> {
        let mut requests = Vec::new();
        for kind in SensorKind::ALL {
            let sensors = selection.get(kind);
            if sensors.is_empty() {
                continue;
            }
            requests.push(match kind {
                SensorKind::Power => {
                    PanelRequest::Power(PowerPair::from_selection(sensors, &self.roles)?)
                }
                _ => PanelRequest::Samples {
                    kind,
                    sensors: sensors.to_vec(),
                },
            });
        }
        Ok(requests)
    }

    pub async fn load_panel(&self, request: &PanelRequest, window: QueryWindow) -> Result<PanelData> {
        match request {
            PanelRequest::Power(pair) => Ok(PanelData::Energy(self.load_energy(pair, window).await?)),
            PanelRequest::Samples { kind, sensors } => Ok(PanelData::Samples {
                kind: *kind,
                samples: self.load_samples(sensors, window).await?,
            }),
        }
    }

    /// Fetches both power streams, reconciles them and computes statistics.
    /// Current values come from the last polled reading of the same pair.
    pub async fn load_energy(&self, pair: &PowerPair, window: QueryWindow) -> Result<EnergyPanel> {
        if pair.production == pair.consumption {
            return Err(AppError::Configuration(
                "production and consumption must be different sensors".into(),
            ));
        }
        let (production, consumption) = futures::try_join!(
            self.source
                .fetch_readings(&pair.production, window.start, window.end),
            self.source
                .fetch_readings(&pair.consumption, window.start, window.end),
        )?;

        let series = reconcile(&production, &consumption, self.policy)?;
        let current = self
            .display
            .current()
            .await
            .filter(|c| &c.pair == pair)
            .map(|c| c.point);
        let statistics = aggregate(&series, current.as_ref());

        debug!(
            production = %pair.production,
            consumption = %pair.consumption,
            points = series.len(),
            "loaded energy panel"
        );
        Ok(EnergyPanel {
            pair: pair.clone(),
            series,
            statistics,
        })
    }

    /// Fetches every sensor concurrently and merges them into one ordered list.
    pub async fn load_samples(
        &self,
        sensors: &[String],
        window: QueryWindow,
    ) -> Result<Vec<SensorSample>> {
        let fetched = try_join_all(sensors.iter().map(|id| async move {
            let readings = self
                .source
                .fetch_readings(id, window.start, window.end)
                .await?;
            Ok::<_, AppError>((id.clone(), readings))
        }))
        .await?;

        let mut per_sensor = BTreeMap::new();
        for (id, readings) in fetched {
            let samples = readings
                .iter()
                .map(SensorSample::try_from)
                .collect::<Result<Vec<_>>>()?;
            per_sensor.insert(id, samples);
        }
        Ok(merge_samples(&per_sensor))
    }

    /// Runs a full fetch cycle and commits it unless a newer cycle started meanwhile.
    ///
    /// On failure the previously committed snapshot is left in place and the
    /// error is recorded and returned unchanged.
    pub async fn refresh(
        &self,
        selection: &SensorSelection,
        range: &str,
        now: DateTime<Utc>,
    ) -> Result<DashboardSnapshot> {
        let ticket = self.display.begin_snapshot();
        match self.build_snapshot(selection, range, now).await {
            Ok(snapshot) => {
                if self.display.commit_snapshot(ticket, snapshot.clone()).await {
                    info!(
                        generation = ticket.generation(),
                        range = %snapshot.range,
                        "dashboard refreshed"
                    );
                }
                Ok(snapshot)
            }
            Err(e) => {
                error!(generation = ticket.generation(), error = %e, "dashboard refresh failed");
                self.display.record_error(ticket, e.to_string()).await;
                Err(e)
            }
        }
    }

    async fn build_snapshot(
        &self,
        selection: &SensorSelection,
        range: &str,
        now: DateTime<Utc>,
    ) -> Result<DashboardSnapshot> {
        let range = TimeRange::parse_lenient(range);
        let window = range.window(now);
        let requests = self.requests_for(selection)?;

        let panels = try_join_all(requests.iter().map(|r| self.load_panel(r, window))).await?;

        let mut energy = None;
        let mut samples = BTreeMap::new();
        for panel in panels {
            match panel {
                PanelData::Energy(panel) => energy = Some(panel),
                PanelData::Samples { kind, samples: s } => {
                    samples.insert(kind, s);
                }
            }
        }

        Ok(DashboardSnapshot {
            range,
            window,
            energy,
            samples,
            loaded_at: now,
        })
    }

    /// Fetches the latest reading of each sensor of the pair and stores it as
    /// the current values. `None` when either sensor has never reported.
    pub async fn refresh_current(&self, pair: &PowerPair) -> Result<Option<SeriesPoint>> {
        let ticket = self.display.begin_current();
        let latest = self
            .source
            .fetch_latest_pair(&pair.production, &pair.consumption)
            .await?;
        let Some((production, consumption)) = latest else {
            debug!(
                production = %pair.production,
                consumption = %pair.consumption,
                "no latest readings yet"
            );
            return Ok(None);
        };

        let point = latest_point(&production, &consumption)?;
        self.display
            .commit_current(
                ticket,
                CurrentValues {
                    pair: pair.clone(),
                    point: point.clone(),
                },
            )
            .await;
        Ok(Some(point))
    }

    pub async fn available_power_sensors(&self) -> Result<Vec<String>> {
        Ok(self.source.list_entities("W").await?)
    }
}

/// The most recent production/consumption pair as one point, stamped with
/// the newer of the two readings.
pub fn latest_point(production: &RawReading, consumption: &RawReading) -> Result<SeriesPoint> {
    let unit = [&production.unit, &consumption.unit]
        .into_iter()
        .find(|u| !u.is_empty())
        .cloned()
        .unwrap_or_else(|| "W".to_string());
    Ok(SeriesPoint {
        timestamp: production.timestamp.max(consumption.timestamp),
        production: production.value()?.abs(),
        consumption: consumption.value()?.abs(),
        unit,
    })
}
