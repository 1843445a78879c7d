use crate::models::{PowerPair, SensorKind, SensorSample, SeriesPoint, Statistics};
use crate::series::{QueryWindow, TimeRange};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnergyPanel {
    pub pair: PowerPair,
    pub series: Vec<SeriesPoint>,
    pub statistics: Statistics,
}

/// Everything one full fetch cycle produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub range: TimeRange,
    pub window: QueryWindow,
    pub energy: Option<EnergyPanel>,
    pub samples: BTreeMap<SensorKind, Vec<SensorSample>>,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentValues {
    pub pair: PowerPair,
    pub point: SeriesPoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Snapshot,
    Current,
}

/// Proof that a fetch was started; only the newest ticket of a slot may commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    slot: Slot,
    generation: u64,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Default)]
struct Inner {
    snapshot: Option<DashboardSnapshot>,
    current: Option<CurrentValues>,
    last_error: Option<String>,
}

/// Shared display state written by fetch completions.
///
/// Each fetch takes a [`Ticket`]; a response whose ticket is older than the
/// newest one issued for its slot is dropped, so a slow stale response can
/// never overwrite a newer one. Failures keep the previous data.
#[derive(Debug, Default)]
pub struct DisplayState {
    snapshot_generation: AtomicU64,
    current_generation: AtomicU64,
    inner: RwLock<Inner>,
}

impl DisplayState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_snapshot(&self) -> Ticket {
        Ticket {
            slot: Slot::Snapshot,
            generation: self.snapshot_generation.fetch_add(1, Ordering::SeqCst) + 1,
        }
    }

    pub fn begin_current(&self) -> Ticket {
        Ticket {
            slot: Slot::Current,
            generation: self.current_generation.fetch_add(1, Ordering::SeqCst) + 1,
        }
    }

    fn is_latest(&self, ticket: Ticket) -> bool {
        let newest = match ticket.slot {
            Slot::Snapshot => self.snapshot_generation.load(Ordering::SeqCst),
            Slot::Current => self.current_generation.load(Ordering::SeqCst),
        };
        ticket.generation == newest
    }

    /// Stores the snapshot unless a newer fetch was started. Returns whether it was stored.
    pub async fn commit_snapshot(&self, ticket: Ticket, mut snapshot: DashboardSnapshot) -> bool {
        debug_assert_eq!(ticket.slot, Slot::Snapshot);
        let mut inner = self.inner.write().await;
        if !self.is_latest(ticket) {
            debug!(generation = ticket.generation, "discarding stale snapshot");
            return false;
        }
        if let (Some(energy), Some(current)) = (snapshot.energy.as_mut(), inner.current.as_ref()) {
            if energy.pair == current.pair && !energy.series.is_empty() {
                energy.statistics.current_production = current.point.production;
                energy.statistics.current_consumption = current.point.consumption;
            }
        }
        inner.snapshot = Some(snapshot);
        inner.last_error = None;
        true
    }

    /// Stores fresh current values and patches the committed statistics for the same pair.
    pub async fn commit_current(&self, ticket: Ticket, current: CurrentValues) -> bool {
        debug_assert_eq!(ticket.slot, Slot::Current);
        let mut inner = self.inner.write().await;
        if !self.is_latest(ticket) {
            debug!(generation = ticket.generation, "discarding stale current values");
            return false;
        }
        if let Some(energy) = inner.snapshot.as_mut().and_then(|s| s.energy.as_mut()) {
            if energy.pair == current.pair && !energy.series.is_empty() {
                energy.statistics.current_production = current.point.production;
                energy.statistics.current_consumption = current.point.consumption;
            }
        }
        inner.current = Some(current);
        true
    }

    /// Records a failed fetch; previously committed data stays untouched.
    pub async fn record_error(&self, ticket: Ticket, message: impl Into<String>) -> bool {
        let mut inner = self.inner.write().await;
        if !self.is_latest(ticket) {
            debug!(generation = ticket.generation, "discarding stale error");
            return false;
        }
        inner.last_error = Some(message.into());
        true
    }

    pub async fn snapshot(&self) -> Option<DashboardSnapshot> {
        self.inner.read().await.snapshot.clone()
    }

    pub async fn current(&self) -> Option<CurrentValues> {
        self.inner.read().await.current.clone()
    }

    pub async fn last_error(&self) -> Option<String> {
        self.inner.read().await.last_error.clone()
    }
}
