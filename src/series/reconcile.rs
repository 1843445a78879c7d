use crate::error::AppError;
use crate::models::{RawReading, SeriesPoint};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

const DEFAULT_UNIT: &str = "W";

/// How two independently sampled power streams are aligned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcilePolicy {
    /// Emit only at timestamps where both streams have a reading.
    StrictCoincidence,
    /// Emit at every distinct timestamp once both streams have reported,
    /// carrying the other stream's last value forward.
    #[default]
    ForwardFill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Channel {
    Production,
    Consumption,
}

struct Event<'a> {
    key: i64,
    timestamp: DateTime<Utc>,
    channel: Channel,
    value: f64,
    unit: &'a str,
}

/// Merges a production stream and a consumption stream into one aligned
/// series, ordered by timestamp with unique millisecond keys.
///
/// Every state is parsed before anything is emitted, so a single non-numeric
/// reading fails the whole call.
pub fn reconcile(
    production: &[RawReading],
    consumption: &[RawReading],
    policy: ReconcilePolicy,
) -> Result<Vec<SeriesPoint>, AppError> {
    let mut events = Vec::with_capacity(production.len() + consumption.len());
    for (readings, channel) in [
        (production, Channel::Production),
        (consumption, Channel::Consumption),
    ] {
        for r in readings {
            events.push(Event {
                key: r.timestamp.timestamp_millis(),
                timestamp: r.timestamp,
                channel,
                value: r.value()?.abs(),
                unit: &r.unit,
            });
        }
    }
    // Stable: within one key, production readings precede consumption
    // readings and each stream keeps its input order.
    events.sort_by_key(|e| e.key);

    let points = match policy {
        ReconcilePolicy::StrictCoincidence => strict_coincidence(&events),
        ReconcilePolicy::ForwardFill => forward_fill(&events),
    };

    debug!(
        production = production.len(),
        consumption = consumption.len(),
        points = points.len(),
        ?policy,
        "reconciled power series"
    );
    Ok(points)
}

#[derive(Default)]
struct Slot<'a> {
    timestamp: Option<DateTime<Utc>>,
    production: Option<f64>,
    consumption: Option<f64>,
    unit: &'a str,
}

impl<'a> Slot<'a> {
    fn apply(&mut self, event: &Event<'a>) {
        self.timestamp = Some(event.timestamp);
        match event.channel {
            Channel::Production => self.production = Some(event.value),
            Channel::Consumption => self.consumption = Some(event.value),
        }
        self.unit = event.unit;
    }

    fn point(&self) -> Option<SeriesPoint> {
        Some(SeriesPoint {
            timestamp: self.timestamp?,
            production: self.production?,
            consumption: self.consumption?,
            unit: if self.unit.is_empty() {
                DEFAULT_UNIT.to_string()
            } else {
                self.unit.to_string()
            },
        })
    }
}

fn strict_coincidence(events: &[Event<'_>]) -> Vec<SeriesPoint> {
    let mut slots: BTreeMap<i64, Slot<'_>> = BTreeMap::new();
    for event in events {
        slots.entry(event.key).or_default().apply(event);
    }
    slots.values().filter_map(Slot::point).collect()
}

fn forward_fill(events: &[Event<'_>]) -> Vec<SeriesPoint> {
    let mut points = Vec::new();
    let mut last = Slot::default();

    for group in events.chunk_by(|a, b| a.key == b.key) {
        for event in group {
            last.apply(event);
        }
        if let Some(point) = last.point() {
            points.push(point);
        }
    }
    points
}
