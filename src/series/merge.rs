use crate::models::SensorSample;
use std::collections::BTreeMap;

/// Concatenates independent per-sensor series into one list ordered by
/// timestamp. The sort is stable, so samples sharing a timestamp keep their
/// per-sensor input order and sensors keep the map's key order.
pub fn merge_samples(per_sensor: &BTreeMap<String, Vec<SensorSample>>) -> Vec<SensorSample> {
    let mut merged: Vec<SensorSample> = per_sensor.values().flatten().cloned().collect();
    merged.sort_by_key(|s| s.timestamp);
    merged
}

/// Splits a merged list back into one series per entity id.
pub fn split_by_entity(samples: &[SensorSample]) -> BTreeMap<String, Vec<SensorSample>> {
    let mut out: BTreeMap<String, Vec<SensorSample>> = BTreeMap::new();
    for sample in samples {
        out.entry(sample.entity_id.clone())
            .or_default()
            .push(sample.clone());
    }
    out
}
