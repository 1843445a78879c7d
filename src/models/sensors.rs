use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    Power,
    Temperature,
    Humidity,
    Co2,
}

impl SensorKind {
    pub const ALL: [SensorKind; 4] = [
        SensorKind::Power,
        SensorKind::Temperature,
        SensorKind::Humidity,
        SensorKind::Co2,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SensorKind::Power => "power",
            SensorKind::Temperature => "temperature",
            SensorKind::Humidity => "humidity",
            SensorKind::Co2 => "co2",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SensorKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "power" => Ok(SensorKind::Power),
            "temperature" => Ok(SensorKind::Temperature),
            "humidity" => Ok(SensorKind::Humidity),
            "co2" => Ok(SensorKind::Co2),
            other => Err(AppError::Configuration(format!(
                "unknown sensor kind: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorConfig {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SensorConfig {
    fn new(id: &str, name: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: Some(description.to_string()),
        }
    }
}

/// Which physical sensor feeds which display channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerRoles {
    pub production: String,
    pub consumption: String,
}

impl Default for PowerRoles {
    fn default() -> Self {
        Self {
            production: "sensor.ecu_current_power".into(),
            consumption: "sensor.shellyproem50_08f9e0e6d6c8_em0_power".into(),
        }
    }
}

/// Configured sensors per kind. Iteration order follows [`SensorKind`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SensorCatalog(pub BTreeMap<SensorKind, Vec<SensorConfig>>);

impl SensorCatalog {
    pub fn sensors(&self, kind: SensorKind) -> &[SensorConfig] {
        self.0.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every configured sensor selected, the dashboard's initial state.
    pub fn full_selection(&self) -> SensorSelection {
        let mut selection = SensorSelection::default();
        for (kind, sensors) in &self.0 {
            selection.set(*kind, sensors.iter().map(|s| s.id.clone()).collect());
        }
        selection
    }
}

impl Default for SensorCatalog {
    fn default() -> Self {
        let mut map = BTreeMap::new();
        map.insert(
            SensorKind::Power,
            vec![
                SensorConfig::new(
                    "sensor.ecu_current_power",
                    "Production ECU",
                    "Solar production reported by the ECU",
                ),
                SensorConfig::new(
                    "sensor.shellyproem50_08f9e0e6d6c8_em0_power",
                    "Consumption Shelly",
                    "Household consumption measured by the Shelly",
                ),
            ],
        );
        map.insert(
            SensorKind::Temperature,
            vec![
                SensorConfig::new(
                    "sensor.temperature_salon",
                    "Living room",
                    "Living room temperature",
                ),
                SensorConfig::new(
                    "sensor.temperature_parents",
                    "Parents",
                    "Parents' bedroom temperature",
                ),
                SensorConfig::new("sensor.temperature_bebe", "Nursery", "Nursery temperature"),
            ],
        );
        map.insert(
            SensorKind::Humidity,
            vec![SensorConfig::new(
                "sensor.ecu_humidity",
                "Humidity ECU",
                "Humidity measured by the ECU",
            )],
        );
        map.insert(
            SensorKind::Co2,
            vec![SensorConfig::new(
                "sensor.ecu_co2",
                "CO2 ECU",
                "CO2 level measured by the ECU",
            )],
        );
        Self(map)
    }
}

/// The user's selected entity ids per sensor kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SensorSelection(BTreeMap<SensorKind, Vec<String>>);

impl SensorSelection {
    pub fn get(&self, kind: SensorKind) -> &[String] {
        self.0.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn set(&mut self, kind: SensorKind, ids: Vec<String>) {
        self.0.insert(kind, ids);
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }
}

/// Two distinct entity ids reconciled into one energy series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerPair {
    pub production: String,
    pub consumption: String,
}

impl PowerPair {
    /// Builds the pair from a power selection.
    ///
    /// A selected sensor that is configured for a role always keeps that role.
    /// The other channel is filled by the first remaining selected id. With no
    /// configured sensor selected the first two ids are production and
    /// consumption, in order. Fewer than two distinct ids is a configuration error.
    pub fn from_selection(selected: &[String], roles: &PowerRoles) -> Result<Self, AppError> {
        let mut distinct: Vec<&String> = Vec::with_capacity(selected.len());
        for id in selected {
            if !distinct.contains(&id) {
                distinct.push(id);
            }
        }
        let has = |id: &str| distinct.iter().any(|s| s.as_str() == id);
        let first_other = |taken: &str| {
            distinct
                .iter()
                .find(|s| s.as_str() != taken)
                .map(|s| s.to_string())
        };
        let too_few = || {
            AppError::Configuration(format!(
                "a power panel needs two distinct sensors, got {}",
                distinct.len()
            ))
        };

        let (production, consumption) =
            match (has(&roles.production), has(&roles.consumption)) {
                (true, true) if roles.production != roles.consumption => {
                    (roles.production.clone(), roles.consumption.clone())
                }
                (true, _) => (
                    roles.production.clone(),
                    first_other(&roles.production).ok_or_else(too_few)?,
                ),
                (false, true) => (
                    first_other(&roles.consumption).ok_or_else(too_few)?,
                    roles.consumption.clone(),
                ),
                (false, false) => match distinct.as_slice() {
                    [production, consumption, ..] => {
                        (production.to_string(), consumption.to_string())
                    }
                    _ => return Err(too_few()),
                },
            };
        Ok(Self {
            production,
            consumption,
        })
    }
}

impl From<&PowerRoles> for PowerPair {
    fn from(roles: &PowerRoles) -> Self {
        Self {
            production: roles.production.clone(),
            consumption: roles.consumption.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_pair_keeps_configured_roles_regardless_of_order() {
        let roles = PowerRoles::default();
        let selected = ids(&[roles.consumption.as_str(), roles.production.as_str()]);

        let pair = PowerPair::from_selection(&selected, &roles).unwrap();

        assert_eq!(pair.production, roles.production);
        assert_eq!(pair.consumption, roles.consumption);
    }

    #[test]
    fn test_configured_production_keeps_its_channel_in_mixed_selection() {
        let roles = PowerRoles::default();
        let selected = ids(&["sensor.other_meter", roles.production.as_str()]);

        let pair = PowerPair::from_selection(&selected, &roles).unwrap();

        assert_eq!(pair.production, roles.production);
        assert_eq!(pair.consumption, "sensor.other_meter");
    }

    #[test]
    fn test_configured_consumption_keeps_its_channel_in_mixed_selection() {
        let roles = PowerRoles::default();
        let selected = ids(&[roles.consumption.as_str(), "sensor.other_meter"]);

        let pair = PowerPair::from_selection(&selected, &roles).unwrap();

        assert_eq!(pair.production, "sensor.other_meter");
        assert_eq!(pair.consumption, roles.consumption);
    }

    #[test]
    fn test_configured_sensor_without_partner_is_rejected() {
        let roles = PowerRoles::default();
        for selected in [
            ids(&[roles.production.as_str()]),
            ids(&[roles.production.as_str(), roles.production.as_str()]),
            ids(&[roles.consumption.as_str()]),
        ] {
            let err = PowerPair::from_selection(&selected, &roles).unwrap_err();
            assert!(matches!(err, AppError::Configuration(_)));
        }
    }

    #[test]
    fn test_pair_falls_back_to_selection_order() {
        let selected = ids(&["sensor.a", "sensor.b", "sensor.c"]);
        let pair = PowerPair::from_selection(&selected, &PowerRoles::default()).unwrap();

        assert_eq!(pair.production, "sensor.a");
        assert_eq!(pair.consumption, "sensor.b");
    }

    #[test]
    fn test_pair_rejects_fewer_than_two_sensors() {
        let roles = PowerRoles::default();
        for selected in [ids(&[]), ids(&["sensor.a"]), ids(&["sensor.a", "sensor.a"])] {
            let err = PowerPair::from_selection(&selected, &roles).unwrap_err();
            assert!(matches!(err, AppError::Configuration(_)));
        }
    }

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in SensorKind::ALL {
            assert_eq!(kind.as_str().parse::<SensorKind>().unwrap(), kind);
        }
        assert!("pressure".parse::<SensorKind>().is_err());
    }

    #[test]
    fn test_full_selection_selects_every_catalog_sensor() {
        let catalog = SensorCatalog::default();
        let selection = catalog.full_selection();

        assert_eq!(selection.get(SensorKind::Power).len(), 2);
        assert_eq!(selection.get(SensorKind::Temperature).len(), 3);
        assert_eq!(selection.get(SensorKind::Co2), ids(&["sensor.ecu_co2"]).as_slice());
        assert!(!selection.is_empty());
        assert!(SensorSelection::default().is_empty());
    }

    #[test]
    fn test_catalog_deserializes_from_yaml() {
        let yaml = r#"
power:
  - id: sensor.p
    name: P
temperature: []
"#;
        let catalog: SensorCatalog = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(catalog.sensors(SensorKind::Power)[0].id, "sensor.p");
        assert!(catalog.sensors(SensorKind::Humidity).is_empty());
    }
}
