pub mod reading;
pub mod sensors;
pub mod stats;

pub use reading::{RawReading, SensorSample, SeriesPoint};
pub use sensors::{
    PowerPair, PowerRoles, SensorCatalog, SensorConfig, SensorKind, SensorSelection,
};
pub use stats::{Share, Statistics};
