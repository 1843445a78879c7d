use serde::{Deserialize, Serialize};

/// Display statistics for one energy panel. Totals are in Wh for W inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub current_production: f64,
    pub current_consumption: f64,
    pub total_production: f64,
    pub total_consumption: f64,
}

/// Production/consumption split of a pair of values, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Share {
    pub production_pct: f64,
    pub consumption_pct: f64,
}

impl Share {
    fn of(production: f64, consumption: f64) -> Option<Self> {
        let sum = production + consumption;
        if sum <= 0.0 {
            return None;
        }
        Some(Self {
            production_pct: production / sum * 100.0,
            consumption_pct: consumption / sum * 100.0,
        })
    }
}

impl Statistics {
    pub fn total_production_kwh(&self) -> f64 {
        self.total_production / 1000.0
    }

    pub fn total_consumption_kwh(&self) -> f64 {
        self.total_consumption / 1000.0
    }

    /// `None` when both current values are zero.
    pub fn current_share(&self) -> Option<Share> {
        Share::of(self.current_production, self.current_consumption)
    }

    pub fn total_share(&self) -> Option<Share> {
        Share::of(self.total_production, self.total_consumption)
    }
}
