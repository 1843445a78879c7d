pub mod display;
pub mod poller;
pub mod service;

pub use display::{CurrentValues, DashboardSnapshot, DisplayState, EnergyPanel, Ticket};
pub use poller::{spawn_current_poller, PollerHandle};
pub use service::{latest_point, DashboardService, PanelData, PanelRequest};
