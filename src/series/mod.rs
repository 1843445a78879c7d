//! Pure time-series reshaping: window resolution, reconciliation of power
//! pairs, merging of independent sensor series and display statistics.

pub mod aggregate;
pub mod merge;
pub mod reconcile;
pub mod window;

pub use aggregate::{aggregate, INTERVAL_HOURS};
pub use merge::{merge_samples, split_by_entity};
pub use reconcile::{reconcile, ReconcilePolicy};
pub use window::{resolve_window, QueryWindow, TimeRange};
