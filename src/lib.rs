//! Home energy dashboard backend.
//!
//! Reads Home Assistant sensor rows from a Supabase table, reconciles the
//! production and consumption power streams into one aligned series, merges
//! auxiliary sensor series and serves the result as a JSON API.

pub mod api;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod models;
pub mod repositories;
pub mod series;

pub use config::Config;
pub use dashboard::{DashboardService, DisplayState, PollerHandle};
pub use error::{AppError, Result};
pub use repositories::{ReadingSource, RetrievalError, SupabaseSource};
