use super::service::DashboardService;
use crate::models::PowerPair;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Owns the periodic current-values refresh. Dropping the handle stops it.
pub struct PollerHandle {
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.task.abort();
        debug!("current values poller stopped");
    }
}

/// Refreshes the current values of `pair` right away and then every `period`.
/// A failed poll is logged and the next tick tries again.
pub fn spawn_current_poller(
    service: Arc<DashboardService>,
    pair: PowerPair,
    period: Duration,
) -> PollerHandle {
    info!(
        production = %pair.production,
        consumption = %pair.consumption,
        period_ms = period.as_millis() as u64,
        "starting current values poller"
    );
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match service.refresh_current(&pair).await {
                Ok(Some(point)) => debug!(
                    production = point.production,
                    consumption = point.consumption,
                    "current values refreshed"
                ),
                Ok(None) => debug!("no current values available"),
                Err(e) => warn!(error = %e, "current values refresh failed"),
            }
        }
    });
    PollerHandle { task }
}
