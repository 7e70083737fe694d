use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use super::domain::ContentRecord;
use super::notify::NotificationPublisher;
use super::service::ListingService;
use crate::workflows::catalog::CatalogStore;

/// Spawn the background task that publishes listings whose review window
/// elapsed. The first pass runs immediately; the task lives until aborted.
pub fn spawn_auto_publish_sweeper<S, N>(
    service: Arc<ListingService<S, N>>,
    every: Duration,
) -> JoinHandle<()>
where
    S: CatalogStore<ContentRecord> + 'static,
    N: NotificationPublisher + 'static,
{
    tokio::spawn(async move {
        info!(interval_secs = every.as_secs_f64(), "auto-publish sweeper started");
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if let Err(err) = service.sweep_auto_publish(Utc::now()) {
                error!(error = %err, "auto-publish sweep failed");
            }
        }
    })
}
