use crate::services::{SharedRefresher, WarmupReport};
use tokio::task::JoinHandle;

/// Run the startup refresh (mapping, then prices) in the background.
///
/// The listener does not wait for it; until it finishes the caches report
/// `warming`. The handle resolves with the outcome of both refreshes.
pub fn spawn_warmup(refresher: SharedRefresher) -> JoinHandle<WarmupReport> {
    tokio::spawn(async move { refresher.warm_up().await })
}
