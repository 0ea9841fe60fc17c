use crate::constants::MAPPING_REFRESH_EVERY;
use crate::services::{SharedRefreshStats, SharedRefresher};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, instrument, warn};

/// Periodic refresh loop.
///
/// Sleeps first: the startup warm-up has already populated both caches.
/// Prices refresh every `interval`, the mapping every
/// `MAPPING_REFRESH_EVERY` iterations. Runs through the shared refresher so
/// it queues behind manual triggers instead of racing them.
#[instrument(skip(refresher, stats))]
pub async fn run(refresher: SharedRefresher, stats: SharedRefreshStats, interval: Duration) {
    info!(
        interval_secs = interval.as_secs(),
        mapping_every = MAPPING_REFRESH_EVERY,
        "Starting price worker"
    );

    let mut iteration_count = 0u64;

    loop {
        sleep(interval).await;
        iteration_count += 1;
        let loop_start = std::time::Instant::now();

        if iteration_count % MAPPING_REFRESH_EVERY == 0 {
            let outcome = refresher.refresh_mapping().await;
            if !outcome.is_success() {
                warn!(iteration = iteration_count, "Price worker: Mapping refresh failed");
            }
        }

        let outcome = refresher.refresh_prices().await;

        stats.write().await.worker_iteration_count = iteration_count;

        info!(
            iteration = iteration_count,
            items = outcome.count(),
            success = outcome.is_success(),
            loop_duration_secs = loop_start.elapsed().as_secs_f64(),
            "Price worker: Iteration completed"
        );
    }
}
