use crate::services::mirror::SnapshotMirror;
use crate::services::price_store::SharedPriceStore;
use crate::services::stats::SharedRefreshStats;
use crate::services::wiki_client::WikiClient;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, instrument, warn};

pub type SharedRefresher = Arc<Refresher>;

/// Result of one refresh. Failures are reported, never raised: the previous
/// snapshot stays in place and `count` reflects it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Updated { count: usize },
    Failed { count: usize, error: String },
}

impl RefreshOutcome {
    pub fn count(&self) -> usize {
        match self {
            RefreshOutcome::Updated { count } | RefreshOutcome::Failed { count, .. } => *count,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RefreshOutcome::Updated { .. })
    }
}

/// Outcome of the startup refresh (mapping, then prices)
#[derive(Debug, Clone)]
pub struct WarmupReport {
    pub mapping: RefreshOutcome,
    pub prices: RefreshOutcome,
}

/// Fetches upstream data and installs it into the caches.
///
/// At most one mapping refresh and one price refresh run at a time; a call
/// arriving while another of the same kind is in flight waits for it to
/// finish and then runs.
pub struct Refresher {
    client: WikiClient,
    store: SharedPriceStore,
    stats: SharedRefreshStats,
    mirror: Option<SnapshotMirror>,
    mapping_gate: Mutex<()>,
    prices_gate: Mutex<()>,
}

impl Refresher {
    pub fn new(
        client: WikiClient,
        store: SharedPriceStore,
        stats: SharedRefreshStats,
        mirror: Option<SnapshotMirror>,
    ) -> Self {
        Self {
            client,
            store,
            stats,
            mirror,
            mapping_gate: Mutex::new(()),
            prices_gate: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &SharedPriceStore {
        &self.store
    }

    pub fn has_mirror(&self) -> bool {
        self.mirror.is_some()
    }

    /// Fetch the item mapping and replace the mapping cache
    #[instrument(skip(self))]
    pub async fn refresh_mapping(&self) -> RefreshOutcome {
        let _guard = self.mapping_gate.lock().await;
        info!("Fetching mapping from upstream");

        let replaced = match self.client.fetch_mapping().await {
            Ok(entries) => self.store.replace_mapping(entries).await,
            Err(e) => Err(e),
        };

        match replaced {
            Ok(count) => {
                let mut stats = self.stats.write().await;
                stats.mapping_last_refresh = Some(Utc::now().to_rfc3339());
                stats.mapping_refresh_count += 1;

                info!(items = count, "Mapping loaded");
                RefreshOutcome::Updated { count }
            }
            Err(e) => {
                error!(error = %e, "Error refreshing mapping, keeping previous mapping");
                self.store.mark_mapping_failed().await;

                let mut stats = self.stats.write().await;
                stats.mapping_failure_count += 1;
                stats.last_error = Some(e.to_string());

                RefreshOutcome::Failed {
                    count: self.store.mapping_count().await,
                    error: e.to_string(),
                }
            }
        }
    }

    /// Fetch all windows, merge them and replace the price cache
    #[instrument(skip(self))]
    pub async fn refresh_prices(&self) -> RefreshOutcome {
        let _guard = self.prices_gate.lock().await;
        info!("Fetching prices from upstream");

        let windows = match self.client.fetch_all_windows().await {
            Ok(windows) => windows,
            Err(e) => {
                error!(error = %e, "Error refreshing prices, keeping previous snapshot");
                self.store.mark_prices_failed().await;

                let mut stats = self.stats.write().await;
                stats.prices_failure_count += 1;
                stats.last_error = Some(e.to_string());

                return RefreshOutcome::Failed {
                    count: self.store.price_count().await,
                    error: e.to_string(),
                };
            }
        };

        let merged = windows.merge();
        let count = self
            .store
            .replace_prices(merged, Utc::now().timestamp())
            .await;

        {
            let mut stats = self.stats.write().await;
            stats.prices_last_refresh = Some(Utc::now().to_rfc3339());
            stats.prices_refresh_count += 1;
        }

        info!(items = count, "Prices updated");

        if let Some(mirror) = &self.mirror {
            let snapshot = self.store.prices().await;
            if let Err(e) = mirror.write_latest(&snapshot.data, snapshot.last_updated).await {
                // The in-memory snapshot is already installed and stays authoritative
                warn!(error = %e, "Failed to mirror price snapshot");
                self.stats.write().await.mirror_write_failures += 1;
            }
        }

        RefreshOutcome::Updated { count }
    }

    /// Startup population: mapping first, then prices
    pub async fn warm_up(&self) -> WarmupReport {
        let mapping = self.refresh_mapping().await;
        let prices = self.refresh_prices().await;

        info!(
            mapping_items = mapping.count(),
            price_items = prices.count(),
            mapping_ok = mapping.is_success(),
            prices_ok = prices.is_success(),
            "Startup refresh finished"
        );

        WarmupReport { mapping, prices }
    }
}
