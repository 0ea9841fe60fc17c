use crate::error::Error;
use crate::models::{MappingEntry, MappingSnapshot, MergedSnapshot};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

// Shared store for passing between the server, the refresher and workers
pub type SharedPriceStore = Arc<PriceStore>;

/// Whether a cache has been populated since process start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Readiness {
    /// Startup refresh has not finished yet
    Warming,
    /// At least one refresh installed a snapshot
    Ready,
    /// Startup refresh finished without installing anything
    Failed,
}

impl Readiness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Readiness::Warming => "warming",
            Readiness::Ready => "ready",
            Readiness::Failed => "failed",
        }
    }
}

/// Latest merged prices plus the time they were installed
#[derive(Debug, Clone, Default)]
pub struct PriceSnapshot {
    pub data: MergedSnapshot,
    /// Seconds since epoch, never decreasing across installs
    pub last_updated: i64,
}

/// One atomically swapped snapshot. Readers clone the `Arc` and never see a
/// half-installed value.
struct Slot<T> {
    current: RwLock<Arc<T>>,
    readiness: RwLock<Readiness>,
}

impl<T: Default> Slot<T> {
    fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(T::default())),
            readiness: RwLock::new(Readiness::Warming),
        }
    }

    async fn load(&self) -> Arc<T> {
        self.current.read().await.clone()
    }

    async fn store(&self, value: T) {
        let next = Arc::new(value);
        *self.current.write().await = next;
        *self.readiness.write().await = Readiness::Ready;
    }

    async fn readiness(&self) -> Readiness {
        *self.readiness.read().await
    }

    async fn mark_failed(&self) {
        let mut readiness = self.readiness.write().await;
        if *readiness == Readiness::Warming {
            *readiness = Readiness::Failed;
        }
    }
}

/// In-memory mapping and price caches.
///
/// Each cache is replaced wholesale; there is no partial merge with the
/// previous snapshot.
pub struct PriceStore {
    mapping: Slot<MappingSnapshot>,
    prices: Slot<PriceSnapshot>,
}

impl Default for PriceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceStore {
    pub fn new() -> Self {
        Self {
            mapping: Slot::new(),
            prices: Slot::new(),
        }
    }

    /// Rebuild the mapping cache from a freshly fetched entry list.
    /// The cache is left untouched if any entry lacks a usable id.
    pub async fn replace_mapping(&self, entries: Vec<MappingEntry>) -> Result<usize, Error> {
        let mapping = index_mapping(entries)?;
        let count = mapping.len();
        self.mapping.store(mapping).await;
        debug!(items = count, "Mapping cache replaced");
        Ok(count)
    }

    /// Current mapping snapshot
    pub async fn mapping(&self) -> Arc<MappingSnapshot> {
        self.mapping.load().await
    }

    /// Current mapping entries, in item id order
    pub async fn get_mapping(&self) -> Vec<MappingEntry> {
        self.mapping.load().await.values().cloned().collect()
    }

    /// Install a merged snapshot. `now` is clamped so `last_updated` never
    /// moves backwards.
    pub async fn replace_prices(&self, data: MergedSnapshot, now: i64) -> usize {
        let previous = self.prices.load().await.last_updated;
        let count = data.len();
        self.prices
            .store(PriceSnapshot {
                data,
                last_updated: now.max(previous),
            })
            .await;
        debug!(items = count, "Price cache replaced");
        count
    }

    /// Current price snapshot
    pub async fn prices(&self) -> Arc<PriceSnapshot> {
        self.prices.load().await
    }

    pub async fn price_count(&self) -> usize {
        self.prices.load().await.data.len()
    }

    pub async fn mapping_count(&self) -> usize {
        self.mapping.load().await.len()
    }

    pub async fn last_updated(&self) -> i64 {
        self.prices.load().await.last_updated
    }

    pub async fn mapping_readiness(&self) -> Readiness {
        self.mapping.readiness().await
    }

    pub async fn price_readiness(&self) -> Readiness {
        self.prices.readiness().await
    }

    pub async fn mark_mapping_failed(&self) {
        self.mapping.mark_failed().await;
    }

    pub async fn mark_prices_failed(&self) {
        self.prices.mark_failed().await;
    }
}

/// Key entries by stringified id. An entry without a usable id makes the
/// whole document malformed.
pub fn index_mapping(entries: Vec<MappingEntry>) -> Result<MappingSnapshot, Error> {
    let mut mapping = MappingSnapshot::new();

    for (position, entry) in entries.into_iter().enumerate() {
        let id = entry.id().ok_or_else(|| {
            Error::Parse(format!("mapping entry {} has no usable id", position))
        })?;
        mapping.insert(id, entry);
    }

    Ok(mapping)
}
