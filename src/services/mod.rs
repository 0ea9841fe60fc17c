pub mod merger;
pub mod mirror;
pub mod price_store;
pub mod refresher;
pub mod stats;
pub mod wiki_client;

pub use merger::WindowSet;
pub use mirror::{connect_optional as connect_mirror, SnapshotMirror};
pub use price_store::{PriceSnapshot, PriceStore, Readiness, SharedPriceStore};
pub use refresher::{RefreshOutcome, Refresher, SharedRefresher, WarmupReport};
pub use stats::{RefreshStats, SharedRefreshStats};
pub use wiki_client::WikiClient;
