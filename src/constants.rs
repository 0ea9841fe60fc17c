//! Upstream and service constants
//!
//! The upstream price service exposes one mapping document and four
//! time-window documents under a common base URL:
//!
//! | Path      | Shape                                   |
//! |-----------|-----------------------------------------|
//! | `mapping` | `[{"id": 2, "name": ..., ...}, ...]`    |
//! | `latest`  | `{"data": {"2": {"high": ..}}}`         |
//! | `5m`      | `{"data": {"2": {"avgHighPrice": ..}}}` |
//! | `1h`      | same as `5m`                            |
//! | `24h`     | same as `5m`                            |

/// Default upstream base URL (no trailing slash)
pub const DEFAULT_UPSTREAM_URL: &str = "https://prices.runescape.wiki/api/v1/osrs";

/// Identifying User-Agent sent on every upstream call
pub const DEFAULT_USER_AGENT: &str = "FlipTo5B-Dev/1.0";

/// Upstream path of the item mapping document
pub const MAPPING_PATH: &str = "mapping";

/// Default upstream request timeout
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

/// Default in-process price refresh interval (0 disables the worker)
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 60;

/// The background worker refreshes the mapping once every this many price refreshes
pub const MAPPING_REFRESH_EVERY: u64 = 24;

/// Default HTTP listen port
pub const DEFAULT_PORT: u16 = 8080;

/// Durable mirror location: collection `prices`, document `latest`
pub const MIRROR_COLLECTION: &str = "prices";
pub const MIRROR_DOCUMENT: &str = "latest";

/// Response header telling clients whether the cache has been warmed
pub const CACHE_STATUS_HEADER: &str = "x-cache-status";
