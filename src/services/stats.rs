use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Refresh and process statistics reported by `/health`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RefreshStats {
    // Mapping refreshes
    pub mapping_last_refresh: Option<String>,
    pub mapping_refresh_count: u64,
    pub mapping_failure_count: u64,

    // Price refreshes
    pub prices_last_refresh: Option<String>,
    pub prices_refresh_count: u64,
    pub prices_failure_count: u64,
    pub last_error: Option<String>,

    // Background worker
    pub worker_iteration_count: u64,

    // Durable mirror
    pub mirror_enabled: bool,
    pub mirror_write_failures: u64,

    // System info
    pub uptime_secs: u64,
    pub current_system_time: String,
}

impl Default for RefreshStats {
    fn default() -> Self {
        Self {
            mapping_last_refresh: None,
            mapping_refresh_count: 0,
            mapping_failure_count: 0,
            prices_last_refresh: None,
            prices_refresh_count: 0,
            prices_failure_count: 0,
            last_error: None,
            worker_iteration_count: 0,
            mirror_enabled: false,
            mirror_write_failures: 0,
            uptime_secs: 0,
            current_system_time: Utc::now().to_rfc3339(),
        }
    }
}

pub type SharedRefreshStats = Arc<RwLock<RefreshStats>>;
