use crate::constants::CACHE_STATUS_HEADER;
use crate::models::{MappingEntry, PricesResponse};
use crate::server::AppState;
use crate::services::{Readiness, RefreshOutcome, RefreshStats, SharedPriceStore, SharedRefreshStats};
use axum::{
    extract::State,
    http::{HeaderName, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

fn cache_status(readiness: Readiness) -> [(HeaderName, &'static str); 1] {
    [(HeaderName::from_static(CACHE_STATUS_HEADER), readiness.as_str())]
}

/// GET / - frontend entry point, or a plain status when no bundle is deployed
#[instrument(skip(app_state))]
pub async fn index_handler(State(app_state): State<AppState>) -> Response {
    let index_path = app_state.public_dir.join("index.html");

    match tokio::fs::read_to_string(&index_path).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            debug!(path = %index_path.display(), error = %e, "Frontend index not available");
            Json(serde_json::json!({
                "status": "Price proxy API is running (Frontend not found)"
            }))
            .into_response()
        }
    }
}

/// GET /mapping - every cached item metadata entry, possibly empty
#[instrument(skip(store))]
pub async fn get_mapping_handler(State(store): State<SharedPriceStore>) -> Response {
    let mapping = store.mapping().await;
    let readiness = store.mapping_readiness().await;
    debug!(items = mapping.len(), readiness = readiness.as_str(), "Serving mapping");

    let entries: Vec<&MappingEntry> = mapping.values().collect();
    (cache_status(readiness), Json(entries)).into_response()
}

/// GET /prices/latest - `{"data": {itemId: record}}`, possibly empty
#[instrument(skip(store))]
pub async fn get_prices_handler(State(store): State<SharedPriceStore>) -> Response {
    let snapshot = store.prices().await;
    let readiness = store.price_readiness().await;
    debug!(items = snapshot.data.len(), readiness = readiness.as_str(), "Serving prices");

    (cache_status(readiness), Json(PricesResponse::borrowed(&snapshot.data))).into_response()
}

/// Body of POST /refresh
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub status: &'static str,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<RefreshOutcome> for RefreshResponse {
    fn from(outcome: RefreshOutcome) -> Self {
        match outcome {
            RefreshOutcome::Updated { count } => Self { status: "refreshed", count, error: None },
            RefreshOutcome::Failed { count, error } => Self { status: "failed", count, error: Some(error) },
        }
    }
}

/// POST /refresh - run a price refresh now and report the cached item count.
///
/// Always 200: a failed refresh reports `"status": "failed"` with the
/// unchanged count of the snapshot still being served.
#[instrument(skip(app_state))]
pub async fn refresh_handler(State(app_state): State<AppState>) -> impl IntoResponse {
    info!("Manual refresh requested");

    let outcome = app_state.refresher.refresh_prices().await;
    if !outcome.is_success() {
        warn!(count = outcome.count(), "Manual refresh failed, serving previous snapshot");
    }

    (StatusCode::OK, Json(RefreshResponse::from(outcome)))
}

#[derive(Debug, Serialize)]
pub struct CacheHealth {
    pub readiness: Readiness,
    pub items: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub mapping: CacheHealth,
    pub prices: CacheHealth,
    pub stats: RefreshStats,
}

/// GET /health - cache readiness, sizes and refresh statistics
#[instrument(skip(app_state, stats))]
pub async fn health_handler(
    State(app_state): State<AppState>,
    State(stats): State<SharedRefreshStats>,
) -> Json<HealthResponse> {
    let store = &app_state.store;

    let mut stats = stats.read().await.clone();
    stats.uptime_secs = app_state.started_at.elapsed().as_secs();
    stats.current_system_time = Utc::now().to_rfc3339();

    let last_updated = store.last_updated().await;

    Json(HealthResponse {
        mapping: CacheHealth {
            readiness: store.mapping_readiness().await,
            items: store.mapping_count().await,
            last_updated: None,
        },
        prices: CacheHealth {
            readiness: store.price_readiness().await,
            items: store.price_count().await,
            last_updated: (last_updated > 0).then_some(last_updated),
        },
        stats,
    })
}
