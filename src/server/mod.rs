pub mod api;

use crate::services::{SharedPriceStore, SharedRefreshStats, SharedRefresher};
use axum::{
    extract::FromRef,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: SharedPriceStore,
    pub refresher: SharedRefresher,
    pub stats: SharedRefreshStats,
    pub public_dir: PathBuf,
    pub started_at: Instant,
}

// FromRef implementations to extract specific state components
impl FromRef<AppState> for SharedPriceStore {
    fn from_ref(app_state: &AppState) -> SharedPriceStore {
        app_state.store.clone()
    }
}

impl FromRef<AppState> for SharedRefreshStats {
    fn from_ref(app_state: &AppState) -> SharedRefreshStats {
        app_state.stats.clone()
    }
}

/// Build the router: API routes, static bundle, permissive CORS
pub fn router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new()
        .route("/", get(api::index_handler))
        .route("/mapping", get(api::get_mapping_handler))
        .route("/prices/latest", get(api::get_prices_handler))
        .route("/refresh", post(api::refresh_handler))
        .route("/health", get(api::health_handler));

    let public_dir = app_state.public_dir.clone();
    if public_dir.exists() {
        for asset_dir in ["css", "js", "assets"] {
            app = app.nest_service(&format!("/{}", asset_dir), ServeDir::new(public_dir.join(asset_dir)));
        }
    } else {
        tracing::warn!("Public directory {} not found, static files disabled", public_dir.display());
    }

    app.layer(cors).with_state(app_state)
}

/// Start the axum server
pub async fn serve(app_state: AppState, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Starting price proxy server");
    log_routes(&app_state.public_dir);

    let app = router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn log_routes(public_dir: &Path) {
    tracing::info!("Registering routes:");
    tracing::info!("  GET /");
    tracing::info!("  GET /mapping");
    tracing::info!("  GET /prices/latest");
    tracing::info!("  POST /refresh");
    tracing::info!("  GET /health");
    tracing::info!("  GET /css/* /js/* /assets/* (static files from {})", public_dir.display());
}
