use crate::models::ServerConfig;
use crate::server::{self, AppState};
use crate::services::{connect_mirror, PriceStore, RefreshStats, Refresher, WikiClient};
use crate::worker;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

pub async fn run(config: ServerConfig) {
    println!("🚀 Starting price proxy on port {}", config.port);
    println!("🌐 Upstream: {} (User-Agent: {})", config.upstream_url, config.user_agent);

    let client = match WikiClient::new(&config.upstream_url, &config.user_agent, config.upstream_timeout) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("❌ Failed to create upstream client: {}", e);
            std::process::exit(1);
        }
    };

    // Optional durable mirror; a connection failure means memory-only for this process
    let mirror = connect_mirror(&config.data_dir, config.mirror_project.as_deref()).await;
    match (&config.mirror_project, &mirror) {
        (Some(project), Some(_)) => println!("💾 Mirroring prices to project '{}'", project),
        (Some(project), None) => println!("⚠️  Mirror '{}' unavailable, using in-memory cache only", project),
        (None, _) => println!("💾 No mirror project configured, using in-memory cache only"),
    }

    let store = Arc::new(PriceStore::new());
    let stats = Arc::new(RwLock::new(RefreshStats {
        mirror_enabled: mirror.is_some(),
        ..RefreshStats::default()
    }));
    let refresher = Arc::new(Refresher::new(client, store.clone(), stats.clone(), mirror));

    // Startup refresh runs in the background; the listener starts immediately
    println!("🔄 Loading mapping and prices in the background...");
    let warmup = worker::spawn_warmup(refresher.clone());
    tokio::spawn(async move {
        match warmup.await {
            Ok(report) => {
                println!(
                    "✅ Startup refresh finished: {} mapping items, {} priced items",
                    report.mapping.count(),
                    report.prices.count()
                );
            }
            Err(e) => tracing::error!(error = %e, "Startup refresh task panicked"),
        }
    });

    if config.worker_enabled() {
        println!("⚡ Spawning price worker (every {} seconds)...", config.refresh_interval.as_secs());
        let worker_refresher = refresher.clone();
        let worker_stats = stats.clone();
        let interval = config.refresh_interval;
        tokio::spawn(async move {
            worker::run_price_worker(worker_refresher, worker_stats, interval).await;
        });
    } else {
        println!("⏸️  Price worker disabled, refresh via POST /refresh");
    }

    println!("📁 Public directory: {}", config.public_dir.display());

    let app_state = AppState {
        store,
        refresher,
        stats,
        public_dir: config.public_dir.clone(),
        started_at: Instant::now(),
    };

    if let Err(e) = server::serve(app_state, config.port).await {
        eprintln!("❌ Server error: {}", e);
        std::process::exit(1);
    }
}
