use crate::models::ServerConfig;
use crate::services::{connect_mirror, PriceStore, RefreshStats, Refresher, WikiClient};
use std::sync::Arc;
use tokio::sync::RwLock;

/// One-shot refresh: mapping, then prices, then a short report
pub async fn run(config: ServerConfig, top: usize) {
    println!("📥 Pulling from {}", config.upstream_url);

    let client = match WikiClient::new(&config.upstream_url, &config.user_agent, config.upstream_timeout) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("❌ Failed to create upstream client: {}", e);
            std::process::exit(1);
        }
    };

    let mirror = connect_mirror(&config.data_dir, config.mirror_project.as_deref()).await;
    let store = Arc::new(PriceStore::new());
    let stats = Arc::new(RwLock::new(RefreshStats::default()));
    let refresher = Refresher::new(client, store.clone(), stats, mirror);

    let report = refresher.warm_up().await;

    if !report.mapping.is_success() {
        eprintln!("⚠️  Mapping refresh failed, names will be missing");
    }
    if !report.prices.is_success() {
        eprintln!("❌ Price refresh failed");
        std::process::exit(1);
    }

    let mapping = store.mapping().await;
    let prices = store.prices().await;

    println!("✅ Mapping items: {}", mapping.len());
    println!("✅ Priced items:  {}", prices.data.len());
    if refresher.has_mirror() {
        println!("💾 Snapshot mirrored");
    }

    let mut by_volume: Vec<_> = prices.data.iter().collect();
    by_volume.sort_by(|a, b| b.1.high_price_volume.cmp(&a.1.high_price_volume).then(a.0.cmp(b.0)));

    println!("\n📈 Top {} by 5m volume:", top);
    println!("{:<8} {:<32} {:>12} {:>12} {:>10}", "id", "name", "high", "low", "vol5m");
    for (id, record) in by_volume.into_iter().take(top) {
        let name = mapping.get(id).and_then(|entry| entry.name()).unwrap_or("?");
        println!(
            "{:<8} {:<32} {:>12} {:>12} {:>10}",
            id, name, record.high, record.low, record.high_price_volume
        );
    }
}
