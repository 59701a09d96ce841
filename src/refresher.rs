use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::engine::Engine;

/// One refresh pass. A failed fetch leaves the previous snapshot in place.
pub async fn refresh_once(engine: &Engine) {
    match engine.refresh().await {
        Ok(stats) => info!(
            "bed inventory refreshed: {} total, {} occupied, {} available",
            stats.total, stats.occupied, stats.available
        ),
        Err(e) => warn!("bed refresh failed: {e}"),
    }
}

/// Background task that keeps the bed cache fresh. Transient backend
/// outages are logged and retried on the next tick.
pub async fn run_refresher(engine: Arc<Engine>, period: Duration) {
    let mut interval = tokio::time::interval(period);
    loop {
        interval.tick().await;
        refresh_once(&engine).await;
    }
}
