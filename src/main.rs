use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use bedboard::backend::HttpBackend;
use bedboard::engine::Engine;
use bedboard::notify::NotifyHub;
use bedboard::refresher;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let metrics_port: Option<u16> = std::env::var("BEDBOARD_METRICS_PORT")
        .ok()
        .and_then(|s| s.parse().ok());
    bedboard::observability::init(metrics_port);

    let api_url =
        std::env::var("BEDBOARD_API_URL").unwrap_or_else(|_| "http://localhost:8000".into());
    let refresh_secs: u64 = std::env::var("BEDBOARD_REFRESH_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(30);
    let http_timeout_secs: u64 = std::env::var("BEDBOARD_HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(10);

    let backend = Arc::new(HttpBackend::new(
        &api_url,
        Duration::from_secs(http_timeout_secs),
    )?);
    let engine = Arc::new(Engine::new(backend, Arc::new(NotifyHub::new())));

    info!("bedboard monitoring {api_url}");
    info!("  refresh period: {refresh_secs}s");
    info!(
        "  metrics: {}",
        metrics_port.map_or("disabled".to_string(), |p| format!(
            "http://0.0.0.0:{p}/metrics"
        ))
    );

    // First snapshot before the periodic loop takes over; a cold backend is
    // not fatal, the refresher keeps retrying.
    refresher::refresh_once(&engine).await;

    let refresher_engine = engine.clone();
    let refresher = tokio::spawn(async move {
        refresher::run_refresher(refresher_engine, Duration::from_secs(refresh_secs)).await;
    });

    // Run until SIGTERM/ctrl-c.
    let shutdown = async {
        let ctrl_c = tokio::signal::ctrl_c();
        #[cfg(unix)]
        {
            let mut sigterm =
                tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                    .expect("failed to register SIGTERM handler");
            tokio::select! {
                _ = ctrl_c => {}
                _ = sigterm.recv() => {}
            }
        }
        #[cfg(not(unix))]
        {
            ctrl_c.await.ok();
        }
    };
    shutdown.await;

    info!("shutdown signal received");
    refresher.abort();

    let stats = engine.stats().await;
    info!(
        "bedboard stopped: last snapshot {} total, {} occupied, {} available",
        stats.total, stats.occupied, stats.available
    );
    Ok(())
}
