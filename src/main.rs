use anyhow::Context;
use reconbridge::artifact::TranscriptStore;
use reconbridge::gateway::{router, AppState, GatewayConfig};
use reconbridge::ScanOrchestrator;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Reads .env before the filter so RUST_LOG can live there too
    let config = GatewayConfig::from_env().context("loading gateway configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reconbridge=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let orchestrator = ScanOrchestrator::builder()
        .with_transcripts(TranscriptStore::new(&config.artifact_dir))
        .with_config(config.orchestrator.clone())
        .build()
        .context("building scan orchestrator")?;
    let orchestrator = Arc::new(orchestrator);

    let health = orchestrator.health_report().await;
    for tool in health.missing() {
        warn!(tool = %tool, "Warning: {} is not installed", tool);
    }

    let app = router(AppState::new(Arc::clone(&orchestrator)), &config.allowed_origins)
        .context("building router")?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    info!(
        addr = %config.bind_addr,
        artifact_dir = %config.artifact_dir.display(),
        origins = ?config.allowed_origins,
        "Server starting"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!(in_flight = orchestrator.active_scans(), "Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
