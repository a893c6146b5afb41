//! EduBrain client - headless resilience runtime
//!
//! Loads configuration, starts health monitoring, log shipping and credential
//! refresh, then runs until interrupted.

use anyhow::{Context, Result};
use edubrain_app::utils::logging::{init_tracing, LogFormat};
use edubrain_app::ClientContext;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before reading any EDUBRAIN_* variable
    let dotenv = dotenvy::dotenv();

    init_tracing(LogFormat::from_env())?;

    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(err) => info!(error = %err, "no .env file loaded"),
    }

    let ctx = ClientContext::new().context("failed to build client context")?;
    ctx.start().context("failed to start client context")?;

    let status = ctx.health.refresh().await;
    info!(
        healthy = status.is_healthy,
        latency_ms = ?status.latency_ms,
        quality = %ctx.health.connection_quality(),
        "initial health check"
    );

    tokio::signal::ctrl_c().await.context("failed to listen for ctrl-c")?;
    info!("interrupt received, shutting down");

    if let Err(err) = ctx.shutdown().await {
        warn!(error = %err, "shutdown finished with errors");
    }

    Ok(())
}
