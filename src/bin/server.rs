//! RomanAI helper HTTP server binary.
//!
//! Loads the lab configuration, builds every helper and serves them over
//! HTTP.
//!
//! # Environment Variables
//!
//! - `ROMANAI_CONFIG`: Config file (default: `~/.romanai_lab_state/config.json`)
//! - `ROMANAI_MEMORY_DIR`: Engine memory directory (default: `~/.romanai_spacetime`)
//! - `PORT`: HTTP port, overrides `server.port` (default: 8888)
//! - `RUST_LOG`: Tracing filter (default: "info,romanai_lab=debug")
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin server
//! ```

use std::sync::Arc;

use anyhow::Context;
use romanai_lab::config::LabConfig;
use romanai_lab::helpers::HelperRouter;
use romanai_lab::server::{app_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,romanai_lab=debug".into()),
        )
        .init();

    let config_path = LabConfig::default_path();
    let mut config = LabConfig::load(&config_path);
    if let Ok(port) = std::env::var("PORT") {
        config.server.port = port
            .parse::<u16>()
            .with_context(|| format!("PORT is not a valid port: {port}"))?;
    }
    let bind_addr = config.server.bind_addr();
    let memory_dir = config.memory_dir();

    tracing::info!("config: {}", config_path.display());
    tracing::info!("memory: {}", memory_dir.display());

    let router = tokio::task::spawn_blocking(move || HelperRouter::from_config(&config, &memory_dir))
        .await
        .context("loading helpers")?;
    let app = app_router(AppState::new(Arc::new(router)));

    tracing::info!("RomanAI helper server starting on {}", bind_addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /ping         : liveness check");
    tracing::info!("  POST /scriptor /master /micro /patcher /multimodel /rewrite");
    tracing::info!("  GET  /memory/recall, POST /memory/store");

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    axum::serve(listener, app).await.context("server failed")?;
    Ok(())
}
