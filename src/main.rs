//! DocBridge runner.
//!
//! Loads configuration once, then serves the REST API until interrupted.

use std::sync::Arc;

use api_rest::{router, AppState};
use docbridge_core::{
    constants::{DEFAULT_REST_ADDR, ENV_REST_ADDR},
    ServiceConfig,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the DocBridge application
///
/// # Environment Variables
/// - `DOCBRIDGE_REST_ADDR`: REST server address (default: "0.0.0.0:8000")
/// - `GRAPH_TENANT_ID`, `GRAPH_CLIENT_ID`, `GRAPH_CLIENT_SECRET`: app registration
/// - `GRAPH_SITE_ID`, `GRAPH_LIST_ID`, `GRAPH_DRIVE_ID`: the managed document library
/// - `GRAPH_TEMPLATE_FOLDER_ID`: folder copied by `POST /folders/copy` (optional)
///
/// # Returns
/// * `Ok(())` - If the server starts and shuts down cleanly
/// * `Err(anyhow::Error)` - If configuration, binding or serving fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("docbridge_run=info".parse()?)
                .add_directive("docbridge_core=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("graph_client=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = Arc::new(ServiceConfig::from_env_values(|key| std::env::var(key).ok())?);
    let rest_addr = std::env::var(ENV_REST_ADDR).unwrap_or_else(|_| DEFAULT_REST_ADDR.into());

    tracing::info!("++ Starting DocBridge REST on {}", rest_addr);
    tracing::debug!(config = ?cfg, "resolved configuration");

    let app = router(AppState::new(cfg));
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("-- DocBridge stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Shutdown signal error: {:?}", e);
    }
}
