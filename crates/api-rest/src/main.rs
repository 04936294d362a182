//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own.
//!
//! ## Intended use
//! Useful for development when only the REST server (with OpenAPI/Swagger UI) is wanted. The
//! workspace's `docbridge-run` binary serves the same router.

use api_rest::{router, AppState};
use docbridge_core::{constants::DEFAULT_REST_ADDR, constants::ENV_REST_ADDR, ServiceConfig};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the DocBridge REST API server
///
/// # Environment Variables
/// - `DOCBRIDGE_REST_ADDR`: Server address (default: "0.0.0.0:8000")
/// - `GRAPH_*`: content service credentials and location, see `ServiceConfig::from_env_values`
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration is incomplete,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var(ENV_REST_ADDR).unwrap_or_else(|_| DEFAULT_REST_ADDR.into());
    let cfg = Arc::new(ServiceConfig::from_env_values(|key| std::env::var(key).ok())?);

    tracing::info!("-- Starting DocBridge REST API on {}", addr);

    let app = router(AppState::new(cfg));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
