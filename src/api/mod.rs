//! HTTP server exposing the monitor to scrapers
//!
//! ## Endpoints
//!
//! - `GET /metrics` - All registered series in the Prometheus text format
//! - `GET /health` - Liveness plus the identity this monitor reports as
//!
//! Handlers only read from the registry, so scrapes never block the probe loop.

pub mod error;
pub mod routes;
pub mod state;
pub mod types;

pub use error::{ApiError, ApiResult};
pub use state::ScrapeState;
pub use types::HealthResponse;

use std::net::SocketAddr;

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::{StartupError, StartupResult};

/// Scrape server configuration
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Bind address (e.g., "0.0.0.0:9100")
    pub bind_addr: SocketAddr,
}

/// Build the router with every scrape route
pub fn router(state: ScrapeState) -> Router {
    Router::new()
        .route("/metrics", get(routes::metrics::scrape))
        .route("/health", get(routes::health::health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Bind the scrape listener. Failing here is a startup error.
pub async fn bind(config: &ScrapeConfig) -> StartupResult<TcpListener> {
    TcpListener::bind(config.bind_addr)
        .await
        .map_err(StartupError::Bind)
}

/// Serve scrapes on `listener` until the server fails.
pub async fn serve(listener: TcpListener, state: ScrapeState) -> anyhow::Result<()> {
    info!("serving metrics on {}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// Spawn the scrape server in a background task.
///
/// Returns the server's local address.
pub async fn spawn_scrape_server(
    config: ScrapeConfig,
    state: ScrapeState,
) -> anyhow::Result<SocketAddr> {
    let listener = bind(&config).await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(e) = serve(listener, state).await {
            tracing::error!("scrape server error: {e:#}");
        }
    });

    Ok(addr)
}
