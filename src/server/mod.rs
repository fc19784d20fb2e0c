//! HTTP API over the balance store.

pub mod error;
pub mod routes;

use anyhow::{Context, Result};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::core::RateSource;
use crate::store::BalanceStore;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<BalanceStore>,
    pub rates: Arc<dyn RateSource>,
    /// Upper bound for a rate fetch made while serving a request.
    pub fetch_timeout: Duration,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the API on `listener` until `shutdown` is cancelled.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: CancellationToken,
) -> Result<()> {
    let app = create_router(state);
    info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("HTTP server failed")?;

    info!("Server stopped");
    Ok(())
}
