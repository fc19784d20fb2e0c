pub mod cli;
pub mod core;
pub mod providers;
pub mod server;
pub mod store;

use crate::cli::{ConsoleSink, RefreshLoop};
use crate::core::RateSource;
use crate::core::config::{AppConfig, AppMode};
use crate::providers::CbrRateSource;
use crate::server::AppState;
use crate::store::BalanceStore;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Wires the rate source and balance store, then runs the selected mode
/// until `shutdown` is cancelled.
pub async fn run(config: AppConfig, shutdown: CancellationToken) -> Result<()> {
    info!("Currency service starting...");
    debug!("Loaded config: {config:#?}");

    let source: Arc<dyn RateSource> = Arc::new(CbrRateSource::new(
        &config.rates_base_url,
        config.fetch_timeout,
    ));
    let store = Arc::new(BalanceStore::new(
        source.currencies(),
        config.initial_amounts.iter().cloned(),
    ));

    match config.mode {
        AppMode::Server => {
            let addr = config.bind_address();
            let listener = TcpListener::bind(&addr)
                .await
                .with_context(|| format!("Failed to bind {addr}"))?;
            let state = AppState {
                store,
                rates: source,
                fetch_timeout: config.fetch_timeout,
            };
            server::serve(listener, state, shutdown).await
        }
        AppMode::Poll => {
            RefreshLoop::new(
                source,
                store,
                Arc::new(ConsoleSink),
                config.period(),
                config.fetch_timeout,
            )
            .run(shutdown)
            .await;
            Ok(())
        }
    }
}
