//! Periodic refresh of rates and balances for the polling mode
//!
//! Each cycle fetches rates (outside the store lock), snapshots the balances
//! and compares both against the last observation. A summary is emitted only
//! when something changed. A failed cycle is logged and the loop carries on
//! until its cancellation token fires.

use crate::core::conversion::Report;
use crate::core::rates::fetch_with_timeout;
use crate::core::{Balances, CurrencyList, RateError, RateSnapshot, RateSource};
use crate::store::BalanceStore;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Receives a summary whenever rates or balances change.
pub trait SummarySink: Send + Sync {
    fn emit(&self, report: &Report, rates: &RateSnapshot);
}

/// Logs the plain summary and prints it as a table on stdout.
pub struct ConsoleSink;

impl SummarySink for ConsoleSink {
    fn emit(&self, report: &Report, rates: &RateSnapshot) {
        info!("Rates or balances changed\n{report}");
        println!("{}\n", report.display_as_table(rates.as_of()));
    }
}

#[derive(Debug, Default)]
struct LastObserved {
    rates: Option<RateSnapshot>,
    balances: Option<Balances>,
}

impl LastObserved {
    fn differs(&self, rates: &RateSnapshot, balances: &Balances) -> bool {
        match (&self.rates, &self.balances) {
            (Some(last_rates), Some(last_balances)) => {
                !last_rates.same_rates(rates) || last_balances != balances
            }
            _ => true,
        }
    }
}

pub struct RefreshLoop {
    source: Arc<dyn RateSource>,
    store: Arc<BalanceStore>,
    sink: Arc<dyn SummarySink>,
    currencies: CurrencyList,
    period: Duration,
    fetch_timeout: Duration,
    last: LastObserved,
}

impl RefreshLoop {
    pub fn new(
        source: Arc<dyn RateSource>,
        store: Arc<BalanceStore>,
        sink: Arc<dyn SummarySink>,
        period: Duration,
        fetch_timeout: Duration,
    ) -> Self {
        let currencies = store.currencies().clone();
        RefreshLoop {
            source,
            store,
            sink,
            currencies,
            period,
            fetch_timeout,
            last: LastObserved::default(),
        }
    }

    /// Runs a single cycle. Returns whether a summary was emitted.
    pub async fn run_once(&mut self) -> Result<bool, RateError> {
        let rates = fetch_with_timeout(self.source.as_ref(), self.fetch_timeout).await?;
        let balances = self.store.snapshot().await;

        if !self.last.differs(&rates, &balances) {
            debug!("No change since last refresh");
            return Ok(false);
        }

        let report = Report::build(&balances, &rates, &self.currencies);
        self.sink.emit(&report, &rates);
        self.last = LastObserved {
            rates: Some(rates),
            balances: Some(balances),
        };
        Ok(true)
    }

    /// Refreshes immediately, then once per period until `shutdown` is cancelled.
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!(period = ?self.period, "Refresh loop started");

        while !shutdown.is_cancelled() {
            if let Err(e) = self.run_once().await {
                error!(error = %e, "Failed to refresh rates");
            }

            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.period) => {}
            }
        }

        info!("Refresh loop stopped");
    }
}
