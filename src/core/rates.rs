//! Exchange rate abstractions

use crate::core::currency::{Currency, CurrencyList};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RateError {
    #[error("Rate source unavailable: {0}")]
    SourceUnavailable(String),
    #[error("Malformed rate response: {0}")]
    MalformedResponse(String),
    #[error("Rate source timed out after {0:?}")]
    Timeout(Duration),
}

/// Rates for a set of currencies, each expressed in a common base unit.
///
/// Every currency the snapshot was validated against is guaranteed to have a
/// finite rate.
#[derive(Debug, Clone, PartialEq)]
pub struct RateSnapshot {
    rates: HashMap<Currency, f64>,
    as_of: Option<DateTime<FixedOffset>>,
}

impl RateSnapshot {
    pub fn new(
        rates: HashMap<Currency, f64>,
        required: &CurrencyList,
    ) -> Result<Self, RateError> {
        for currency in required {
            match rates.get(currency) {
                Some(rate) if rate.is_finite() => {}
                Some(rate) => {
                    return Err(RateError::MalformedResponse(format!(
                        "rate for {currency} is not a finite number: {rate}"
                    )));
                }
                None => {
                    return Err(RateError::MalformedResponse(format!(
                        "missing rate for {currency}"
                    )));
                }
            }
        }
        Ok(RateSnapshot { rates, as_of: None })
    }

    pub fn with_as_of(mut self, as_of: Option<DateTime<FixedOffset>>) -> Self {
        self.as_of = as_of;
        self
    }

    pub fn get(&self, currency: &Currency) -> Option<f64> {
        self.rates.get(currency).copied()
    }

    pub fn rates(&self) -> &HashMap<Currency, f64> {
        &self.rates
    }

    /// Provider timestamp for the rates, when it reported one.
    pub fn as_of(&self) -> Option<DateTime<FixedOffset>> {
        self.as_of
    }

    /// True when both snapshots carry the same rate values, ignoring `as_of`.
    pub fn same_rates(&self, other: &RateSnapshot) -> bool {
        self.rates == other.rates
    }
}

/// Produces current exchange rates. Implementations do not retry.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Currencies this source prices, in display order. The first one is the base.
    fn currencies(&self) -> CurrencyList;

    async fn fetch(&self) -> Result<RateSnapshot, RateError>;
}

/// Runs `source.fetch()` bounded by `limit`.
pub async fn fetch_with_timeout(
    source: &dyn RateSource,
    limit: Duration,
) -> Result<RateSnapshot, RateError> {
    match tokio::time::timeout(limit, source.fetch()).await {
        Ok(result) => result,
        Err(_) => Err(RateError::Timeout(limit)),
    }
}
