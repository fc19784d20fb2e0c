use crate::core::{Currency, CurrencyList, RateError, RateSnapshot, RateSource};
use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Base currency of the feed. Every other rate is rub per unit.
const BASE_CURRENCY: &str = "rub";
const QUOTED_CURRENCIES: [&str; 2] = ["usd", "eur"];

/// Daily rates published by the Central Bank of Russia.
pub struct CbrRateSource {
    base_url: String,
    timeout: Duration,
}

impl CbrRateSource {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        CbrRateSource {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    fn url(&self) -> String {
        format!("{}/daily_json.js", self.base_url)
    }
}

#[derive(Debug, Deserialize)]
struct CbrDailyResponse {
    #[serde(rename = "Date")]
    date: Option<String>,
    #[serde(rename = "Valute", default)]
    valute: HashMap<String, CbrValute>,
}

#[derive(Debug, Deserialize)]
struct CbrValute {
    #[serde(rename = "Nominal")]
    nominal: Option<f64>,
    #[serde(rename = "Value")]
    value: Option<f64>,
}

impl CbrValute {
    fn rate_per_unit(&self) -> Option<f64> {
        let value = self.value?;
        match self.nominal {
            Some(nominal) if nominal > 0.0 => Some(value / nominal),
            _ => Some(value),
        }
    }
}

#[async_trait]
impl RateSource for CbrRateSource {
    fn currencies(&self) -> CurrencyList {
        CurrencyList::new(
            std::iter::once(BASE_CURRENCY)
                .chain(QUOTED_CURRENCIES)
                .filter_map(|code| code.parse::<Currency>().ok()),
        )
    }

    #[instrument(name = "CbrRateFetch", skip(self), fields(url = %self.url()))]
    async fn fetch(&self) -> Result<RateSnapshot, RateError> {
        let url = self.url();
        debug!("Requesting daily rates from {}", url);

        let client = reqwest::Client::builder()
            .user_agent("currency-service/0.1")
            .timeout(self.timeout)
            .build()
            .map_err(|e| RateError::SourceUnavailable(format!("Failed to build client: {e}")))?;

        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| RateError::SourceUnavailable(format!("Request error: {e} URL: {url}")))?;

        if !response.status().is_success() {
            return Err(RateError::SourceUnavailable(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| RateError::SourceUnavailable(format!("Failed to read body: {e}")))?;

        let data: CbrDailyResponse = serde_json::from_str(&text).map_err(|e| {
            RateError::MalformedResponse(format!("Failed to parse JSON response: {e}"))
        })?;

        let mut rates = HashMap::new();
        if let Ok(base) = BASE_CURRENCY.parse::<Currency>() {
            rates.insert(base, 1.0);
        }
        for code in QUOTED_CURRENCIES {
            let rate = data
                .valute
                .get(&code.to_uppercase())
                .and_then(CbrValute::rate_per_unit);
            if let (Ok(currency), Some(rate)) = (code.parse::<Currency>(), rate) {
                rates.insert(currency, rate);
            }
        }

        let as_of = data
            .date
            .as_deref()
            .and_then(|date| match DateTime::parse_from_rfc3339(date) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    warn!(date, error = %e, "Ignoring unparseable rate date");
                    None
                }
            });

        let snapshot = RateSnapshot::new(rates, &self.currencies())?.with_as_of(as_of);
        debug!(rates = ?snapshot.rates(), "Received CBR rates");
        Ok(snapshot)
    }
}
