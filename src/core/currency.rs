//! Currency codes and the ordered list of supported currencies

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CurrencyError {
    #[error("Currency code must not be empty")]
    Empty,
    #[error("Currency not supported: {0}")]
    Unsupported(String),
}

/// A normalized, lower-case currency code such as `usd`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_upper(&self) -> String {
        self.0.to_uppercase()
    }
}

impl FromStr for Currency {
    type Err = CurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_lowercase();
        if code.is_empty() {
            return Err(CurrencyError::Empty);
        }
        Ok(Currency(code))
    }
}

impl TryFrom<String> for Currency {
    type Error = CurrencyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> String {
        currency.0
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered, duplicate-free list of the currencies a process works with.
///
/// The order is significant: reports and pairwise rates follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyList(Vec<Currency>);

impl CurrencyList {
    pub fn new<I>(currencies: I) -> Self
    where
        I: IntoIterator<Item = Currency>,
    {
        let mut list: Vec<Currency> = Vec::new();
        for currency in currencies {
            if !list.contains(&currency) {
                list.push(currency);
            }
        }
        CurrencyList(list)
    }

    /// Parses a list of codes, keeping declaration order.
    pub fn parse<'a, I>(codes: I) -> Result<Self, CurrencyError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let currencies = codes
            .into_iter()
            .map(Currency::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(currencies))
    }

    pub fn contains(&self, currency: &Currency) -> bool {
        self.0.contains(currency)
    }

    /// Normalizes `code` and returns it if it is in the list.
    pub fn resolve(&self, code: &str) -> Result<Currency, CurrencyError> {
        let currency = Currency::from_str(code)?;
        if self.contains(&currency) {
            Ok(currency)
        } else {
            Err(CurrencyError::Unsupported(currency.0))
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Currency> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Currency] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a CurrencyList {
    type Item = &'a Currency;
    type IntoIter = std::slice::Iter<'a, Currency>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
