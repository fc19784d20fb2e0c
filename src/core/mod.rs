//! Core business logic abstractions

pub mod balances;
pub mod config;
pub mod conversion;
pub mod currency;
pub mod log;
pub mod rates;

// Re-export main types for cleaner imports
pub use balances::Balances;
pub use currency::{Currency, CurrencyError, CurrencyList};
pub use rates::{RateError, RateSnapshot, RateSource};
