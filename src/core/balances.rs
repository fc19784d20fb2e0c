//! Point-in-time balance snapshots

use crate::core::currency::Currency;

/// An owned copy of every balance, in supported-currency order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Balances(Vec<(Currency, f64)>);

impl Balances {
    pub fn new(entries: Vec<(Currency, f64)>) -> Self {
        Balances(entries)
    }

    /// Amount held in `currency`, or 0.0 when there is no entry.
    pub fn get(&self, currency: &Currency) -> f64 {
        self.0
            .iter()
            .find(|(c, _)| c == currency)
            .map_or(0.0, |(_, amount)| *amount)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Currency, f64)> {
        self.0.iter().map(|(c, amount)| (c, *amount))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
