//! Cross-rate and total calculations over balances and a rate snapshot
//!
//! Every function here is pure. Division by a zero or missing rate yields a
//! `0.0` sentinel so that a report can always be produced.

use crate::core::balances::Balances;
use crate::core::currency::{Currency, CurrencyList};
use crate::core::rates::RateSnapshot;
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq)]
pub struct PairRate {
    pub from: Currency,
    pub to: Currency,
    pub rate: f64,
}

/// Price of one unit of `from` expressed in `to`.
pub fn cross_rate(rates: &RateSnapshot, from: &Currency, to: &Currency) -> f64 {
    match (rates.get(from), rates.get(to)) {
        (Some(numerator), Some(denominator)) if denominator != 0.0 && denominator.is_finite() => {
            numerator / denominator
        }
        _ => 0.0,
    }
}

/// Cross rate for every unordered pair `(i, j)` with `i < j` in list order.
pub fn pairwise_rates(rates: &RateSnapshot, currencies: &CurrencyList) -> Vec<PairRate> {
    let list = currencies.as_slice();
    list.iter()
        .enumerate()
        .flat_map(|(i, from)| {
            list[i + 1..].iter().map(move |to| PairRate {
                from: from.clone(),
                to: to.clone(),
                rate: cross_rate(rates, from, to),
            })
        })
        .collect()
}

/// Value of all balances expressed in each currency of the list.
pub fn totals(
    balances: &Balances,
    rates: &RateSnapshot,
    currencies: &CurrencyList,
) -> Vec<(Currency, f64)> {
    currencies
        .iter()
        .map(|target| {
            let total: f64 = currencies
                .iter()
                .map(|c| balances.get(c) * cross_rate(rates, c, target))
                .sum();
            (target.clone(), total)
        })
        .collect()
}

/// Everything the balance report shows, computed once.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub balances: Vec<(Currency, f64)>,
    pub pairs: Vec<PairRate>,
    pub totals: Vec<(Currency, f64)>,
}

impl Report {
    pub fn build(balances: &Balances, rates: &RateSnapshot, currencies: &CurrencyList) -> Self {
        Report {
            balances: currencies
                .iter()
                .map(|c| (c.clone(), balances.get(c)))
                .collect(),
            pairs: pairwise_rates(rates, currencies),
            totals: totals(balances, rates, currencies),
        }
    }

    pub fn total_in(&self, currency: &Currency) -> Option<f64> {
        self.totals
            .iter()
            .find(|(c, _)| c == currency)
            .map(|(_, total)| *total)
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (currency, amount) in &self.balances {
            writeln!(f, "{currency}: {amount}")?;
        }
        for pair in &self.pairs {
            writeln!(f, "{}-{}: {:.2}", pair.from, pair.to, pair.rate)?;
        }
        let sums: Vec<String> = self
            .totals
            .iter()
            .map(|(currency, total)| format!("{total:.2} {currency}"))
            .collect();
        write!(f, "\nsum: {}", sums.join(" / "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn cur(code: &str) -> Currency {
        code.parse().unwrap()
    }

    fn currencies() -> CurrencyList {
        CurrencyList::parse(["rub", "usd", "eur"]).unwrap()
    }

    fn snapshot(pairs: &[(&str, f64)]) -> RateSnapshot {
        let rates: HashMap<Currency, f64> = pairs.iter().map(|(c, r)| (cur(c), *r)).collect();
        RateSnapshot::new(rates, &currencies()).unwrap()
    }

    fn balances(pairs: &[(&str, f64)]) -> Balances {
        Balances::new(pairs.iter().map(|(c, a)| (cur(c), *a)).collect())
    }

    #[test]
    fn test_pairwise_rates_follow_list_order() {
        let rates = snapshot(&[("rub", 1.0), ("usd", 90.0), ("eur", 100.0)]);
        let pairs = pairwise_rates(&rates, &currencies());

        let labels: Vec<String> = pairs.iter().map(|p| format!("{}-{}", p.from, p.to)).collect();
        assert_eq!(labels, vec!["rub-usd", "rub-eur", "usd-eur"]);
        assert!((pairs[0].rate - 1.0 / 90.0).abs() < 1e-12);
        assert!((pairs[2].rate - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_zero_rate_yields_sentinel_instead_of_panicking() {
        // Reports must render even when the provider hands out a zero rate.
        let rates = snapshot(&[("rub", 1.0), ("usd", 0.0), ("eur", 100.0)]);
        assert_eq!(cross_rate(&rates, &cur("rub"), &cur("usd")), 0.0);
        assert_eq!(cross_rate(&rates, &cur("usd"), &cur("rub")), 0.0);
        assert_eq!(cross_rate(&rates, &cur("rub"), &cur("gbp")), 0.0);

        let result = totals(&balances(&[("rub", 5.0), ("usd", 1.0)]), &rates, &currencies());
        assert_eq!(result[1], (cur("usd"), 0.0));
    }

    #[test]
    fn test_totals_scenario() {
        let rates = snapshot(&[("rub", 1.0), ("usd", 90.0), ("eur", 100.0)]);
        let held = balances(&[("rub", 100.0), ("usd", 10.0), ("eur", 0.0)]);
        let report = Report::build(&held, &rates, &currencies());

        assert!((report.total_in(&cur("rub")).unwrap() - 1000.0).abs() < 1e-9);
        assert!((report.total_in(&cur("usd")).unwrap() - 1000.0 / 90.0).abs() < 1e-9);
        assert!((report.total_in(&cur("eur")).unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_totals_consistent_across_targets() {
        let rates = snapshot(&[("rub", 1.0), ("usd", 91.37), ("eur", 99.12)]);
        let held = balances(&[("rub", 1234.5), ("usd", 17.25), ("eur", 3.0)]);
        let list = currencies();
        let all = totals(&held, &rates, &list);

        for (a, total_a) in &all {
            for (b, total_b) in &all {
                let converted = total_a * cross_rate(&rates, a, b);
                assert!(
                    (converted - total_b).abs() < 1e-9 * total_b.abs().max(1.0),
                    "{a}->{b}: {converted} != {total_b}"
                );
            }
        }
    }

    #[test]
    fn test_report_text() {
        let rates = snapshot(&[("rub", 1.0), ("usd", 90.0), ("eur", 100.0)]);
        let held = balances(&[("rub", 100.0), ("usd", 10.0), ("eur", 0.0)]);
        let report = Report::build(&held, &rates, &currencies());

        let expected = "rub: 100\nusd: 10\neur: 0\n\
                        rub-usd: 0.01\nrub-eur: 0.01\nusd-eur: 0.90\n\
                        \nsum: 1000.00 rub / 11.11 usd / 10.00 eur";
        assert_eq!(report.to_string(), expected);
    }
}
