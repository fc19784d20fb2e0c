use crate::core::{Balances, Currency, CurrencyList};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

/// Balances for a fixed list of currencies, guarded by one lock.
///
/// Reads of unsupported currencies return 0.0 and writes to them are ignored,
/// so none of the operations can fail.
pub struct BalanceStore {
    currencies: CurrencyList,
    balances: Mutex<HashMap<Currency, f64>>,
}

impl BalanceStore {
    pub fn new<I>(currencies: CurrencyList, initial_amounts: I) -> Self
    where
        I: IntoIterator<Item = (Currency, f64)>,
    {
        let mut balances: HashMap<Currency, f64> =
            currencies.iter().map(|c| (c.clone(), 0.0)).collect();
        for (currency, amount) in initial_amounts {
            if let Some(balance) = balances.get_mut(&currency) {
                *balance = amount;
            } else {
                debug!(%currency, "Ignoring initial amount for unsupported currency");
            }
        }

        Self {
            currencies,
            balances: Mutex::new(balances),
        }
    }

    pub fn currencies(&self) -> &CurrencyList {
        &self.currencies
    }

    pub async fn get(&self, currency: &Currency) -> f64 {
        let balances = self.balances.lock().await;
        balances.get(currency).copied().unwrap_or(0.0)
    }

    pub async fn set(&self, currency: &Currency, amount: f64) {
        let mut balances = self.balances.lock().await;
        match balances.get_mut(currency) {
            Some(balance) => {
                debug!(%currency, amount, "Balance SET");
                *balance = amount;
            }
            None => debug!(%currency, "Ignoring SET for unsupported currency"),
        }
    }

    /// Sets several balances in one critical section.
    pub async fn set_many<'a, I>(&self, amounts: I)
    where
        I: IntoIterator<Item = (&'a Currency, f64)>,
    {
        let mut balances = self.balances.lock().await;
        for (currency, amount) in amounts {
            if let Some(balance) = balances.get_mut(currency) {
                *balance = amount;
            }
        }
        debug!("Balance SET batch applied");
    }

    /// Adds every delta in one critical section. Deltas for unsupported
    /// currencies are skipped.
    pub async fn modify<'a, I>(&self, changes: I)
    where
        I: IntoIterator<Item = (&'a Currency, f64)>,
    {
        let mut balances = self.balances.lock().await;
        for (currency, delta) in changes {
            match balances.get_mut(currency) {
                Some(balance) => *balance += delta,
                None => debug!(%currency, "Ignoring delta for unsupported currency"),
            }
        }
        debug!("Balance MODIFY applied");
    }

    pub async fn snapshot(&self) -> Balances {
        let balances = self.balances.lock().await;
        Balances::new(
            self.currencies
                .iter()
                .map(|c| (c.clone(), balances.get(c).copied().unwrap_or(0.0)))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::join_all;
    use std::sync::Arc;

    fn cur(code: &str) -> Currency {
        code.parse().unwrap()
    }

    fn new_store(initial: &[(&str, f64)]) -> BalanceStore {
        let currencies = CurrencyList::parse(["rub", "usd", "eur"]).unwrap();
        BalanceStore::new(currencies, initial.iter().map(|(c, a)| (cur(c), *a)))
    }

    #[tokio::test]
    async fn test_new_seeds_every_currency() {
        let store = new_store(&[("usd", 10.0), ("gbp", 7.0)]);
        let snapshot = store.snapshot().await;

        let entries: Vec<(String, f64)> = snapshot
            .iter()
            .map(|(c, a)| (c.to_string(), a))
            .collect();
        assert_eq!(
            entries,
            vec![
                ("rub".to_string(), 0.0),
                ("usd".to_string(), 10.0),
                ("eur".to_string(), 0.0)
            ]
        );
    }

    #[tokio::test]
    async fn test_get_unsupported_is_zero() {
        let store = new_store(&[("usd", 10.0)]);
        assert_eq!(store.get(&cur("usd")).await, 10.0);
        assert_eq!(store.get(&cur("gbp")).await, 0.0);
    }

    #[tokio::test]
    async fn test_set_unsupported_leaves_store_unchanged() {
        let store = new_store(&[("rub", 100.0), ("usd", 10.0)]);
        let before = store.snapshot().await;

        store.set(&cur("xyz"), 5.0).await;

        assert_eq!(store.snapshot().await, before);
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let store = new_store(&[("usd", 10.0)]);
        store.set(&cur("usd"), 3.5).await;
        assert_eq!(store.get(&cur("usd")).await, 3.5);
    }

    #[tokio::test]
    async fn test_modify_ignores_unsupported() {
        let store = new_store(&[("usd", 10.0)]);
        let usd = cur("usd");
        let gbp = cur("gbp");

        store.modify([(&usd, 5.0), (&gbp, 1.0)]).await;

        assert_eq!(store.get(&usd).await, 15.0);
        assert_eq!(store.snapshot().await.len(), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_modify_never_loses_a_delta() {
        let store = Arc::new(new_store(&[("rub", 100.0)]));
        let rub = cur("rub");
        let usd = cur("usd");

        let tasks = (0..200).map(|i| {
            let store = Arc::clone(&store);
            let rub = rub.clone();
            let usd = usd.clone();
            tokio::spawn(async move {
                let delta = if i % 2 == 0 { 1.0 } else { -0.5 };
                store.modify([(&rub, delta), (&usd, 2.0)]).await;
            })
        });
        for result in join_all(tasks).await {
            result.unwrap();
        }

        assert_eq!(store.get(&rub).await, 100.0 + 100.0 * 1.0 - 100.0 * 0.5);
        assert_eq!(store.get(&usd).await, 400.0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_snapshot_never_sees_partial_modify() {
        // Every modify moves the same amount out of rub and into usd, so any
        // consistent snapshot keeps the sum constant.
        let store = Arc::new(new_store(&[("rub", 1000.0)]));
        let rub = cur("rub");
        let usd = cur("usd");

        let writer = {
            let store = Arc::clone(&store);
            let (rub, usd) = (rub.clone(), usd.clone());
            tokio::spawn(async move {
                for _ in 0..500 {
                    store.modify([(&rub, -1.0), (&usd, 1.0)]).await;
                    tokio::task::yield_now().await;
                }
            })
        };
        let reader = {
            let store = Arc::clone(&store);
            let (rub, usd) = (rub.clone(), usd.clone());
            tokio::spawn(async move {
                for _ in 0..500 {
                    let snapshot = store.snapshot().await;
                    assert_eq!(snapshot.get(&rub) + snapshot.get(&usd), 1000.0);
                    tokio::task::yield_now().await;
                }
            })
        };

        writer.await.unwrap();
        reader.await.unwrap();
        assert_eq!(store.get(&rub).await, 500.0);
        assert_eq!(store.get(&usd).await, 500.0);
    }
}
