pub mod balance;

pub use balance::BalanceStore;
