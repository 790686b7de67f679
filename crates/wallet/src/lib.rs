//! Fourmiz Wallet - the account ledger
//!
//! The transaction table is the sole source of truth for an account's
//! financial position. Everything else here is derived:
//! - `Transaction`: immutable signed monetary event
//! - `TransactionStore`: the persistence seam (append-only + snapshot reads)
//! - `WalletBalance`: pure aggregation over a transaction snapshot
//! - `WalletLedger`: balance recomputation on demand
//! - `Earnings`: ledger-crediting events (referral bonuses, commissions,
//!   rewards), idempotent per source_ref
//! - `BalanceTracker`: last-known-good cache with a stale flag

pub mod balance;
pub mod earnings;
pub mod error;
pub mod ledger;
pub mod store;
pub mod tracker;
pub mod transaction;

pub use balance::WalletBalance;
pub use earnings::{Earnings, GrantOutcome};
pub use error::WalletError;
pub use ledger::WalletLedger;
pub use store::TransactionStore;
pub use tracker::{BalanceTracker, CachedBalance};
pub use transaction::{Transaction, TransactionKind, TransactionStatus};
