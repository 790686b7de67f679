//! Fourmiz Store - SQLite persistence
//!
//! Implements every store trait of the domain crates over one
//! `SqlitePool`. The concurrency story lives here:
//! - the UNIQUE index on `transactions.source_ref` is the exactly-once
//!   mechanism for credits, refunds and settlements
//! - account writes are versioned (`WHERE version = ?`) so concurrent
//!   role mutations cannot lose updates
//! - order transitions are guarded conditional UPDATEs - of N concurrent
//!   claimants exactly one wins
//! - the order insert and its wallet debit share one database transaction
//!
//! Every successful write publishes a `ChangeEvent` when a notifier is
//! attached.

pub mod accounts;
pub mod db;
pub mod orders;
pub mod payouts;
pub mod transactions;

mod convert;

pub use accounts::SqliteAccountStore;
pub use db::Database;
pub use orders::SqliteOrderStore;
pub use payouts::SqlitePayoutRequestStore;
pub use transactions::SqliteTransactionStore;
