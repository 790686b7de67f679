//! Fourmiz Orders - order lifecycle coupled to the wallet ledger
//!
//! Orders move through `pending -> accepted -> in_progress -> completed`
//! (or are cancelled before work starts). The `OrderWalletBridge` couples
//! the lifecycle to the ledger: wallet-funded creation debits the client
//! atomically with the order insert, and completion credits the fourmiz
//! exactly once after both parties validated.

pub mod bridge;
pub mod error;
pub mod order;
pub mod store;

pub use bridge::{CreditOutcome, OrderWalletBridge};
pub use error::OrderError;
pub use order::{CancelActor, Order, OrderParty, OrderSpec, OrderStatus};
pub use store::OrderStore;
