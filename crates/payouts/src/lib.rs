//! Fourmiz Payouts - withdrawal intents against the wallet ledger
//!
//! A payout request is an intent, not a movement of funds: the manager
//! validates it against a fresh balance (with pending requests reserved)
//! and records it pending. Settlement - turning an approved request into a
//! withdrawal transaction - is a back-office action, modeled here by
//! `PayoutSettlement` with exactly-once semantics per request.

pub mod error;
pub mod manager;
pub mod request;
pub mod settlement;
pub mod store;

pub use error::PayoutError;
pub use manager::{PayoutConfig, PayoutManager};
pub use request::{PayoutMethod, PayoutRequest, PayoutStatus};
pub use settlement::{PayoutSettlement, SettleOutcome};
pub use store::PayoutRequestStore;
