//! TransactionStore - the append-only persistence seam
//!
//! Implementations must provide:
//! - append-only inserts with a uniqueness guarantee on `source_ref`
//! - snapshot-consistent per-account listing (no partial view under
//!   concurrent inserts)
//! - at most one status transition pending -> completed|failed per row

use crate::transaction::{Transaction, TransactionStatus};
use async_trait::async_trait;
use fourmiz_core::StoreError;

#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Append a transaction.
    ///
    /// Returns `StoreError::DuplicateSourceRef` when a row with the same
    /// `source_ref` already exists - the caller decides whether the
    /// duplicate is a harmless retry.
    async fn append(&self, tx: Transaction) -> Result<Transaction, StoreError>;

    /// All transactions of one account, from a single consistent snapshot.
    async fn list_by_account(&self, account_id: &str) -> Result<Vec<Transaction>, StoreError>;

    /// Look up a single transaction.
    async fn get(&self, id: &str) -> Result<Transaction, StoreError>;

    /// Transition a pending transaction to a terminal status.
    ///
    /// Fails with `StoreError::Conflict` when the row is no longer
    /// pending (the transition already happened).
    async fn settle(
        &self,
        id: &str,
        status: TransactionStatus,
    ) -> Result<Transaction, StoreError>;
}
