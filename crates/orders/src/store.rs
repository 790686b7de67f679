//! OrderStore - persistence seam for the order lifecycle
//!
//! Mutating methods are guarded: each one applies only when the stored row
//! still satisfies the precondition it was called under, so two concurrent
//! callers cannot both win the same transition.

use crate::order::{CancelActor, Order, OrderParty};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fourmiz_core::StoreError;
use fourmiz_wallet::Transaction;

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert a new order without touching the ledger.
    async fn insert(&self, order: &Order) -> Result<Order, StoreError>;

    /// Insert a wallet-funded order together with its debit transaction,
    /// both-or-neither: if either write fails, neither is committed.
    async fn insert_paid(&self, order: &Order, debit: &Transaction)
        -> Result<Order, StoreError>;

    async fn get(&self, order_id: &str) -> Result<Order, StoreError>;

    /// Claim a pending, unassigned order for `fourmiz_id`.
    ///
    /// Guarded on `status = pending AND fourmiz_id IS NULL`; exactly one of
    /// any number of concurrent claimants wins, the rest get
    /// `StoreError::Conflict`.
    async fn claim(
        &self,
        order_id: &str,
        fourmiz_id: &str,
        at: DateTime<Utc>,
    ) -> Result<Order, StoreError>;

    /// accepted -> in_progress, guarded on the current status.
    async fn start(&self, order_id: &str) -> Result<Order, StoreError>;

    /// Record one party's completion validation.
    ///
    /// Idempotent per party: the first timestamp wins, a repeat leaves it
    /// unchanged and succeeds.
    async fn set_validation(
        &self,
        order_id: &str,
        party: OrderParty,
        at: DateTime<Utc>,
    ) -> Result<Order, StoreError>;

    /// in_progress -> completed, guarded on the current status.
    async fn complete(&self, order_id: &str) -> Result<Order, StoreError>;

    /// pending|accepted -> cancelled, guarded on the current status.
    async fn cancel(
        &self,
        order_id: &str,
        by: CancelActor,
        at: DateTime<Utc>,
    ) -> Result<Order, StoreError>;
}
