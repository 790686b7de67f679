//! PayoutRequestStore - persistence seam for payout requests

use crate::request::{PayoutRequest, PayoutStatus};
use async_trait::async_trait;
use fourmiz_core::StoreError;

#[async_trait]
pub trait PayoutRequestStore: Send + Sync {
    async fn insert(&self, request: &PayoutRequest) -> Result<PayoutRequest, StoreError>;

    async fn get(&self, id: &str) -> Result<PayoutRequest, StoreError>;

    async fn list_by_account(&self, account_id: &str)
        -> Result<Vec<PayoutRequest>, StoreError>;

    /// The account's unresolved requests - the reservation base.
    async fn list_pending_by_account(
        &self,
        account_id: &str,
    ) -> Result<Vec<PayoutRequest>, StoreError>;

    /// Move a pending request to a terminal status.
    ///
    /// Fails with `StoreError::Conflict` when the request is no
    /// longer pending (the resolution already happened).
    async fn mark(&self, id: &str, status: PayoutStatus) -> Result<PayoutRequest, StoreError>;
}
