//! AccountStore - versioned persistence seam for account records
//!
//! The versioned write methods are the atomicity primitive for role
//! mutation: two concurrent read-modify-write cycles cannot both succeed
//! against the same version, so a lost update is impossible.

use crate::account::Account;
use async_trait::async_trait;
use fourmiz_core::StoreError;

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Fetch an account record. `None` is the valid "zero roles" state.
    async fn get(&self, account_id: &str) -> Result<Option<Account>, StoreError>;

    /// Insert a brand-new record (version 0).
    ///
    /// Fails with `StoreError::Conflict` when a record already
    /// exists - a concurrent creation won the race.
    async fn insert(&self, account: &Account) -> Result<Account, StoreError>;

    /// Overwrite the record if and only if the stored version equals
    /// `expected_version`; the stored version is bumped on success.
    ///
    /// Fails with `StoreError::Conflict` on a stale version.
    async fn update(
        &self,
        account: &Account,
        expected_version: u64,
    ) -> Result<Account, StoreError>;
}
