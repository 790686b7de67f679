//! WalletLedger - balance recomputation on demand
//!
//! A thin read-only view over the transaction store. Two concurrent
//! recomputes need no coordination; neither writes anything.

use crate::balance::WalletBalance;
use crate::error::WalletError;
use crate::store::TransactionStore;
use crate::transaction::Transaction;
use std::sync::Arc;

/// Read side of the wallet: recompute balances from the transaction table.
#[derive(Clone)]
pub struct WalletLedger {
    store: Arc<dyn TransactionStore>,
}

impl WalletLedger {
    pub fn new(store: Arc<dyn TransactionStore>) -> Self {
        Self { store }
    }

    /// Recompute the balance of one account from a fresh snapshot.
    ///
    /// An account with no transactions yields the zero balance - that is a
    /// normal state, not an error.
    pub async fn compute_balance(&self, account_id: &str) -> Result<WalletBalance, WalletError> {
        let transactions = self.store.list_by_account(account_id).await?;
        Ok(WalletBalance::from_transactions(&transactions))
    }

    /// The raw transaction history of one account.
    pub async fn transactions(&self, account_id: &str) -> Result<Vec<Transaction>, WalletError> {
        Ok(self.store.list_by_account(account_id).await?)
    }
}
