//! BalanceTracker - last-known-good balance cache
//!
//! Never authoritative: the transaction table is the source of truth and a
//! fresh recompute always wins. The cache exists so a failed recompute can
//! fall back to the last known-good value, flagged stale - it is never
//! replaced by zero or an error placeholder that could be mistaken for an
//! actual zero balance.

use crate::balance::WalletBalance;
use crate::error::WalletError;
use crate::ledger::WalletLedger;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// A cached balance with freshness metadata
#[derive(Debug, Clone, PartialEq)]
pub struct CachedBalance {
    pub balance: WalletBalance,
    pub computed_at: DateTime<Utc>,
    /// True when the most recent recompute failed and this value is the
    /// retained previous one
    pub stale: bool,
}

/// Per-account balance cache fed by recomputes.
pub struct BalanceTracker {
    ledger: WalletLedger,
    cache: RwLock<HashMap<String, CachedBalance>>,
}

impl BalanceTracker {
    pub fn new(ledger: WalletLedger) -> Self {
        Self {
            ledger,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Recompute one account and update the cache.
    ///
    /// On failure the previous value (if any) is retained and marked stale;
    /// the error is still returned so callers can surface it.
    pub async fn refresh(&self, account_id: &str) -> Result<CachedBalance, WalletError> {
        match self.ledger.compute_balance(account_id).await {
            Ok(balance) => {
                let cached = CachedBalance {
                    balance,
                    computed_at: Utc::now(),
                    stale: false,
                };
                self.cache
                    .write()
                    .await
                    .insert(account_id.to_string(), cached.clone());
                Ok(cached)
            }
            Err(err) => {
                let mut cache = self.cache.write().await;
                if let Some(entry) = cache.get_mut(account_id) {
                    entry.stale = true;
                    tracing::warn!(account_id, error = %err, "balance recompute failed, retaining stale value");
                } else {
                    tracing::warn!(account_id, error = %err, "balance recompute failed, no cached value to retain");
                }
                Err(err)
            }
        }
    }

    /// The cached value, if any. A `None` means "never computed", not zero.
    pub async fn get(&self, account_id: &str) -> Option<CachedBalance> {
        self.cache.read().await.get(account_id).cloned()
    }
}
