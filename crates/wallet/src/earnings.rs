//! Earnings - ledger-crediting events
//!
//! Referral bonuses, referral commissions and rewards originate in
//! subsystems outside the wallet (referral codes, campaigns). Their only
//! effect here is a positive transaction per event, idempotent per
//! source_ref: a retried event credits nothing the second time.

use crate::error::WalletError;
use crate::store::TransactionStore;
use crate::transaction::{Transaction, TransactionKind, TransactionStatus};
use fourmiz_core::Amount;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Outcome of an earning grant
#[derive(Debug, Clone, PartialEq)]
pub enum GrantOutcome {
    /// A new transaction was appended
    Created(Transaction),
    /// The same source_ref was already credited - harmless retry, no-op
    AlreadyGranted,
}

impl GrantOutcome {
    pub fn is_noop(&self) -> bool {
        matches!(self, GrantOutcome::AlreadyGranted)
    }
}

/// Writer for earning events.
#[derive(Clone)]
pub struct Earnings {
    store: Arc<dyn TransactionStore>,
}

impl Earnings {
    pub fn new(store: Arc<dyn TransactionStore>) -> Self {
        Self { store }
    }

    /// Credit a referral bonus (signup through a referral code).
    pub async fn grant_referral_bonus(
        &self,
        account_id: &str,
        amount: Amount,
        source_ref: impl Into<String>,
    ) -> Result<GrantOutcome, WalletError> {
        self.grant(account_id, amount, TransactionKind::ReferralBonus, source_ref.into())
            .await
    }

    /// Credit a referral commission (a referred account completed an order).
    pub async fn grant_referral_commission(
        &self,
        account_id: &str,
        amount: Amount,
        source_ref: impl Into<String>,
    ) -> Result<GrantOutcome, WalletError> {
        self.grant(
            account_id,
            amount,
            TransactionKind::ReferralCommission,
            source_ref.into(),
        )
        .await
    }

    /// Credit a reward (campaign or loyalty event).
    pub async fn grant_reward(
        &self,
        account_id: &str,
        amount: Amount,
        source_ref: impl Into<String>,
    ) -> Result<GrantOutcome, WalletError> {
        self.grant(account_id, amount, TransactionKind::Reward, source_ref.into())
            .await
    }

    /// Record a manual back-office adjustment, positive or negative.
    /// Manual entries carry no source_ref and are never deduplicated.
    pub async fn append_manual(
        &self,
        account_id: &str,
        amount: Decimal,
    ) -> Result<Transaction, WalletError> {
        let tx = Transaction::new(
            account_id,
            amount,
            TransactionKind::Manual,
            TransactionStatus::Completed,
            None,
        );
        Ok(self.store.append(tx).await?)
    }

    /// Generic entry point for replayed earning events.
    ///
    /// Rejects non-earning kinds; order payments and withdrawals move
    /// through their own flows and must not come in via grants.
    pub async fn grant(
        &self,
        account_id: &str,
        amount: Amount,
        kind: TransactionKind,
        source_ref: String,
    ) -> Result<GrantOutcome, WalletError> {
        if !kind.is_earning() {
            return Err(WalletError::NotEarningKind {
                kind: kind.to_string(),
            });
        }
        if amount.is_zero() {
            return Err(WalletError::NonPositiveAmount(amount.value()));
        }

        let tx = Transaction::credit(account_id, amount.value(), kind, Some(source_ref.clone()));

        match self.store.append(tx).await {
            Ok(created) => Ok(GrantOutcome::Created(created)),
            Err(err) if err.is_duplicate() => {
                tracing::debug!(account_id, %source_ref, %kind, "earning already granted");
                Ok(GrantOutcome::AlreadyGranted)
            }
            Err(err) => Err(err.into()),
        }
    }
}
