//! Payout errors

use crate::request::{PayoutMethod, PayoutStatus};
use fourmiz_core::StoreError;
use fourmiz_roles::RoleError;
use fourmiz_wallet::WalletError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors from payout request validation and settlement
#[derive(Error, Debug)]
pub enum PayoutError {
    #[error("Account {0} does not hold the fourmiz role")]
    NotFourmiz(String),

    #[error("Profile of account {0} is incomplete")]
    ProfileIncomplete(String),

    #[error("Amount {amount} is below the minimum payout of {minimum}")]
    BelowMinimum { amount: Decimal, minimum: Decimal },

    #[error("Requested {requested} exceeds withdrawable balance {withdrawable}")]
    InsufficientFunds {
        requested: Decimal,
        withdrawable: Decimal,
    },

    #[error("Invalid {method} destination: {reason}")]
    InvalidDestination {
        method: PayoutMethod,
        reason: &'static str,
    },

    #[error("Payout request {id} is already {status}")]
    AlreadyResolved { id: String, status: PayoutStatus },

    #[error("Role error: {0}")]
    Role(#[from] RoleError),

    #[error("Wallet error: {0}")]
    Wallet(#[from] WalletError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
