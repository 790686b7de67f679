//! Wallet errors

use fourmiz_core::StoreError;
use thiserror::Error;

/// Errors from wallet operations
#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("{kind} is not an earning kind")]
    NotEarningKind { kind: String },

    #[error("Earning amount must be positive: {0}")]
    NonPositiveAmount(rust_decimal::Decimal),
}
