//! Order errors

use crate::order::OrderStatus;
use fourmiz_core::StoreError;
use fourmiz_roles::RoleError;
use fourmiz_wallet::WalletError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors from order lifecycle operations
#[derive(Error, Debug)]
pub enum OrderError {
    #[error("Account {0} does not hold the client role")]
    NotClient(String),

    #[error("Account {0} does not hold the fourmiz role")]
    NotFourmiz(String),

    #[error("Wallet balance {available} cannot cover order total {required}")]
    InsufficientFunds {
        required: Decimal,
        available: Decimal,
    },

    #[error("Fourmiz amount {fourmiz_amount} exceeds order total {total}")]
    FourmizAmountExceedsTotal {
        fourmiz_amount: Decimal,
        total: Decimal,
    },

    #[error("Account {account_id} cannot claim its own order {order_id}")]
    OwnOrder {
        order_id: String,
        account_id: String,
    },

    #[error("Order {order_id} was already claimed")]
    AlreadyClaimed { order_id: String },

    #[error("Account {account_id} is not a party to order {order_id}")]
    NotParticipant {
        order_id: String,
        account_id: String,
    },

    #[error("Order {order_id} cannot move from {from} to {to}")]
    InvalidTransition {
        order_id: String,
        from: OrderStatus,
        to: OrderStatus,
    },

    #[error("Order {order_id} is not validated by both parties")]
    NotYetValidated { order_id: String },

    #[error("Concurrent update on order {order_id}")]
    Conflict { order_id: String },

    #[error("Role error: {0}")]
    Role(#[from] RoleError),

    #[error("Wallet error: {0}")]
    Wallet(#[from] WalletError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
