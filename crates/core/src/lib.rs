//! Fourmiz Core - Domain primitives
//!
//! This crate contains the fundamental types used across the workspace:
//! - `Amount`: Non-negative decimal wrapper for order/payout amounts
//! - `Role` / `RoleSet`: Capability profiles of an account
//! - `StoreError`: Shared error taxonomy of the persistence seams
//! - id helpers for prefixed record identifiers

pub mod amount;
pub mod error;
pub mod id;
pub mod role;

pub use amount::{Amount, AmountError};
pub use error::StoreError;
pub use role::{Role, RoleParseError, RoleSet};
