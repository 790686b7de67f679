//! Fourmiz Roles - dual-role account management
//!
//! An account acquires one or both marketplace roles under capability-gating
//! rules. All role reads go through `CapabilityResolver`; the single
//! authoritative writer of the role set is `RoleMutator`.
//!
//! # Key Types
//! - `Account` / `Profile`: the persisted account record
//! - `AccountStore`: versioned persistence seam
//! - `CapabilityResolver`: read side (roles, readiness, missing fields)
//! - `RoleMutator`: write side (set-union role add, idempotent, atomic)

pub mod account;
pub mod capability;
pub mod error;
pub mod mutator;
pub mod store;

pub use account::{Account, Profile, ProfileField, ProfileUpdate};
pub use capability::{Capabilities, CapabilityResolver};
pub use error::RoleError;
pub use mutator::{RoleAddOutcome, RoleMutator};
pub use store::AccountStore;
