//! Role and RoleSet - account capability profiles
//!
//! An account holds zero, one or both of the two marketplace roles.
//! `RoleSet` is always a well-defined set: a brand-new account starts with
//! the empty set, never with a null or missing value, so membership checks
//! need no runtime shape guards.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use strum_macros::{Display, EnumString};
use thiserror::Error;

/// Errors that can occur when parsing roles
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoleParseError {
    #[error("Unknown role: {0}")]
    UnknownRole(String),
}

/// A capability profile of an account.
///
/// - `Client` may purchase and order services
/// - `Fourmiz` may fulfill services and earn
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Client,
    Fourmiz,
}

/// The set of roles held by an account.
///
/// # Invariants
/// - Unique, unordered membership (backed by a `BTreeSet`)
/// - Monotonically grown: mutation goes through [`RoleSet::with_role`],
///   which unions - it can never drop an existing role
///
/// # Example
/// ```
/// use fourmiz_core::{Role, RoleSet};
///
/// let roles = RoleSet::default().with_role(Role::Client);
/// assert!(roles.contains(Role::Client));
///
/// let both = roles.with_role(Role::Fourmiz);
/// assert!(both.contains(Role::Client) && both.contains(Role::Fourmiz));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet(BTreeSet<Role>);

impl RoleSet {
    /// The empty role set
    pub fn new() -> Self {
        Self::default()
    }

    /// A set holding a single role
    pub fn of(role: Role) -> Self {
        Self::new().with_role(role)
    }

    /// Membership test
    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    /// Union with one role, leaving every existing role in place.
    ///
    /// This is the only growth operation - there is deliberately no way to
    /// replace the whole set in one call.
    #[must_use]
    pub fn with_role(&self, role: Role) -> Self {
        let mut set = self.0.clone();
        set.insert(role);
        Self(set)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let codes: Vec<String> = self.0.iter().map(|r| r.to_string()).collect();
        write!(f, "{}", codes.join(","))
    }
}

impl FromStr for RoleSet {
    type Err = RoleParseError;

    /// Parse a comma-separated role list, e.g. `"client,fourmiz"`.
    /// The empty string parses to the empty set.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut set = BTreeSet::new();
        for part in s.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let role = part
                .parse::<Role>()
                .map_err(|_| RoleParseError::UnknownRole(part.to_string()))?;
            set.insert(role);
        }
        Ok(Self(set))
    }
}
