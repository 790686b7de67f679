//! CapabilityResolver - the read side of role management
//!
//! Every component that needs to know what an account may do reads through
//! this resolver; nothing here writes. A missing account record resolves to
//! the empty capability set - a normal precondition state, not a fault.

use crate::account::{Profile, ProfileField};
use crate::error::RoleError;
use crate::store::AccountStore;
use fourmiz_core::{Role, RoleSet};
use std::sync::Arc;

/// Resolved capability view of one account.
#[derive(Debug, Clone, PartialEq)]
pub struct Capabilities {
    pub account_id: String,
    pub roles: RoleSet,
    pub has_basic_info: bool,
    pub has_fourmiz_info: bool,
    pub profile_complete: bool,
    profile: Profile,
}

impl Capabilities {
    /// A role can be added iff the account does not already hold it
    pub fn can_add_role(&self, role: Role) -> bool {
        !self.roles.contains(role)
    }

    /// Required fields for `role` still missing from the profile
    pub fn missing_fields(&self, role: Role) -> Vec<ProfileField> {
        self.profile.missing_fields(role)
    }

    /// Convenience gate used by order and payout flows
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(role)
    }
}

/// Read-only resolver over the account store.
#[derive(Clone)]
pub struct CapabilityResolver {
    accounts: Arc<dyn AccountStore>,
}

impl CapabilityResolver {
    pub fn new(accounts: Arc<dyn AccountStore>) -> Self {
        Self { accounts }
    }

    /// Resolve the capability view of one account.
    pub async fn resolve(&self, account_id: &str) -> Result<Capabilities, RoleError> {
        let account = self.accounts.get(account_id).await?;

        Ok(match account {
            Some(account) => Capabilities {
                account_id: account.account_id,
                roles: account.roles,
                has_basic_info: account.profile.has_basic_info(),
                has_fourmiz_info: account.profile.has_fourmiz_info(),
                profile_complete: account.profile_complete,
                profile: account.profile,
            },
            None => Capabilities {
                account_id: account_id.to_string(),
                roles: RoleSet::new(),
                has_basic_info: false,
                has_fourmiz_info: false,
                profile_complete: false,
                profile: Profile::default(),
            },
        })
    }
}
