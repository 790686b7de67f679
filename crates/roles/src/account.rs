//! Account and Profile - the persisted account record
//!
//! A profile field counts as present only when it is non-empty after
//! trimming. The `version` field is the optimistic-concurrency token: every
//! successful write bumps it, and a write against a stale version is
//! rejected by the store.

use chrono::{DateTime, Utc};
use fourmiz_core::{Role, RoleSet};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// The individually required profile fields
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    FirstName,
    LastName,
    Phone,
    Address,
    City,
    PostalCode,
    PayoutAccount,
    IdDocument,
}

impl ProfileField {
    /// Basic-info fields, required for every role
    pub const BASIC: [ProfileField; 6] = [
        ProfileField::FirstName,
        ProfileField::LastName,
        ProfileField::Phone,
        ProfileField::Address,
        ProfileField::City,
        ProfileField::PostalCode,
    ];

    /// Fields required on top of basic info for the fourmiz role
    pub const FOURMIZ: [ProfileField; 2] =
        [ProfileField::PayoutAccount, ProfileField::IdDocument];
}

/// Account profile data.
///
/// Basic-info fields apply to both roles; `payout_account` (payout
/// destination identity) and `id_document` (identity document reference)
/// are fourmiz-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub payout_account: Option<String>,
    pub id_document: Option<String>,
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().map(|s| !s.trim().is_empty()).unwrap_or(false)
}

impl Profile {
    fn field(&self, field: ProfileField) -> &Option<String> {
        match field {
            ProfileField::FirstName => &self.first_name,
            ProfileField::LastName => &self.last_name,
            ProfileField::Phone => &self.phone,
            ProfileField::Address => &self.address,
            ProfileField::City => &self.city,
            ProfileField::PostalCode => &self.postal_code,
            ProfileField::PayoutAccount => &self.payout_account,
            ProfileField::IdDocument => &self.id_document,
        }
    }

    /// All basic-info fields present and non-empty
    pub fn has_basic_info(&self) -> bool {
        ProfileField::BASIC.iter().all(|f| present(self.field(*f)))
    }

    /// Payout destination and identity document both present
    pub fn has_fourmiz_info(&self) -> bool {
        ProfileField::FOURMIZ.iter().all(|f| present(self.field(*f)))
    }

    /// Required fields for `role` that are still missing
    pub fn missing_fields(&self, role: Role) -> Vec<ProfileField> {
        let required: Vec<ProfileField> = match role {
            Role::Client => ProfileField::BASIC.to_vec(),
            Role::Fourmiz => ProfileField::BASIC
                .iter()
                .chain(ProfileField::FOURMIZ.iter())
                .copied()
                .collect(),
        };
        required
            .into_iter()
            .filter(|f| !present(self.field(*f)))
            .collect()
    }

    /// Required fields missing for any of the held roles
    pub fn missing_for_roles(&self, roles: &RoleSet) -> Vec<ProfileField> {
        let mut missing = Vec::new();
        for role in roles.iter() {
            for field in self.missing_fields(role) {
                if !missing.contains(&field) {
                    missing.push(field);
                }
            }
        }
        missing
    }

    /// Overlay the supplied fields; `None` entries leave the current value.
    pub fn merge(&mut self, update: &ProfileUpdate) {
        let ProfileUpdate {
            first_name,
            last_name,
            phone,
            address,
            city,
            postal_code,
            payout_account,
            id_document,
        } = update;
        if let Some(v) = first_name {
            self.first_name = Some(v.clone());
        }
        if let Some(v) = last_name {
            self.last_name = Some(v.clone());
        }
        if let Some(v) = phone {
            self.phone = Some(v.clone());
        }
        if let Some(v) = address {
            self.address = Some(v.clone());
        }
        if let Some(v) = city {
            self.city = Some(v.clone());
        }
        if let Some(v) = postal_code {
            self.postal_code = Some(v.clone());
        }
        if let Some(v) = payout_account {
            self.payout_account = Some(v.clone());
        }
        if let Some(v) = id_document {
            self.id_document = Some(v.clone());
        }
    }
}

/// Partial profile data supplied alongside a role addition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub payout_account: Option<String>,
    pub id_document: Option<String>,
}

/// The persisted account record.
///
/// `roles` is always a well-defined set - a brand-new record starts empty.
/// Absence of the whole record is the valid "zero roles" state and is
/// handled by the resolver, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub account_id: String,
    pub roles: RoleSet,
    pub profile: Profile,
    pub profile_complete: bool,
    /// Optimistic-concurrency token, bumped by every successful write
    pub version: u64,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// A fresh record with no roles and an empty profile
    pub fn new(account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            roles: RoleSet::new(),
            profile: Profile::default(),
            profile_complete: false,
            version: 0,
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic_update() -> ProfileUpdate {
        ProfileUpdate {
            first_name: Some("Ada".to_string()),
            last_name: Some("Martin".to_string()),
            phone: Some("+33600000001".to_string()),
            address: Some("1 rue des Fourmis".to_string()),
            city: Some("Lyon".to_string()),
            postal_code: Some("69001".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_profile_missing_everything_for_client() {
        let profile = Profile::default();
        assert_eq!(profile.missing_fields(Role::Client).len(), 6);
        assert!(!profile.has_basic_info());
    }

    #[test]
    fn test_merge_fills_basic_info() {
        let mut profile = Profile::default();
        profile.merge(&basic_update());
        assert!(profile.has_basic_info());
        assert!(profile.missing_fields(Role::Client).is_empty());
    }

    #[test]
    fn test_fourmiz_requires_basic_and_fourmiz_fields() {
        let mut profile = Profile::default();
        profile.merge(&basic_update());
        let missing = profile.missing_fields(Role::Fourmiz);
        assert_eq!(
            missing,
            vec![ProfileField::PayoutAccount, ProfileField::IdDocument]
        );
    }

    #[test]
    fn test_blank_field_counts_as_missing() {
        let mut profile = Profile::default();
        let mut update = basic_update();
        update.phone = Some("   ".to_string());
        profile.merge(&update);
        assert_eq!(profile.missing_fields(Role::Client), vec![ProfileField::Phone]);
    }

    #[test]
    fn test_merge_keeps_existing_on_none() {
        let mut profile = Profile::default();
        profile.merge(&basic_update());
        profile.merge(&ProfileUpdate {
            city: Some("Paris".to_string()),
            ..Default::default()
        });
        assert_eq!(profile.city.as_deref(), Some("Paris"));
        assert_eq!(profile.first_name.as_deref(), Some("Ada"));
    }

    #[test]
    fn test_new_account_has_no_roles() {
        let account = Account::new("acc-1");
        assert!(account.roles.is_empty());
        assert!(!account.profile_complete);
        assert_eq!(account.version, 0);
    }
}
