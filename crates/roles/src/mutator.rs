//! RoleMutator - the single authoritative writer of the role set
//!
//! Role addition is a set-union: the new role joins whatever the account
//! already holds. A write that replaced the whole set wholesale could drop
//! a concurrently added role, so the mutation runs as an optimistic
//! read-modify-write against the record version and retries on conflict.

use crate::account::{Account, ProfileUpdate};
use crate::error::RoleError;
use crate::store::AccountStore;
use chrono::Utc;
use fourmiz_core::Role;
use std::sync::Arc;

const MAX_ATTEMPTS: u32 = 3;

/// Result of a role addition
#[derive(Debug, Clone, PartialEq)]
pub struct RoleAddOutcome {
    /// True when the role was already present and nothing was written
    pub noop: bool,
    pub account: Account,
}

/// Write side of role management.
#[derive(Clone)]
pub struct RoleMutator {
    accounts: Arc<dyn AccountStore>,
}

impl RoleMutator {
    pub fn new(accounts: Arc<dyn AccountStore>) -> Self {
        Self { accounts }
    }

    /// Add `role` to the account, merging `fields` into the profile.
    ///
    /// - Idempotent: an already-present role returns `noop = true` without
    ///   writing.
    /// - Rejects with `RoleError::Validation` when required fields for the
    ///   role are still missing after the merge; nothing is persisted.
    /// - Retries a bounded number of times on version conflicts, then
    ///   surfaces `RoleError::Conflict`.
    pub async fn add_role(
        &self,
        account_id: &str,
        role: Role,
        fields: &ProfileUpdate,
    ) -> Result<RoleAddOutcome, RoleError> {
        for attempt in 1..=MAX_ATTEMPTS {
            let result = match self.accounts.get(account_id).await? {
                Some(existing) => self.add_to_existing(existing, role, fields).await,
                None => self.create_with_role(account_id, role, fields).await,
            };

            match result {
                Ok(outcome) => return Ok(outcome),
                Err(RoleError::Store(err)) if err.is_conflict() => {
                    tracing::debug!(account_id, %role, attempt, "role update conflict, retrying");
                    continue;
                }
                Err(err) => return Err(err),
            }
        }

        tracing::warn!(account_id, %role, "role update lost every retry");
        Err(RoleError::Conflict {
            account_id: account_id.to_string(),
            attempts: MAX_ATTEMPTS,
        })
    }

    async fn add_to_existing(
        &self,
        existing: Account,
        role: Role,
        fields: &ProfileUpdate,
    ) -> Result<RoleAddOutcome, RoleError> {
        if existing.roles.contains(role) {
            return Ok(RoleAddOutcome {
                noop: true,
                account: existing,
            });
        }

        let mut profile = existing.profile.clone();
        profile.merge(fields);

        let missing = profile.missing_fields(role);
        if !missing.is_empty() {
            return Err(RoleError::Validation {
                missing_fields: missing,
            });
        }

        // Union, never overwrite: every role already held survives.
        let roles = existing.roles.with_role(role);
        let profile_complete = profile.missing_for_roles(&roles).is_empty();

        let candidate = Account {
            roles,
            profile,
            profile_complete,
            updated_at: Utc::now(),
            ..existing.clone()
        };

        let saved = self.accounts.update(&candidate, existing.version).await?;
        Ok(RoleAddOutcome {
            noop: false,
            account: saved,
        })
    }

    async fn create_with_role(
        &self,
        account_id: &str,
        role: Role,
        fields: &ProfileUpdate,
    ) -> Result<RoleAddOutcome, RoleError> {
        let mut account = Account::new(account_id);
        account.profile.merge(fields);

        let missing = account.profile.missing_fields(role);
        if !missing.is_empty() {
            return Err(RoleError::Validation {
                missing_fields: missing,
            });
        }

        account.roles = account.roles.with_role(role);
        account.profile_complete = account.profile.missing_for_roles(&account.roles).is_empty();

        let saved = self.accounts.insert(&account).await?;
        Ok(RoleAddOutcome {
            noop: false,
            account: saved,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::ProfileField;
    use async_trait::async_trait;
    use fourmiz_core::StoreError;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// In-memory store with versioned writes and an injectable conflict count
    struct MemoryAccounts {
        records: Mutex<HashMap<String, Account>>,
        forced_conflicts: AtomicU32,
    }

    impl MemoryAccounts {
        fn new() -> Self {
            Self {
                records: Mutex::new(HashMap::new()),
                forced_conflicts: AtomicU32::new(0),
            }
        }

        fn force_conflicts(&self, n: u32) {
            self.forced_conflicts.store(n, Ordering::SeqCst);
        }

        fn take_forced_conflict(&self) -> bool {
            self.forced_conflicts
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
        }
    }

    #[async_trait]
    impl AccountStore for MemoryAccounts {
        async fn get(&self, account_id: &str) -> Result<Option<Account>, StoreError> {
            Ok(self.records.lock().unwrap().get(account_id).cloned())
        }

        async fn insert(&self, account: &Account) -> Result<Account, StoreError> {
            let mut records = self.records.lock().unwrap();
            if records.contains_key(&account.account_id) {
                return Err(StoreError::conflict(
                    account.account_id.clone(),
                    "record already exists",
                ));
            }
            records.insert(account.account_id.clone(), account.clone());
            Ok(account.clone())
        }

        async fn update(
            &self,
            account: &Account,
            expected_version: u64,
        ) -> Result<Account, StoreError> {
            if self.take_forced_conflict() {
                return Err(StoreError::conflict(
                    account.account_id.clone(),
                    "stale version",
                ));
            }
            let mut records = self.records.lock().unwrap();
            let stored = records
                .get(&account.account_id)
                .ok_or_else(|| StoreError::NotFound(account.account_id.clone()))?;
            if stored.version != expected_version {
                return Err(StoreError::conflict(
                    account.account_id.clone(),
                    "stale version",
                ));
            }
            let mut saved = account.clone();
            saved.version = expected_version + 1;
            records.insert(saved.account_id.clone(), saved.clone());
            Ok(saved)
        }
    }

    fn basic_fields() -> ProfileUpdate {
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

    fn fourmiz_fields() -> ProfileUpdate {
        ProfileUpdate {
            payout_account: Some("FR76 3000 6000 0112 3456 7890 189".to_string()),
            id_document: Some("doc/ada-id.png".to_string()),
            ..basic_fields()
        }
    }

    #[tokio::test]
    async fn test_add_role_creates_account() {
        let store = Arc::new(MemoryAccounts::new());
        let mutator = RoleMutator::new(Arc::clone(&store) as Arc<dyn AccountStore>);

        let outcome = mutator
            .add_role("acc-1", Role::Client, &basic_fields())
            .await
            .unwrap();
        assert!(!outcome.noop);
        assert!(outcome.account.roles.contains(Role::Client));
        assert!(outcome.account.profile_complete);
    }

    #[tokio::test]
    async fn test_add_role_is_idempotent() {
        let store = Arc::new(MemoryAccounts::new());
        let mutator = RoleMutator::new(Arc::clone(&store) as Arc<dyn AccountStore>);

        mutator
            .add_role("acc-1", Role::Fourmiz, &fourmiz_fields())
            .await
            .unwrap();
        let second = mutator
            .add_role("acc-1", Role::Fourmiz, &ProfileUpdate::default())
            .await
            .unwrap();

        assert!(second.noop);
        assert_eq!(second.account.roles.len(), 1);
    }

    #[tokio::test]
    async fn test_add_role_unions_never_overwrites() {
        let store = Arc::new(MemoryAccounts::new());
        let mutator = RoleMutator::new(Arc::clone(&store) as Arc<dyn AccountStore>);

        mutator
            .add_role("acc-1", Role::Client, &basic_fields())
            .await
            .unwrap();
        let outcome = mutator
            .add_role(
                "acc-1",
                Role::Fourmiz,
                &ProfileUpdate {
                    payout_account: Some("FR76...".to_string()),
                    id_document: Some("doc/id.png".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(outcome.account.roles.contains(Role::Client));
        assert!(outcome.account.roles.contains(Role::Fourmiz));
    }

    #[tokio::test]
    async fn test_missing_fourmiz_fields_rejected_without_write() {
        let store = Arc::new(MemoryAccounts::new());
        let mutator = RoleMutator::new(Arc::clone(&store) as Arc<dyn AccountStore>);

        mutator
            .add_role("acc-1", Role::Client, &basic_fields())
            .await
            .unwrap();
        let before = store.get("acc-1").await.unwrap().unwrap();

        let err = mutator
            .add_role("acc-1", Role::Fourmiz, &ProfileUpdate::default())
            .await
            .unwrap_err();

        match err {
            RoleError::Validation { missing_fields } => {
                assert_eq!(
                    missing_fields,
                    vec![ProfileField::PayoutAccount, ProfileField::IdDocument]
                );
            }
            other => panic!("unexpected error: {other}"),
        }

        let after = store.get("acc-1").await.unwrap().unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_conflict_retried_then_succeeds() {
        let store = Arc::new(MemoryAccounts::new());
        let mutator = RoleMutator::new(Arc::clone(&store) as Arc<dyn AccountStore>);

        mutator
            .add_role("acc-1", Role::Client, &basic_fields())
            .await
            .unwrap();

        store.force_conflicts(1);
        let outcome = mutator
            .add_role(
                "acc-1",
                Role::Fourmiz,
                &ProfileUpdate {
                    payout_account: Some("FR76...".to_string()),
                    id_document: Some("doc/id.png".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(outcome.account.roles.contains(Role::Fourmiz));
    }

    #[tokio::test]
    async fn test_conflict_exhaustion_surfaces() {
        let store = Arc::new(MemoryAccounts::new());
        let mutator = RoleMutator::new(Arc::clone(&store) as Arc<dyn AccountStore>);

        mutator
            .add_role("acc-1", Role::Client, &basic_fields())
            .await
            .unwrap();

        store.force_conflicts(10);
        let err = mutator
            .add_role(
                "acc-1",
                Role::Fourmiz,
                &ProfileUpdate {
                    payout_account: Some("FR76...".to_string()),
                    id_document: Some("doc/id.png".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RoleError::Conflict { attempts: 3, .. }));
    }
}
