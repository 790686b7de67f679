//! SQLite account store - versioned writes

use crate::convert::{is_unique_violation, parse_timestamp};
use async_trait::async_trait;
use fourmiz_core::{RoleSet, StoreError};
use fourmiz_notify::{ChangeEvent, ChangeNotifier, ChangeTable};
use fourmiz_roles::{Account, AccountStore, Profile};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

/// Account persistence over SQLite.
#[derive(Clone)]
pub struct SqliteAccountStore {
    pool: SqlitePool,
    notifier: Option<ChangeNotifier>,
}

impl SqliteAccountStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            notifier: None,
        }
    }

    pub fn with_notifier(pool: SqlitePool, notifier: ChangeNotifier) -> Self {
        Self {
            pool,
            notifier: Some(notifier),
        }
    }

    fn notify(&self, event: ChangeEvent) {
        if let Some(notifier) = &self.notifier {
            notifier.publish(event);
        }
    }
}

fn account_from_row(row: &SqliteRow) -> Result<Account, StoreError> {
    let roles_text: String = row.get("roles");
    let roles: RoleSet = roles_text
        .parse()
        .map_err(|_| StoreError::Corrupt(format!("bad role set: {roles_text}")))?;

    let profile_json: String = row.get("profile_json");
    let profile: Profile = serde_json::from_str(&profile_json)
        .map_err(|err| StoreError::Corrupt(format!("bad profile json: {err}")))?;

    let version: i64 = row.get("version");
    let updated_at: String = row.get("updated_at");

    Ok(Account {
        account_id: row.get("account_id"),
        roles,
        profile,
        profile_complete: row.get("profile_complete"),
        version: version as u64,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

#[async_trait]
impl AccountStore for SqliteAccountStore {
    async fn get(&self, account_id: &str) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query(
            "SELECT account_id, roles, profile_json, profile_complete, version, updated_at
             FROM accounts WHERE account_id = ?",
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        row.as_ref().map(account_from_row).transpose()
    }

    async fn insert(&self, account: &Account) -> Result<Account, StoreError> {
        let profile_json =
            serde_json::to_string(&account.profile).map_err(StoreError::backend)?;

        let result = sqlx::query(
            "INSERT INTO accounts
             (account_id, roles, profile_json, profile_complete, version, updated_at)
             VALUES (?, ?, ?, ?, 0, ?)",
        )
        .bind(&account.account_id)
        .bind(account.roles.to_string())
        .bind(profile_json)
        .bind(account.profile_complete)
        .bind(account.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                self.notify(ChangeEvent::inserted(
                    ChangeTable::Accounts,
                    account.account_id.clone(),
                ));
                let mut saved = account.clone();
                saved.version = 0;
                Ok(saved)
            }
            Err(err) if is_unique_violation(&err) => Err(StoreError::conflict(
                account.account_id.clone(),
                "record already exists",
            )),
            Err(err) => Err(StoreError::backend(err)),
        }
    }

    async fn update(
        &self,
        account: &Account,
        expected_version: u64,
    ) -> Result<Account, StoreError> {
        let profile_json =
            serde_json::to_string(&account.profile).map_err(StoreError::backend)?;
        let new_version = expected_version + 1;

        let result = sqlx::query(
            "UPDATE accounts
             SET roles = ?, profile_json = ?, profile_complete = ?, version = ?, updated_at = ?
             WHERE account_id = ? AND version = ?",
        )
        .bind(account.roles.to_string())
        .bind(profile_json)
        .bind(account.profile_complete)
        .bind(new_version as i64)
        .bind(account.updated_at.to_rfc3339())
        .bind(&account.account_id)
        .bind(expected_version as i64)
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::conflict(
                account.account_id.clone(),
                "stale version",
            ));
        }

        self.notify(ChangeEvent::updated(
            ChangeTable::Accounts,
            account.account_id.clone(),
        ));
        let mut saved = account.clone();
        saved.version = new_version;
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use fourmiz_core::Role;

    async fn store() -> SqliteAccountStore {
        let db = Database::in_memory().await.unwrap();
        SqliteAccountStore::new(db.pool().clone())
    }

    #[tokio::test]
    async fn test_missing_account_is_none() {
        let store = store().await;
        assert!(store.get("acc-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_get_roundtrip() {
        let store = store().await;
        let mut account = Account::new("acc-1");
        account.roles = account.roles.with_role(Role::Client);
        account.profile.first_name = Some("Ada".to_string());

        store.insert(&account).await.unwrap();

        let loaded = store.get("acc-1").await.unwrap().unwrap();
        assert!(loaded.roles.contains(Role::Client));
        assert_eq!(loaded.profile.first_name.as_deref(), Some("Ada"));
        assert_eq!(loaded.version, 0);
    }

    #[tokio::test]
    async fn test_double_insert_conflicts() {
        let store = store().await;
        let account = Account::new("acc-1");
        store.insert(&account).await.unwrap();

        let err = store.insert(&account).await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_update_bumps_version() {
        let store = store().await;
        let account = Account::new("acc-1");
        store.insert(&account).await.unwrap();

        let mut changed = account.clone();
        changed.roles = changed.roles.with_role(Role::Fourmiz);
        let saved = store.update(&changed, 0).await.unwrap();
        assert_eq!(saved.version, 1);

        let loaded = store.get("acc-1").await.unwrap().unwrap();
        assert_eq!(loaded.version, 1);
        assert!(loaded.roles.contains(Role::Fourmiz));
    }

    #[tokio::test]
    async fn test_stale_version_update_conflicts() {
        let store = store().await;
        let account = Account::new("acc-1");
        store.insert(&account).await.unwrap();
        store.update(&account, 0).await.unwrap();

        // A writer still holding version 0 must lose.
        let err = store.update(&account, 0).await.unwrap_err();
        assert!(err.is_conflict());
    }
}
