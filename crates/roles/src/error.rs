//! Role management errors

use crate::account::ProfileField;
use fourmiz_core::StoreError;
use thiserror::Error;

/// Errors from capability resolution and role mutation
#[derive(Error, Debug)]
pub enum RoleError {
    #[error("Missing required fields: {}", format_fields(.missing_fields))]
    Validation { missing_fields: Vec<ProfileField> },

    #[error("Concurrent update on account {account_id}, gave up after {attempts} attempts")]
    Conflict { account_id: String, attempts: u32 },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

fn format_fields(fields: &[ProfileField]) -> String {
    fields
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_names_fields() {
        let err = RoleError::Validation {
            missing_fields: vec![ProfileField::PayoutAccount, ProfileField::IdDocument],
        };
        assert_eq!(
            err.to_string(),
            "Missing required fields: payout_account, id_document"
        );
    }
}
