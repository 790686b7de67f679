//! Shared error taxonomy of the persistence seams
//!
//! Every store trait in the workspace returns `StoreError` so managers can
//! translate backend faults uniformly:
//! - `NotFound` is a valid empty state wherever the contract says so
//!   (a missing account means "zero roles", not a fault)
//! - `DuplicateSourceRef` is the exactly-once signal - callers retrying a
//!   harmless duplicate treat it as success-no-op
//! - `Conflict` is a lost guarded write: a stale version or a row that no
//!   longer satisfies the guard. Retried with a fresh read a bounded number
//!   of times where a retry can help, surfaced otherwise

use thiserror::Error;

/// Errors reported by the persistence layer
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Duplicate source_ref: {0}")]
    DuplicateSourceRef(String),

    #[error("Conflicting write on {record}: {reason}")]
    Conflict {
        record: String,
        reason: &'static str,
    },

    #[error("Invalid stored data: {0}")]
    Corrupt(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Wrap an arbitrary backend failure
    pub fn backend(err: impl std::fmt::Display) -> Self {
        StoreError::Backend(err.to_string())
    }

    /// A lost guarded write on `record`
    pub fn conflict(record: impl Into<String>, reason: &'static str) -> Self {
        StoreError::Conflict {
            record: record.into(),
            reason,
        }
    }

    /// True if this error is the exactly-once duplicate signal
    pub fn is_duplicate(&self) -> bool {
        matches!(self, StoreError::DuplicateSourceRef(_))
    }

    /// True if this error is a lost guarded write
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_detection() {
        let err = StoreError::DuplicateSourceRef("order:ORD-1:credit".to_string());
        assert!(err.is_duplicate());
        assert!(!err.is_conflict());
    }

    #[test]
    fn test_conflict_detection() {
        let err = StoreError::conflict("acc-1", "stale version");
        assert!(err.is_conflict());
        assert_eq!(
            err.to_string(),
            "Conflicting write on acc-1: stale version"
        );
    }

    #[test]
    fn test_backend_wrap() {
        let err = StoreError::backend("disk on fire");
        assert!(matches!(err, StoreError::Backend(_)));
    }
}
