//! Error types for the listing store.

use crate::schema::ValidationError;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The targeted domain id does not exist in the collection.
    #[error("{collection}: no document with id {id:?}")]
    NotFound {
        /// Collection that was searched.
        collection: &'static str,
        /// Domain id that was not found.
        id: String,
    },

    /// Input rejected before any write.
    #[error("validation failed: {}", join_errors(.0))]
    ValidationFailed(Vec<ValidationError>),

    /// A transaction was rolled back.
    #[error("transaction aborted: {reason}")]
    TransactionAborted {
        /// Reason for abort.
        reason: String,
        /// Set only for lock contention; every other abort is final.
        retryable: bool,
    },

    /// A mandatory state change matched no document.
    #[error("{collection}: update of {id:?} changed nothing ({reason})")]
    NoOp {
        /// Collection that was updated.
        collection: &'static str,
        /// Domain id of the target.
        id: String,
        /// Why nothing changed.
        reason: String,
    },

    /// A unique key is already taken.
    #[error("{collection}: duplicate key {id:?}")]
    Duplicate {
        /// Collection that rejected the insert.
        collection: &'static str,
        /// The conflicting key.
        id: String,
    },

    /// SQLite error.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A stored document could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The data directory could not be prepared.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Seed data could not be read.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl StoreError {
    pub fn not_found(collection: &'static str, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            collection,
            id: id.into(),
        }
    }

    /// A final abort: running the same work again fails the same way.
    pub fn aborted(reason: impl Into<String>) -> Self {
        StoreError::TransactionAborted {
            reason: reason.into(),
            retryable: false,
        }
    }

    /// An abort caused by another writer holding the lock.
    pub fn busy(reason: impl Into<String>) -> Self {
        StoreError::TransactionAborted {
            reason: reason.into(),
            retryable: true,
        }
    }

    /// Busy and locked databases are the only failures worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::TransactionAborted { retryable, .. } => *retryable,
            StoreError::Database(err) => is_lock_contention(err),
            _ => false,
        }
    }

    /// Lift raw SQLite lock contention into `TransactionAborted`.
    pub(crate) fn into_abort(self) -> Self {
        match self {
            StoreError::Database(ref err) if is_lock_contention(err) => {
                StoreError::busy(format!("store busy: {err}"))
            }
            other => other,
        }
    }
}

pub(crate) fn is_lock_contention(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::DatabaseBusy
                || e.code == rusqlite::ErrorCode::DatabaseLocked
    )
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_is_retryable() {
        let busy = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        );
        let err = StoreError::from(busy);
        assert!(err.is_retryable());
        let lifted = err.into_abort();
        assert!(matches!(
            lifted,
            StoreError::TransactionAborted { retryable: true, .. }
        ));
        assert!(lifted.is_retryable());

        assert!(!StoreError::not_found("users", "u1").is_retryable());
    }

    #[test]
    fn test_plain_abort_is_final() {
        assert!(!StoreError::aborted("owner missing").is_retryable());
        assert!(StoreError::busy("store busy").is_retryable());

        let constraint = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CONSTRAINT),
            None,
        );
        assert!(!StoreError::from(constraint).into_abort().is_retryable());
    }

    #[test]
    fn test_validation_message_lists_fields() {
        let err = StoreError::ValidationFailed(vec![
            ValidationError::new("properties", "title", "must not be empty"),
            ValidationError::new("properties", "current_price", "must be positive"),
        ]);
        let msg = err.to_string();
        assert!(msg.contains("title"));
        assert!(msg.contains("current_price"));
    }
}
