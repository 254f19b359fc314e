//! # Error Types
//!
//! The single error enum for the domain layer.
//!
//! Validation failures carry field-tagged messages so the HTTP layer can
//! return them the way the original API did (an `errors` array alongside
//! the failure envelope).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single validation failure, tagged with the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the input field that failed validation.
    pub field: String,
    /// Human-readable message.
    pub message: String,
}

impl FieldError {
    /// Create a new field error.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors produced by the domain layer.
#[derive(Debug, Error)]
pub enum CoreError {
    /// One or more inputs failed validation.
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    /// The named resource does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Registration attempted with an email that is already taken.
    #[error("an account with this email already exists")]
    DuplicateEmail,

    /// Login with an unknown email or wrong password.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Missing, malformed, or expired bearer token.
    #[error("authentication required")]
    Unauthorized,

    /// The caller is authenticated but does not own the resource.
    #[error("not authorized to modify this resource")]
    Forbidden,

    /// A store lock was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    Poisoned,

    #[error("database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("codec error: {0}")]
    Codec(#[from] postcard::Error),
}

impl CoreError {
    /// Shorthand for a single-field validation error.
    #[must_use]
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn invalid_wraps_single_field() {
        let err = CoreError::invalid("text", "Post cannot exceed 500 characters");
        match err {
            CoreError::Validation(fields) => {
                assert_eq!(fields.len(), 1);
                assert_eq!(fields[0].field, "text");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn display_messages_are_stable() {
        assert_eq!(
            CoreError::NotFound("post").to_string(),
            "post not found"
        );
        assert_eq!(
            CoreError::InvalidCredentials.to_string(),
            "invalid email or password"
        );
    }
}
