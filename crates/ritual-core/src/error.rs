//! Core error types for ritual-core.
//!
//! Validation rejections are the only errors surfaced to callers of the
//! domain stores; storage and delivery failures are absorbed at the call
//! site and logged (see the store modules).

use thiserror::Error;

/// Core error type for ritual-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the backing store
    #[error("Failed to open store at {path}: {message}")]
    OpenFailed { path: String, message: String },

    /// A write to the backing store failed
    #[error("Write failed for key '{key}': {message}")]
    WriteFailed { key: String, message: String },
}

/// Validation errors.
///
/// Raised synchronously before any state change; a rejected operation
/// leaves the store untouched.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Commitment title must not be empty
    #[error("Commitment title must not be empty")]
    EmptyTitle,

    /// A concrete category must be chosen at creation
    #[error("A category must be chosen before creating a commitment")]
    CategoryNotChosen,

    /// Identity statement exceeds the allowed length
    #[error("Identity statement exceeds {max} characters (got {len})")]
    IdentityStatementTooLong { len: usize, max: usize },

    /// Journal text is blank after trimming
    #[error("Journal text must not be blank")]
    BlankJournalText,
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
