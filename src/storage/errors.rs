//! Storage layer error types
//!
//! All errors that can occur during storage operations are defined here
//! We use `thiserror` for ergonomic error definition and better error messages

use std::path::PathBuf;

use thiserror::Error;

use crate::storage::object::ObjectKind;
use crate::storage::types::InvalidNameError;

/// the main error type for storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// repo is not initialized
    #[error("repository not initialized: {0}")]
    NotInitialized(PathBuf),

    /// no object is stored under the fingerprint
    #[error("object not found: {0}")]
    ObjectNotFound(String),

    /// the stored object is of a different kind than requested
    #[error("object {id} is a {found}, expected a {expected}")]
    TypeMismatch {
        id: String,
        expected: ObjectKind,
        found: ObjectKind,
    },

    /// data integrity check failed
    #[error("corrupted data at {path}: {reason}")]
    CorruptedData { path: PathBuf, reason: String },

    /// the requested branch/ref was not found
    #[error("ref not found: {0}")]
    RefNotFound(String),

    /// branch already exists
    #[error("branch already exists: {0}")]
    BranchAlreadyExists(String),

    /// a ref or object file held something that is not a fingerprint
    #[error("invalid fingerprint '{value}': {source}")]
    InvalidFingerprint {
        value: String,
        #[source]
        source: hex::FromHexError,
    },

    /// invalid file or branch name
    #[error("invalid name: {0}")]
    InvalidName(#[from] InvalidNameError),

    /// JSON serialization or deserialization failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// atomic rename of a temporary file failed
    #[error("failed to persist {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error (filesystem level)
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// check if this error means the repository contents are damaged
    pub fn is_integrity_error(&self) -> bool {
        matches!(
            self,
            StorageError::TypeMismatch { .. }
                | StorageError::CorruptedData { .. }
                | StorageError::InvalidFingerprint { .. }
        )
    }
}

/// result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
