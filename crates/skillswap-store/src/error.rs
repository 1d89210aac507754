//! Error types for the skillswap-store crate.
//!
//! All storage operations return [`StoreError`] via [`StoreResult`].
//! Uses `thiserror` for ergonomic, zero-cost error definitions.

use std::path::PathBuf;

use thiserror::Error;

/// Alias for `Result<T, StoreError>`.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in the user/skill store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A durable operation was attempted before a data path was bound.
    #[error("no data path bound; call set_data_path first")]
    NoDataPath,

    /// The persistence target cannot be written or created.
    #[error("invalid data path {}: {reason}", .path.display())]
    InvalidPath { path: PathBuf, reason: String },

    /// The referenced user is not registered in the store.
    #[error("user not found: {id}")]
    UserNotFound { id: String },

    /// The persisted document is not well-formed JSON or has the wrong shape.
    #[error("malformed store document: {0}")]
    Parse(#[source] serde_json::Error),

    /// The in-memory collection could not be rendered as JSON.
    #[error("failed to serialize store: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Reading, writing, or renaming the data file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A thread panicked while holding the store lock.
    #[error("store lock poisoned")]
    LockPoisoned,
}

impl From<tempfile::PersistError> for StoreError {
    fn from(err: tempfile::PersistError) -> Self {
        Self::Io(err.error)
    }
}
