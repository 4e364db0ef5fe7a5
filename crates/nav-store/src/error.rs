//! Error types for nav-store.

use thiserror::Error;

use nav_core::RepositoryError;

/// Errors raised by the SQLite backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON column error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Alias for `Result<T, StoreError>`.
pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for RepositoryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Json(e) => RepositoryError::Corrupt(e.to_string()),
            StoreError::Sqlite(e) => RepositoryError::Backend(e.to_string()),
        }
    }
}
