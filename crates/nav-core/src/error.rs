//! Shared error types.
//!
//! Sub-crates define their own error enums and wrap these as one variant.
//! `RepositoryError` is the common currency of every persistence port so
//! that adapters (in-memory, SQLite) can be swapped without touching callers.

use thiserror::Error;

use crate::{LocationId, TravelerId};

/// A rejected [`NavConfig`](crate::NavConfig).
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Failure reported by a location or traveler repository.
///
/// A lost compare-and-set is **not** an error; repositories report it through
/// their commit outcome instead.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("traveler {0} not found")]
    TravelerNotFound(TravelerId),

    #[error("location {0} not found")]
    LocationNotFound(LocationId),

    #[error("traveler {0} already exists")]
    DuplicateTraveler(TravelerId),

    #[error("stored record is malformed: {0}")]
    Corrupt(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

pub type RepoResult<T> = Result<T, RepositoryError>;
