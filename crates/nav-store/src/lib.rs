//! `nav-store` — SQLite persistence for the waypath engine.
//!
//! One database file holds three tables:
//!
//! | Table         | Contents                                                    |
//! |---------------|-------------------------------------------------------------|
//! | `locations`   | id, display name, description, optional event               |
//! | `connections` | directed edges `(from_id, to_id) → cost`                    |
//! | `travelers`   | stamina, location, known set (JSON), journey (JSON), revision |
//!
//! [`SqliteStore`] implements both `LocationRepository` and
//! `TravelerRepository`.  The journey cursor is mirrored into its own column
//! so a commit is a single guarded `UPDATE`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use nav_store::SqliteStore;
//!
//! let store = Arc::new(SqliteStore::open(Path::new("world.db"))?);
//! store.import_locations(&locations)?;
//! let service = NavigationServiceBuilder::new(Arc::clone(&store), store).build()?;
//! ```

pub mod error;
pub mod sqlite;

#[cfg(test)]
mod tests;

pub use error::{StoreError, StoreResult};
pub use sqlite::SqliteStore;
