//! `nav-core` — foundational types for the `waypath` navigation engine.
//!
//! This crate is a dependency of every other `nav-*` crate.  It intentionally
//! has no `nav-*` dependencies and minimal external ones (only `thiserror`,
//! plus optional `serde`).
//!
//! # What lives here
//!
//! | Module     | Contents                                                   |
//! |------------|------------------------------------------------------------|
//! | [`ids`]    | `NodeId`, `EdgeId` (graph indices), `LocationId`, `TravelerId` |
//! | [`config`] | `NavConfig`                                                |
//! | [`error`]  | `CoreError`, `RepositoryError`, result aliases            |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |
//!           | Required by the persisted journey/traveler records.        |

pub mod config;
pub mod error;
pub mod ids;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::NavConfig;
pub use error::{CoreError, CoreResult, RepoResult, RepositoryError};
pub use ids::{EdgeId, LocationId, NodeId, TravelerId};

/// Stamina and path costs share one unsigned unit so sums never need casts.
pub type Cost = u64;
