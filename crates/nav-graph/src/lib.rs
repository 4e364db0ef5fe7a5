//! `nav-graph` — world graph, path index, and routing.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                       |
//! |--------------|----------------------------------------------------------------|
//! | [`location`] | `Location`, `Connection`, `EdgeRecord`, `EventDescriptor`      |
//! | [`network`]  | `WorldGraph` (CSR), `WorldGraphBuilder`                        |
//! | [`index`]    | `PathIndex` — Floyd–Warshall cost + next-hop tables            |
//! | [`router`]   | `PathFinder` trait, `Route`, `DijkstraPathFinder`              |
//! | [`events`]   | `EventLookup` trait, `EventTable`, `EventFlags`                |
//! | [`snapshot`] | `WorldSnapshot`, `SnapshotCell`, `PathLookup`, `PlannedRoute`  |
//! | [`loader`]   | CSV world loading                                              |
//! | [`error`]    | `GraphError`, `GraphResult<T>`                                 |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                       |
//! |------------|--------------------------------------------------------------|
//! | `parallel` | Builds `PathIndex` rows on Rayon's pool for large worlds.    |

pub mod error;
pub mod events;
pub mod index;
pub mod loader;
pub mod location;
pub mod network;
pub mod router;
pub mod snapshot;

#[cfg(test)]
mod tests;

pub use error::{GraphError, GraphResult};
pub use events::{EventFlags, EventLookup, EventTable};
pub use index::{PathEntry, PathIndex};
pub use loader::{load_world_csv, load_world_reader};
pub use location::{Connection, EdgeRecord, EventDescriptor, Location};
pub use network::{MAX_EDGE_COST, WorldGraph, WorldGraphBuilder};
pub use router::{DijkstraPathFinder, PathFinder, Route};
pub use snapshot::{PathLookup, PlannedRoute, SnapshotCell, WorldSnapshot};
