//! `nav-service` — the navigation engine's request surface.
//!
//! # Request flow
//!
//! ```text
//! request_move(traveler, dest)    → validate known destination, plan,
//!                                   commit journey at cursor 0 → MoveTicket
//! continue_move(traveler)         → journey paused on an event? → MoveTicket
//! execute(ticket)                 → load, prefetch events on the remaining
//!                                   path, advance one bounded step,
//!                                   compare-and-set commit, notify
//! stop_move(traveler)             → clear journey (idempotent), notify
//! set_connection(a, b, cost)      → upsert a↔b, rebuild, swap snapshot
//! ```
//!
//! # Crate layout
//!
//! | Module          | Contents                                                        |
//! |-----------------|-----------------------------------------------------------------|
//! | [`service`]     | `NavigationService`, `MoveTicket`, `StopOutcome`, `Destination` |
//! | [`builder`]     | `NavigationServiceBuilder`                                      |
//! | [`connections`] | `ConnectionMutationService` — edge upserts and rebuilds         |
//! | [`ports`]       | `LocationRepository` port, `MemoryLocationStore`                |
//! | [`notify`]      | `NotificationSink`, `NoopSink`, `RecordingSink`                 |
//! | [`error`]       | `NavError`, `NavResult<T>`                                      |
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                  |
//! |------------|---------------------------------------------------------|
//! | `parallel` | Builds large path indexes on Rayon's thread pool.       |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use nav_movement::MemoryTravelerStore;
//! use nav_service::{MemoryLocationStore, NavigationServiceBuilder};
//!
//! let locations = Arc::new(MemoryLocationStore::from_locations(world));
//! let service   = NavigationServiceBuilder::new(MemoryTravelerStore::new(), locations)
//!     .build()?;
//! service.register_traveler("t1", "Ash", "harbor")?;
//! ```

pub mod builder;
pub mod connections;
pub mod error;
pub mod notify;
pub mod ports;
pub mod service;


pub use builder::NavigationServiceBuilder;
pub use connections::ConnectionMutationService;
pub use error::{NavError, NavResult};
pub use notify::{
    MoveAction, NoopSink, Notification, NotificationSink, NotifyError, RecordingSink,
    TravelerContext, CONTINUE_STOP,
};
pub use ports::{LocationRepository, MemoryLocationStore};
pub use service::{Destination, MoveTicket, NavigationService, StopOutcome};
