//! Fluent builder for constructing a [`NavigationService`].

use std::sync::Arc;

use nav_core::NavConfig;
use nav_graph::SnapshotCell;
use nav_movement::TravelerRepository;

use crate::{
    ConnectionMutationService, LocationRepository, NavResult, NavigationService, NoopSink,
    NotificationSink,
};

/// Fluent builder for [`NavigationService<T, L, N>`].
///
/// # Required inputs
///
/// - `T: TravelerRepository` — traveler persistence
/// - `Arc<L>` with `L: LocationRepository` — location persistence, shared
///   with the connection service
///
/// # Optional inputs (have defaults)
///
/// | Method              | Default                  |
/// |---------------------|--------------------------|
/// | `.config(c)`        | `NavConfig::default()`   |
/// | `.sink(n)`          | `NoopSink`               |
/// | `.snapshot_cell(c)` | a fresh `SnapshotCell`   |
///
/// # Example
///
/// ```rust,ignore
/// let service = NavigationServiceBuilder::new(MemoryTravelerStore::new(), locations)
///     .config(config)
///     .sink(RecordingSink::new())
///     .build()?;
/// let ticket = service.request_move(&traveler, &destination)?;
/// service.execute(&ticket)?;
/// ```
pub struct NavigationServiceBuilder<T, L, N = NoopSink>
where
    T: TravelerRepository,
    L: LocationRepository,
    N: NotificationSink,
{
    config:    NavConfig,
    travelers: T,
    locations: Arc<L>,
    sink:      N,
    cell:      Option<Arc<SnapshotCell>>,
}

impl<T, L> NavigationServiceBuilder<T, L, NoopSink>
where
    T: TravelerRepository,
    L: LocationRepository,
{
    /// Create a builder with all required inputs.
    pub fn new(travelers: T, locations: Arc<L>) -> Self {
        Self {
            config: NavConfig::default(),
            travelers,
            locations,
            sink:   NoopSink,
            cell:   None,
        }
    }
}

impl<T, L, N> NavigationServiceBuilder<T, L, N>
where
    T: TravelerRepository,
    L: LocationRepository,
    N: NotificationSink,
{
    pub fn config(mut self, config: NavConfig) -> Self {
        self.config = config;
        self
    }

    /// Deliver movement results through `sink`.
    pub fn sink<S: NotificationSink>(self, sink: S) -> NavigationServiceBuilder<T, L, S> {
        NavigationServiceBuilder {
            config:    self.config,
            travelers: self.travelers,
            locations: self.locations,
            sink,
            cell:      self.cell,
        }
    }

    /// Install snapshots into an existing cell, e.g. one shared with other
    /// readers.
    pub fn snapshot_cell(mut self, cell: Arc<SnapshotCell>) -> Self {
        self.cell = Some(cell);
        self
    }

    /// Validate the configuration, perform the initial world load, and return
    /// a ready service.
    ///
    /// Fails if the persisted world cannot be built (negative cost, dangling
    /// connection, …).
    pub fn build(self) -> NavResult<NavigationService<T, L, N>> {
        self.config.validate()?;

        let cell        = self.cell.unwrap_or_default();
        let connections = ConnectionMutationService::new(Arc::clone(&self.locations), cell, &self.config);
        connections.rebuild()?;

        Ok(NavigationService {
            config:      self.config,
            travelers:   self.travelers,
            locations:   self.locations,
            sink:        self.sink,
            connections,
        })
    }
}
