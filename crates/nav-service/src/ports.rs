//! The location repository port and its in-memory implementation.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use nav_core::{LocationId, RepoResult, RepositoryError};
use nav_graph::{EdgeRecord, EventDescriptor, Location};

/// Persistence for location documents and their connections.
pub trait LocationRepository: Send + Sync {
    /// Every location, connections included.  Input to a snapshot rebuild.
    fn locations(&self) -> RepoResult<Vec<Location>>;

    fn location(&self, id: &LocationId) -> RepoResult<Option<Location>>;

    /// The event attached to `id`, if any.
    fn event_descriptor(&self, id: &LocationId) -> RepoResult<Option<EventDescriptor>>;

    /// Insert or overwrite a batch of directed edges, all or nothing.
    ///
    /// Fails with `LocationNotFound` (and writes nothing) if any endpoint is
    /// unknown.
    fn upsert_edges(&self, edges: &[EdgeRecord]) -> RepoResult<()>;
}

impl<T: LocationRepository + ?Sized> LocationRepository for Arc<T> {
    fn locations(&self) -> RepoResult<Vec<Location>> {
        (**self).locations()
    }

    fn location(&self, id: &LocationId) -> RepoResult<Option<Location>> {
        (**self).location(id)
    }

    fn event_descriptor(&self, id: &LocationId) -> RepoResult<Option<EventDescriptor>> {
        (**self).event_descriptor(id)
    }

    fn upsert_edges(&self, edges: &[EdgeRecord]) -> RepoResult<()> {
        (**self).upsert_edges(edges)
    }
}

// ── MemoryLocationStore ───────────────────────────────────────────────────────

/// Ordered in-memory [`LocationRepository`].
#[derive(Debug, Default)]
pub struct MemoryLocationStore {
    locations: RwLock<BTreeMap<LocationId, Location>>,
}

impl MemoryLocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with `locations`; a later duplicate id replaces an earlier one.
    pub fn from_locations(locations: impl IntoIterator<Item = Location>) -> Self {
        let map = locations.into_iter().map(|l| (l.id.clone(), l)).collect();
        Self { locations: RwLock::new(map) }
    }

    /// Insert or replace one location document.
    pub fn put(&self, location: Location) {
        self.locations.write().insert(location.id.clone(), location);
    }

    pub fn len(&self) -> usize {
        self.locations.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LocationRepository for MemoryLocationStore {
    fn locations(&self) -> RepoResult<Vec<Location>> {
        Ok(self.locations.read().values().cloned().collect())
    }

    fn location(&self, id: &LocationId) -> RepoResult<Option<Location>> {
        Ok(self.locations.read().get(id).cloned())
    }

    fn event_descriptor(&self, id: &LocationId) -> RepoResult<Option<EventDescriptor>> {
        Ok(self.locations.read().get(id).and_then(|l| l.event.clone()))
    }

    fn upsert_edges(&self, edges: &[EdgeRecord]) -> RepoResult<()> {
        let mut locations = self.locations.write();
        for edge in edges {
            for end in [&edge.from, &edge.to] {
                if !locations.contains_key(end) {
                    return Err(RepositoryError::LocationNotFound(end.clone()));
                }
            }
        }
        for edge in edges {
            if let Some(loc) = locations.get_mut(&edge.from) {
                loc.upsert_connection(edge.to.clone(), edge.cost);
            }
        }
        Ok(())
    }
}
