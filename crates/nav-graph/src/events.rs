//! Scripted-encounter lookup.
//!
//! Two pieces cooperate:
//!
//! - [`EventFlags`] lives in the snapshot and answers "does this location
//!   have an event at all?" with one indexed load.
//! - [`EventLookup`] yields the full [`EventDescriptor`].  [`EventTable`] is
//!   the in-memory implementation; callers typically fill one with
//!   descriptors fetched for the flagged locations of a single journey.

use rustc_hash::FxHashMap;

use nav_core::{LocationId, NodeId};

use crate::{EventDescriptor, Location, WorldGraph};

/// Source of event descriptors by location.
pub trait EventLookup {
    fn event_at(&self, location: &LocationId) -> Option<&EventDescriptor>;
}

/// Map-backed [`EventLookup`].
#[derive(Debug, Clone, Default)]
pub struct EventTable {
    events: FxHashMap<LocationId, EventDescriptor>,
}

impl EventTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table holding the event of every location that has one.
    pub fn from_locations(locations: &[Location]) -> Self {
        let events = locations
            .iter()
            .filter_map(|l| l.event.clone().map(|e| (l.id.clone(), e)))
            .collect();
        Self { events }
    }

    pub fn insert(&mut self, location: LocationId, event: EventDescriptor) {
        self.events.insert(location, event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventLookup for EventTable {
    fn event_at(&self, location: &LocationId) -> Option<&EventDescriptor> {
        self.events.get(location)
    }
}

/// Per-node "has an event" bitmap, indexed by `NodeId`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFlags {
    flags: Vec<bool>,
}

impl EventFlags {
    pub fn build(graph: &WorldGraph, locations: &[Location]) -> Self {
        let mut flags = vec![false; graph.node_count()];
        for loc in locations.iter().filter(|l| l.has_event()) {
            if let Some(node) = graph.node(&loc.id) {
                flags[node.index()] = true;
            }
        }
        Self { flags }
    }

    #[inline]
    pub fn has_event(&self, node: NodeId) -> bool {
        self.flags.get(node.index()).copied().unwrap_or(false)
    }

    pub fn flagged_count(&self) -> usize {
        self.flags.iter().filter(|&&f| f).count()
    }
}
