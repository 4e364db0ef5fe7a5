//! Immutable world snapshots and the cell they are swapped through.
//!
//! A [`WorldSnapshot`] bundles everything movement needs to read (graph and
//! path index plus event flags and display names), built in one go from the
//! persisted location set.  It is never mutated after construction.
//!
//! [`SnapshotCell`] holds the currently installed snapshot behind an `Arc`.
//! Readers clone the `Arc` and keep using that snapshot for the whole
//! request; an install swaps the pointer, so a reader sees either the fully
//! old or the fully new world, never a mix.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use tracing::info;

use nav_core::{Cost, LocationId};

use crate::{EventFlags, GraphResult, Location, PathFinder, PathIndex, WorldGraph};

// ── PlannedRoute / PathLookup ─────────────────────────────────────────────────

/// A path expressed in persisted location ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedRoute {
    /// Origin first, destination last.
    pub path: Vec<LocationId>,
    pub cost: Cost,
}

/// Read access to precomputed shortest paths, keyed by persisted ids.
///
/// This is the seam the movement machine plans and prices journeys through.
pub trait PathLookup: Send + Sync {
    /// Cheapest cost `from -> to`, or `None` if unreachable or unknown.
    fn path_cost(&self, from: &LocationId, to: &LocationId) -> Option<Cost>;

    /// Cheapest path `from -> to`, or `None` if unreachable or unknown.
    fn plan(&self, from: &LocationId, to: &LocationId) -> Option<PlannedRoute>;
}

// ── WorldSnapshot ─────────────────────────────────────────────────────────────

/// One consistent, read-only view of the world.
#[derive(Debug)]
pub struct WorldSnapshot {
    generation:   u64,
    graph:        WorldGraph,
    index:        PathIndex,
    event_flags:  EventFlags,
    /// Display name per node, indexed by `NodeId`.
    names:        Vec<String>,
}

impl WorldSnapshot {
    /// A snapshot of an empty world (generation 0).
    pub fn empty() -> Self {
        Self {
            generation:  0,
            graph:       WorldGraph::empty(),
            index:       PathIndex::empty(),
            event_flags: EventFlags::default(),
            names:       Vec::new(),
        }
    }

    /// Build graph, index, and lookup tables from the full location set.
    ///
    /// Runs to completion on the calling thread (plus Rayon workers with the
    /// `parallel` feature).  The generation is assigned on install.
    pub fn build(locations: &[Location], parallel_min_nodes: usize) -> GraphResult<Self> {
        let started = Instant::now();

        let graph       = WorldGraph::build(locations)?;
        let index       = PathIndex::build_with(&graph, parallel_min_nodes);
        let event_flags = EventFlags::build(&graph, locations);

        let mut names = vec![String::new(); graph.node_count()];
        for loc in locations {
            if let Some(node) = graph.node(&loc.id) {
                names[node.index()] = loc.name.clone();
            }
        }

        info!(
            locations = graph.node_count(),
            edges     = graph.edge_count(),
            events    = event_flags.flagged_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "built world snapshot"
        );

        Ok(Self { generation: 0, graph, index, event_flags, names })
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn graph(&self) -> &WorldGraph {
        &self.graph
    }

    pub fn index(&self) -> &PathIndex {
        &self.index
    }

    pub fn contains(&self, id: &LocationId) -> bool {
        self.graph.node(id).is_some()
    }

    pub fn display_name(&self, id: &LocationId) -> Option<&str> {
        self.graph.node(id).map(|n| self.names[n.index()].as_str())
    }

    /// Whether `id` carries a scripted event (descriptor not included).
    pub fn has_event(&self, id: &LocationId) -> bool {
        self.graph.node(id).is_some_and(|n| self.event_flags.has_event(n))
    }

    /// Cost of the direct connection `from -> to`, ignoring longer paths.
    pub fn direct_cost(&self, from: &LocationId, to: &LocationId) -> Option<Cost> {
        self.graph.direct_cost(self.graph.node(from)?, self.graph.node(to)?)
    }

    /// Run `finder` against this snapshot's graph instead of the index.
    pub fn find_path_uncached<P: PathFinder>(
        &self,
        finder: &P,
        from:   &LocationId,
        to:     &LocationId,
    ) -> GraphResult<PlannedRoute> {
        let src = self.graph.node(from).ok_or_else(|| crate::GraphError::UnknownLocation(from.clone()))?;
        let dst = self.graph.node(to).ok_or_else(|| crate::GraphError::UnknownLocation(to.clone()))?;
        let route = finder.find_path(&self.graph, src, dst)?;
        Ok(PlannedRoute {
            path: route.nodes.iter().map(|&n| self.graph.location_id(n).clone()).collect(),
            cost: route.cost,
        })
    }
}

impl PathLookup for WorldSnapshot {
    fn path_cost(&self, from: &LocationId, to: &LocationId) -> Option<Cost> {
        self.index.cost(self.graph.node(from)?, self.graph.node(to)?)
    }

    fn plan(&self, from: &LocationId, to: &LocationId) -> Option<PlannedRoute> {
        let entry = self.index.entry(self.graph.node(from)?, self.graph.node(to)?)?;
        Some(PlannedRoute {
            path: entry.path.iter().map(|&n| self.graph.location_id(n).clone()).collect(),
            cost: entry.cost,
        })
    }
}

// ── SnapshotCell ──────────────────────────────────────────────────────────────

/// Holder of the currently installed [`WorldSnapshot`].
///
/// The lock only guards the pointer swap; no snapshot work happens under it.
pub struct SnapshotCell {
    current: RwLock<Arc<WorldSnapshot>>,
}

impl SnapshotCell {
    pub fn new(initial: WorldSnapshot) -> Self {
        Self { current: RwLock::new(Arc::new(initial)) }
    }

    /// The snapshot in force right now.
    pub fn load(&self) -> Arc<WorldSnapshot> {
        Arc::clone(&self.current.read())
    }

    /// Install a freshly built snapshot, stamping it with the next generation.
    pub fn install(&self, mut snapshot: WorldSnapshot) -> Arc<WorldSnapshot> {
        let mut slot = self.current.write();
        snapshot.generation = slot.generation + 1;
        let installed = Arc::new(snapshot);
        *slot = Arc::clone(&installed);
        drop(slot);

        info!(
            generation = installed.generation,
            locations  = installed.graph.node_count(),
            "installed world snapshot"
        );
        installed
    }
}

impl Default for SnapshotCell {
    fn default() -> Self {
        Self::new(WorldSnapshot::empty())
    }
}
