//! World graph representation and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing edges.
//! Given a `NodeId n`, its outgoing edges occupy the slice:
//!
//! ```text
//! edge_to[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! All edge arrays (`edge_from`, `edge_to`, `edge_cost`) are sorted by source
//! node and indexed by `EdgeId`.  Within one source the original insertion
//! order is kept, which is the tie-break order for both path algorithms.
//!
//! # Stable indices
//!
//! `NodeId`s are assigned by ascending `LocationId`, so the same location set
//! always produces the same indices no matter what order a repository returns
//! the documents in.

use rustc_hash::FxHashMap;

use nav_core::{Cost, EdgeId, LocationId, NodeId};

use crate::{GraphError, GraphResult, Location};

/// Largest cost a single connection may carry.
///
/// With fewer than `u32::MAX` nodes no simple path can sum past `u64::MAX`,
/// so the `UNREACHABLE` sentinel is never reached by a real route.
pub const MAX_EDGE_COST: i64 = u32::MAX as i64;

// ── WorldGraph ────────────────────────────────────────────────────────────────

/// Directed weighted location graph in CSR format.
///
/// All array fields are `pub` for direct indexed access on hot paths.  Do not
/// construct directly; use [`WorldGraphBuilder`] or [`WorldGraph::build`].
#[derive(Debug, Clone)]
pub struct WorldGraph {
    // ── Node data ─────────────────────────────────────────────────────────
    /// Persisted id of each node.  Indexed by `NodeId`.
    pub node_location: Vec<LocationId>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// CSR row pointer.  Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    // ── Edge data (indexed by EdgeId) ─────────────────────────────────────
    /// Source node of each edge.  Needed to walk `prev_edge` chains back to
    /// the source during route reconstruction.
    pub edge_from: Vec<NodeId>,

    pub edge_to: Vec<NodeId>,

    /// Stamina cost of each edge.
    pub edge_cost: Vec<Cost>,

    lookup: FxHashMap<LocationId, NodeId>,
}

impl WorldGraph {
    /// A graph with no locations.  Every query against it misses.
    pub fn empty() -> Self {
        Self {
            node_location:  Vec::new(),
            node_out_start: vec![0],
            edge_from:      Vec::new(),
            edge_to:        Vec::new(),
            edge_cost:      Vec::new(),
            lookup:         FxHashMap::default(),
        }
    }

    /// Build a graph from location documents and their connections.
    pub fn build(locations: &[Location]) -> GraphResult<Self> {
        let edge_hint = locations.iter().map(|l| l.connections.len()).sum();
        let mut b = WorldGraphBuilder::with_capacity(locations.len(), edge_hint);
        for loc in locations {
            b.add_location(loc.id.clone());
        }
        for loc in locations {
            for edge in loc.edges() {
                b.add_directed_edge(edge.from, edge.to, edge.cost);
            }
        }
        b.build()
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_location.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_location.is_empty()
    }

    // ── Id translation ────────────────────────────────────────────────────

    /// `NodeId` of a persisted location, if it is part of this graph.
    #[inline]
    pub fn node(&self, id: &LocationId) -> Option<NodeId> {
        self.lookup.get(id).copied()
    }

    /// Persisted id of `node`.
    ///
    /// # Panics
    /// Panics if `node` does not belong to this graph.
    #[inline]
    pub fn location_id(&self, node: NodeId) -> &LocationId {
        &self.node_location[node.index()]
    }

    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        node.index() < self.node_count()
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over the `EdgeId`s of all outgoing edges from `node`.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeId(i as u32))
    }

    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    /// Cost of the cheapest direct edge `from -> to`, if one exists.
    pub fn direct_cost(&self, from: NodeId, to: NodeId) -> Option<Cost> {
        if !self.contains(from) {
            return None;
        }
        self.out_edges(from)
            .filter(|e| self.edge_to[e.index()] == to)
            .map(|e| self.edge_cost[e.index()])
            .min()
    }
}

// ── WorldGraphBuilder ─────────────────────────────────────────────────────────

/// Construct a [`WorldGraph`] incrementally, then call [`build`](Self::build).
///
/// Locations and edges may be added in any order; validation happens in
/// `build()`, so a half-built graph is never observable.
///
/// # Example
///
/// ```
/// use nav_graph::WorldGraphBuilder;
///
/// let mut b = WorldGraphBuilder::new();
/// b.add_location("ford".into());
/// b.add_location("mill".into());
/// b.add_connection("ford".into(), "mill".into(), 3);
/// let graph = b.build().unwrap();
/// assert_eq!(graph.node_count(), 2);
/// assert_eq!(graph.edge_count(), 2); // both directions
/// ```
pub struct WorldGraphBuilder {
    locations: Vec<LocationId>,
    raw_edges: Vec<RawEdge>,
}

struct RawEdge {
    from: LocationId,
    to:   LocationId,
    cost: i64,
}

impl WorldGraphBuilder {
    pub fn new() -> Self {
        Self { locations: Vec::new(), raw_edges: Vec::new() }
    }

    pub fn with_capacity(locations: usize, edges: usize) -> Self {
        Self {
            locations: Vec::with_capacity(locations),
            raw_edges: Vec::with_capacity(edges),
        }
    }

    pub fn add_location(&mut self, id: LocationId) {
        self.locations.push(id);
    }

    /// Add a **directed** edge.  The cost is validated in `build()`.
    pub fn add_directed_edge(&mut self, from: LocationId, to: LocationId, cost: i64) {
        self.raw_edges.push(RawEdge { from, to, cost });
    }

    /// Convenience: add edges in **both directions** with equal cost.
    pub fn add_connection(&mut self, a: LocationId, b: LocationId, cost: i64) {
        self.add_directed_edge(a.clone(), b.clone(), cost);
        self.add_directed_edge(b, a, cost);
    }


    /// Validate and consume the builder.
    ///
    /// Fails on duplicate locations, self-loops, costs outside
    /// `0..=MAX_EDGE_COST`, and edges
    /// whose endpoints were never added.  Time complexity: O(N log N + E log E).
    pub fn build(self) -> GraphResult<WorldGraph> {
        let mut node_location = self.locations;
        node_location.sort_unstable();
        if let Some(dup) = node_location.windows(2).find(|w| w[0] == w[1]) {
            return Err(GraphError::DuplicateLocation(dup[0].clone()));
        }
        let node_count = node_location.len();
        if node_count >= u32::MAX as usize {
            return Err(GraphError::TooManyLocations(node_count));
        }

        let lookup: FxHashMap<LocationId, NodeId> = node_location
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), NodeId(i as u32)))
            .collect();

        let mut edges: Vec<(NodeId, NodeId, Cost)> = Vec::with_capacity(self.raw_edges.len());
        for raw in self.raw_edges {
            if raw.from == raw.to {
                return Err(GraphError::SelfLoop(raw.from));
            }
            if raw.cost < 0 {
                return Err(GraphError::NegativeCost { from: raw.from, to: raw.to, cost: raw.cost });
            }
            if raw.cost > MAX_EDGE_COST {
                return Err(GraphError::CostTooHigh { from: raw.from, to: raw.to, cost: raw.cost });
            }
            let from = *lookup.get(&raw.from).ok_or_else(|| GraphError::UnknownLocation(raw.from.clone()))?;
            let to   = *lookup.get(&raw.to).ok_or_else(|| GraphError::UnknownLocation(raw.to.clone()))?;
            edges.push((from, to, raw.cost as Cost));
        }

        // Stable sort: insertion order within a source is the tie-break order.
        edges.sort_by_key(|&(from, _, _)| from);

        let edge_from: Vec<NodeId> = edges.iter().map(|e| e.0).collect();
        let edge_to:   Vec<NodeId> = edges.iter().map(|e| e.1).collect();
        let edge_cost: Vec<Cost>   = edges.iter().map(|e| e.2).collect();

        let mut node_out_start = vec![0u32; node_count + 1];
        for &(from, _, _) in &edges {
            node_out_start[from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edges.len());

        Ok(WorldGraph {
            node_location,
            node_out_start,
            edge_from,
            edge_to,
            edge_cost,
            lookup,
        })
    }
}

impl Default for WorldGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
