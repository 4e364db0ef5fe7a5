//! All-pairs shortest-path index (Floyd–Warshall with next-hop matrix).
//!
//! # Data layout
//!
//! Two flat `n × n` row-major tables indexed by `from * n + to`:
//!
//! - `dist` — cheapest known cost, [`UNREACHABLE`] when no path exists.
//! - `next` — first hop after `from` on the cheapest path, `NodeId::INVALID`
//!   when unreachable.
//!
//! The sentinel never leaves this module: every accessor returns `Option`, so
//! reachability is explicit for callers.
//!
//! # Determinism
//!
//! Relaxation uses strict `<`, so among equal-cost paths the first one found
//! is kept.  Edges seed the tables in CSR order (cheapest duplicate wins, ties
//! by insertion order).  For a fixed graph the tables are therefore
//! bit-identical across builds, including the `parallel` build: row `k` is
//! never modified while pivoting on `k`, so rows can be relaxed independently.

use nav_core::{Cost, NodeId};

use crate::WorldGraph;

/// Internal "no path" marker in the `dist` table.
const UNREACHABLE: Cost = Cost::MAX;

/// A reconstructed index entry for one ordered pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathEntry {
    pub cost: Cost,
    /// Nodes from source to target, both inclusive.
    pub path: Vec<NodeId>,
}

/// Precomputed cheapest cost and next hop between every ordered node pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathIndex {
    n:    usize,
    dist: Vec<Cost>,
    next: Vec<NodeId>,
}

impl PathIndex {
    /// Index over an empty graph.
    pub fn empty() -> Self {
        Self { n: 0, dist: Vec::new(), next: Vec::new() }
    }

    /// Sequential Floyd–Warshall.  O(N³) time, O(N²) memory.
    pub fn build(graph: &WorldGraph) -> Self {
        let n = graph.node_count();
        let (mut dist, mut next) = seed(graph);

        let mut pivot = vec![UNREACHABLE; n];
        for k in 0..n {
            pivot.copy_from_slice(&dist[k * n..(k + 1) * n]);
            for (dist_row, next_row) in dist.chunks_mut(n).zip(next.chunks_mut(n)) {
                relax_row(k, &pivot, dist_row, next_row);
            }
        }

        Self { n, dist, next }
    }

    /// Floyd–Warshall with each pivot's row relaxation spread over Rayon's
    /// pool.  Produces exactly the same tables as [`build`](Self::build).
    #[cfg(feature = "parallel")]
    pub fn build_parallel(graph: &WorldGraph) -> Self {
        use rayon::prelude::*;

        let n = graph.node_count();
        let (mut dist, mut next) = seed(graph);

        let mut pivot = vec![UNREACHABLE; n];
        for k in 0..n {
            pivot.copy_from_slice(&dist[k * n..(k + 1) * n]);
            dist.par_chunks_mut(n)
                .zip(next.par_chunks_mut(n))
                .for_each(|(dist_row, next_row)| relax_row(k, &pivot, dist_row, next_row));
        }

        Self { n, dist, next }
    }

    /// Pick the sequential or parallel build by graph size.
    ///
    /// Without the `parallel` feature this is always the sequential build.
    pub fn build_with(graph: &WorldGraph, parallel_min_nodes: usize) -> Self {
        #[cfg(feature = "parallel")]
        if graph.node_count() >= parallel_min_nodes {
            return Self::build_parallel(graph);
        }
        #[cfg(not(feature = "parallel"))]
        let _ = parallel_min_nodes;
        Self::build(graph)
    }

    pub fn node_count(&self) -> usize {
        self.n
    }

    #[inline]
    fn slot(&self, from: NodeId, to: NodeId) -> Option<usize> {
        (from.index() < self.n && to.index() < self.n).then(|| from.index() * self.n + to.index())
    }

    /// Cheapest cost `from -> to`, or `None` if unreachable.
    #[inline]
    pub fn cost(&self, from: NodeId, to: NodeId) -> Option<Cost> {
        let d = self.dist[self.slot(from, to)?];
        (d != UNREACHABLE).then_some(d)
    }

    #[inline]
    pub fn is_reachable(&self, from: NodeId, to: NodeId) -> bool {
        self.cost(from, to).is_some()
    }

    /// First hop after `from` on the cheapest path to `to`.
    #[inline]
    pub fn next_hop(&self, from: NodeId, to: NodeId) -> Option<NodeId> {
        let hop = self.next[self.slot(from, to)?];
        (hop != NodeId::INVALID).then_some(hop)
    }

    /// Reconstruct the cheapest path by following next hops.  O(path length).
    ///
    /// Returns `None` if `to` is unreachable.  A next-hop chain longer than
    /// the node count would mean a corrupt table and also yields `None`.
    pub fn path(&self, from: NodeId, to: NodeId) -> Option<Vec<NodeId>> {
        self.cost(from, to)?;
        let mut path = vec![from];
        let mut cur  = from;
        while cur != to {
            cur = self.next_hop(cur, to)?;
            path.push(cur);
            if path.len() > self.n {
                return None;
            }
        }
        Some(path)
    }

    pub fn entry(&self, from: NodeId, to: NodeId) -> Option<PathEntry> {
        Some(PathEntry { cost: self.cost(from, to)?, path: self.path(from, to)? })
    }

    /// Every node reachable from `from`, in `NodeId` order (includes `from`).
    pub fn reachable_from(&self, from: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let n = if from.index() < self.n { self.n } else { 0 };
        (0..n)
            .map(|j| NodeId(j as u32))
            .filter(move |&to| self.is_reachable(from, to))
    }
}

// ── Floyd–Warshall internals ──────────────────────────────────────────────────

/// Initial tables: zero diagonal plus one entry per direct edge.
fn seed(graph: &WorldGraph) -> (Vec<Cost>, Vec<NodeId>) {
    let n = graph.node_count();
    let mut dist = vec![UNREACHABLE; n * n];
    let mut next = vec![NodeId::INVALID; n * n];

    for i in 0..n {
        dist[i * n + i] = 0;
        next[i * n + i] = NodeId(i as u32);
    }
    for e in 0..graph.edge_count() {
        let from = graph.edge_from[e].index();
        let to   = graph.edge_to[e];
        let cost = graph.edge_cost[e];
        let slot = from * n + to.index();
        if cost < dist[slot] {
            dist[slot] = cost;
            next[slot] = to;
        }
    }
    (dist, next)
}

/// Relax one row against pivot `k`.  `pivot` is a copy of row `k`.
#[inline]
fn relax_row(k: usize, pivot: &[Cost], dist_row: &mut [Cost], next_row: &mut [NodeId]) {
    let via = dist_row[k];
    if via == UNREACHABLE {
        return;
    }
    let hop = next_row[k];
    for (j, &tail) in pivot.iter().enumerate() {
        if tail == UNREACHABLE {
            continue;
        }
        let candidate = via.saturating_add(tail);
        if candidate < dist_row[j] {
            dist_row[j] = candidate;
            next_row[j] = hop;
        }
    }
}
