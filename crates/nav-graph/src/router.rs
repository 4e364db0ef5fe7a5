//! Single-source path finding trait and default Dijkstra implementation.
//!
//! # Pluggability
//!
//! Ad hoc queries go through the [`PathFinder`] trait, so applications can
//! swap in A* or a bounded search without touching the snapshot.  The movement
//! hot path never calls this; it reads the precomputed [`PathIndex`].
//!
//! [`PathIndex`]: crate::PathIndex

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use nav_core::{Cost, EdgeId, NodeId};

use crate::network::WorldGraph;
use crate::GraphError;

// ── Route ─────────────────────────────────────────────────────────────────────

/// The result of a path query: the node sequence and its total cost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Nodes from source to target, both inclusive.
    pub nodes: Vec<NodeId>,
    pub cost:  Cost,
}

impl Route {
    /// `true` if the source and destination are the same node.
    pub fn is_trivial(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Number of edges traversed.
    pub fn hop_count(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }
}

// ── PathFinder trait ──────────────────────────────────────────────────────────

/// Pluggable single-source path finder.
///
/// Implementations must be `Send + Sync` so one instance can serve every
/// request worker.
pub trait PathFinder: Send + Sync {
    /// Cheapest path from `from` to `to`.
    ///
    /// `from == to` yields a trivial route of cost 0 rather than an error.
    fn find_path(&self, graph: &WorldGraph, from: NodeId, to: NodeId) -> Result<Route, GraphError>;
}

// ── DijkstraPathFinder ────────────────────────────────────────────────────────

/// Standard Dijkstra over the CSR graph using a binary heap.
///
/// Edge costs are non-negative by construction (`WorldGraphBuilder` rejects
/// negative ones).  Relaxation uses strict `<`, so the first edge to reach a
/// node at a given cost keeps it; with the heap ordered by `(cost, NodeId)`
/// the result is deterministic for a fixed graph.
pub struct DijkstraPathFinder;

impl PathFinder for DijkstraPathFinder {
    fn find_path(&self, graph: &WorldGraph, from: NodeId, to: NodeId) -> Result<Route, GraphError> {
        dijkstra(graph, from, to)
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

fn dijkstra(graph: &WorldGraph, from: NodeId, to: NodeId) -> Result<Route, GraphError> {
    for node in [from, to] {
        if !graph.contains(node) {
            return Err(GraphError::NodeNotFound(node));
        }
    }
    if from == to {
        return Ok(Route { nodes: vec![from], cost: 0 });
    }

    let n = graph.node_count();
    // dist[v] = best known cost to reach v.
    let mut dist      = vec![Cost::MAX; n];
    // prev_edge[v] = EdgeId that reached v; EdgeId::INVALID for unreached nodes.
    let mut prev_edge = vec![EdgeId::INVALID; n];

    dist[from.index()] = 0;

    // Min-heap: (cost, node). Reverse makes BinaryHeap (max) behave as min-heap.
    let mut heap: BinaryHeap<Reverse<(Cost, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((0, from)));

    while let Some(Reverse((cost, node))) = heap.pop() {
        if node == to {
            return Ok(reconstruct(graph, &prev_edge, from, to, cost));
        }

        // Skip stale heap entries.
        if cost > dist[node.index()] {
            continue;
        }

        for edge in graph.out_edges(node) {
            let neighbor = graph.edge_to[edge.index()];
            let new_cost = cost.saturating_add(graph.edge_cost[edge.index()]);

            if new_cost < dist[neighbor.index()] {
                dist[neighbor.index()]      = new_cost;
                prev_edge[neighbor.index()] = edge;
                heap.push(Reverse((new_cost, neighbor)));
            }
        }
    }

    Err(GraphError::NoRoute { from, to })
}

fn reconstruct(
    graph:     &WorldGraph,
    prev_edge: &[EdgeId],
    from:      NodeId,
    to:        NodeId,
    cost:      Cost,
) -> Route {
    let mut nodes = vec![to];
    let mut cur   = to;
    while cur != from {
        let e = prev_edge[cur.index()];
        if e == EdgeId::INVALID {
            break;
        }
        cur = graph.edge_from[e.index()];
        nodes.push(cur);
    }
    nodes.reverse();
    Route { nodes, cost }
}
