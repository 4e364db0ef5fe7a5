//! Unit tests for nav-graph.
//!
//! All tests use hand-crafted or seeded random worlds; no files are read
//! except through in-memory CSV cursors.

#[cfg(test)]
mod helpers {
    use nav_core::LocationId;

    use crate::{EventDescriptor, Location, WorldGraph};

    pub fn id(s: &str) -> LocationId {
        LocationId::from(s)
    }

    /// Connect `a` and `b` in both directions on the owning documents.
    pub fn link(locs: &mut [Location], a: &str, b: &str, cost: i64) {
        for (from, to) in [(a, b), (b, a)] {
            let loc = locs.iter_mut().find(|l| l.id.as_str() == from).unwrap();
            loc.upsert_connection(id(to), cost);
        }
    }

    /// The line world used throughout:  A –3– B –4– C –2– D, plus an
    /// isolated E.  B has an optional event, C a forced one.
    pub fn line_world() -> Vec<Location> {
        let mut locs = vec![
            Location::new("a", "Alder Gate"),
            Location::new("b", "Birch Hollow")
                .with_event(EventDescriptor::optional("fox", "A fox watches you.")),
            Location::new("c", "Cedar Pass")
                .with_event(EventDescriptor::forced("rockslide", "Rocks block the way.")),
            Location::new("d", "Dune Market"),
            Location::new("e", "Elm Isle"),
        ];
        link(&mut locs, "a", "b", 3);
        link(&mut locs, "b", "c", 4);
        link(&mut locs, "c", "d", 2);
        locs
    }

    /// A small grid where the cheap path has more hops than the direct one.
    ///
    ///   p –1– q –1– r
    ///   |           |
    ///   5           1
    ///   |           |
    ///   s –––10–––– t
    pub fn detour_world() -> Vec<Location> {
        let mut locs: Vec<Location> =
            ["p", "q", "r", "s", "t"].iter().map(|n| Location::new(*n, n.to_uppercase())).collect();
        link(&mut locs, "p", "q", 1);
        link(&mut locs, "q", "r", 1);
        link(&mut locs, "r", "t", 1);
        link(&mut locs, "p", "s", 5);
        link(&mut locs, "s", "t", 10);
        locs
    }

    pub fn graph(locs: &[Location]) -> WorldGraph {
        WorldGraph::build(locs).unwrap()
    }
}

// ── Builder & graph structure ─────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use super::helpers::{graph, id, line_world};
    use crate::{
        DijkstraPathFinder, GraphError, Location, PathFinder, PathIndex, WorldGraph,
        WorldGraphBuilder, MAX_EDGE_COST,
    };

    #[test]
    fn empty_build() {
        let g = WorldGraphBuilder::new().build().unwrap();
        assert_eq!(g.node_count(), 0);
        assert_eq!(g.edge_count(), 0);
        assert!(g.is_empty());
    }

    #[test]
    fn indices_follow_id_order_not_load_order() {
        let locs = line_world();
        let mut reversed = locs.clone();
        reversed.reverse();

        let g1 = graph(&locs);
        let g2 = graph(&reversed);
        for loc in &locs {
            assert_eq!(g1.node(&loc.id), g2.node(&loc.id));
        }
        assert_eq!(g1.node(&id("a")).unwrap().0, 0);
        assert_eq!(g1.node(&id("e")).unwrap().0, 4);
    }

    #[test]
    fn csr_degrees() {
        let g = graph(&line_world());
        let deg = |s: &str| g.out_degree(g.node(&id(s)).unwrap());
        assert_eq!(deg("a"), 1);
        assert_eq!(deg("b"), 2);
        assert_eq!(deg("c"), 2);
        assert_eq!(deg("d"), 1);
        assert_eq!(deg("e"), 0);
        for e in g.out_edges(g.node(&id("b")).unwrap()) {
            assert_eq!(g.location_id(g.edge_from[e.index()]), &id("b"));
        }
    }

    #[test]
    fn direct_cost_picks_cheapest_duplicate() {
        let mut b = WorldGraphBuilder::new();
        b.add_location(id("x"));
        b.add_location(id("y"));
        b.add_directed_edge(id("x"), id("y"), 9);
        b.add_directed_edge(id("x"), id("y"), 4);
        let g = b.build().unwrap();
        let (x, y) = (g.node(&id("x")).unwrap(), g.node(&id("y")).unwrap());
        assert_eq!(g.direct_cost(x, y), Some(4));
        assert_eq!(g.direct_cost(y, x), None);
    }

    #[test]
    fn self_loop_rejected() {
        let mut locs = vec![Location::new("a", "A")];
        locs[0].upsert_connection(id("a"), 1);
        assert!(matches!(WorldGraph::build(&locs), Err(GraphError::SelfLoop(l)) if l == id("a")));
    }

    #[test]
    fn negative_cost_rejected() {
        let mut b = WorldGraphBuilder::new();
        b.add_location(id("a"));
        b.add_location(id("b"));
        b.add_connection(id("a"), id("b"), -1);
        assert!(matches!(b.build(), Err(GraphError::NegativeCost { cost: -1, .. })));
    }

    #[test]
    fn cost_above_cap_rejected() {
        let mut b = WorldGraphBuilder::new();
        b.add_location(id("a"));
        b.add_location(id("b"));
        b.add_connection(id("a"), id("b"), i64::MAX);
        assert!(matches!(b.build(), Err(GraphError::CostTooHigh { cost: i64::MAX, .. })));

        let mut locs = vec![Location::new("a", "A"), Location::new("b", "B")];
        locs[0].upsert_connection(id("b"), MAX_EDGE_COST + 1);
        assert!(matches!(WorldGraph::build(&locs), Err(GraphError::CostTooHigh { .. })));
    }

    #[test]
    fn chain_of_max_cost_edges_stays_reachable() {
        let mut b = WorldGraphBuilder::new();
        for s in ["a", "b", "c", "d"] {
            b.add_location(id(s));
        }
        b.add_connection(id("a"), id("b"), MAX_EDGE_COST);
        b.add_connection(id("b"), id("c"), MAX_EDGE_COST);
        b.add_connection(id("c"), id("d"), 1);
        let g = b.build().unwrap();
        let (a, d) = (g.node(&id("a")).unwrap(), g.node(&id("d")).unwrap());
        let expected = 2 * MAX_EDGE_COST as u64 + 1;

        assert_eq!(PathIndex::build(&g).cost(a, d), Some(expected));
        assert_eq!(DijkstraPathFinder.find_path(&g, a, d).unwrap().cost, expected);
    }

    #[test]
    fn unknown_endpoint_rejected() {
        let mut locs = vec![Location::new("a", "A")];
        locs[0].upsert_connection(id("ghost"), 2);
        assert!(matches!(WorldGraph::build(&locs), Err(GraphError::UnknownLocation(l)) if l == id("ghost")));
    }

    #[test]
    fn duplicate_location_rejected() {
        let locs = vec![Location::new("a", "A"), Location::new("a", "Again")];
        assert!(matches!(WorldGraph::build(&locs), Err(GraphError::DuplicateLocation(_))));
    }

    #[test]
    fn zero_cost_edges_allowed() {
        let mut b = WorldGraphBuilder::new();
        b.add_location(id("a"));
        b.add_location(id("b"));
        b.add_connection(id("a"), id("b"), 0);
        assert_eq!(b.build().unwrap().edge_count(), 2);
    }
}

// ── Floyd–Warshall index ──────────────────────────────────────────────────────

#[cfg(test)]
mod index {
    use super::helpers::{detour_world, graph, id, line_world};
    use crate::{PathIndex, WorldGraph};

    fn node(g: &WorldGraph, s: &str) -> nav_core::NodeId {
        g.node(&id(s)).unwrap()
    }

    #[test]
    fn line_costs() {
        let g = graph(&line_world());
        let idx = PathIndex::build(&g);
        assert_eq!(idx.cost(node(&g, "a"), node(&g, "d")), Some(9));
        assert_eq!(idx.cost(node(&g, "d"), node(&g, "a")), Some(9));
        assert_eq!(idx.cost(node(&g, "b"), node(&g, "d")), Some(6));
        assert_eq!(idx.cost(node(&g, "c"), node(&g, "c")), Some(0));
    }

    #[test]
    fn path_reconstruction_follows_next_hops() {
        let g = graph(&line_world());
        let idx = PathIndex::build(&g);
        let path = idx.path(node(&g, "a"), node(&g, "d")).unwrap();
        let names: Vec<_> = path.iter().map(|&n| g.location_id(n).as_str()).collect();
        assert_eq!(names, ["a", "b", "c", "d"]);
        assert_eq!(idx.next_hop(node(&g, "a"), node(&g, "d")), Some(node(&g, "b")));
    }

    #[test]
    fn trivial_path_is_single_node() {
        let g = graph(&line_world());
        let idx = PathIndex::build(&g);
        let e = idx.entry(node(&g, "b"), node(&g, "b")).unwrap();
        assert_eq!(e.cost, 0);
        assert_eq!(e.path, vec![node(&g, "b")]);
    }

    #[test]
    fn unreachable_is_explicit_none() {
        let g = graph(&line_world());
        let idx = PathIndex::build(&g);
        let (a, e) = (node(&g, "a"), node(&g, "e"));
        assert_eq!(idx.cost(a, e), None);
        assert_eq!(idx.path(a, e), None);
        assert!(idx.entry(e, a).is_none());
        assert!(!idx.is_reachable(a, e));
    }

    #[test]
    fn out_of_range_nodes_miss() {
        let g = graph(&line_world());
        let idx = PathIndex::build(&g);
        assert_eq!(idx.cost(nav_core::NodeId(99), node(&g, "a")), None);
        assert_eq!(idx.reachable_from(nav_core::NodeId::INVALID).count(), 0);
    }

    #[test]
    fn cheaper_multi_hop_beats_direct() {
        let g = graph(&detour_world());
        let idx = PathIndex::build(&g);
        let (p, t, s) = (node(&g, "p"), node(&g, "t"), node(&g, "s"));
        assert_eq!(idx.cost(p, t), Some(3));
        assert_eq!(idx.path(p, t).unwrap().len(), 4);
        // s -> t directly costs 10, but s -> p -> q -> r -> t costs 8.
        assert_eq!(idx.cost(s, t), Some(8));
    }

    #[test]
    fn additivity_along_every_path() {
        let g = graph(&detour_world());
        let idx = PathIndex::build(&g);
        for from in 0..g.node_count() {
            for to in 0..g.node_count() {
                let (a, z) = (nav_core::NodeId(from as u32), nav_core::NodeId(to as u32));
                let Some(entry) = idx.entry(a, z) else { continue };
                for &mid in &entry.path {
                    let head = idx.cost(a, mid).unwrap();
                    let tail = idx.cost(mid, z).unwrap();
                    assert_eq!(head + tail, entry.cost, "{a} -> {mid} -> {z}");
                }
            }
        }
    }

    #[test]
    fn rebuild_is_deterministic() {
        let locs = detour_world();
        let first  = PathIndex::build(&graph(&locs));
        let second = PathIndex::build(&graph(&locs));
        assert_eq!(first, second);
    }

    #[test]
    fn reachable_from_lists_component() {
        let g = graph(&line_world());
        let idx = PathIndex::build(&g);
        let reach: Vec<_> = idx.reachable_from(node(&g, "a")).collect();
        assert_eq!(reach.len(), 4);
        assert!(!reach.contains(&node(&g, "e")));
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_build_matches_sequential() {
        let g = super::cross_check::random_graph(40, 11);
        assert_eq!(PathIndex::build(&g), PathIndex::build_parallel(&g));
        assert_eq!(PathIndex::build(&g), PathIndex::build_with(&g, 0));
    }
}

// ── Dijkstra ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod dijkstra {
    use super::helpers::{detour_world, graph, id, line_world};
    use crate::{DijkstraPathFinder, GraphError, PathFinder};

    #[test]
    fn trivial_route() {
        let g = graph(&line_world());
        let a = g.node(&id("a")).unwrap();
        let r = DijkstraPathFinder.find_path(&g, a, a).unwrap();
        assert!(r.is_trivial());
        assert_eq!(r.cost, 0);
        assert_eq!(r.nodes, vec![a]);
    }

    #[test]
    fn shortest_route_prefers_cheap_hops() {
        let g = graph(&detour_world());
        let (p, t) = (g.node(&id("p")).unwrap(), g.node(&id("t")).unwrap());
        let r = DijkstraPathFinder.find_path(&g, p, t).unwrap();
        assert_eq!(r.cost, 3);
        assert_eq!(r.hop_count(), 3);
        assert_eq!(r.nodes.first(), Some(&p));
        assert_eq!(r.nodes.last(), Some(&t));
    }

    #[test]
    fn disconnected_returns_no_route() {
        let g = graph(&line_world());
        let (a, e) = (g.node(&id("a")).unwrap(), g.node(&id("e")).unwrap());
        assert!(matches!(
            DijkstraPathFinder.find_path(&g, a, e),
            Err(GraphError::NoRoute { .. })
        ));
    }

    #[test]
    fn unknown_node_errors() {
        let g = graph(&line_world());
        let a = g.node(&id("a")).unwrap();
        assert!(matches!(
            DijkstraPathFinder.find_path(&g, a, nav_core::NodeId(42)),
            Err(GraphError::NodeNotFound(_))
        ));
    }
}

// ── Index vs Dijkstra cross-check ─────────────────────────────────────────────

#[cfg(test)]
mod cross_check {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use nav_core::{LocationId, NodeId};

    use super::helpers::{detour_world, graph, line_world};
    use crate::{DijkstraPathFinder, PathFinder, PathIndex, WorldGraph, WorldGraphBuilder};

    /// Sparse random digraph with a mix of symmetric and one-way edges.
    pub fn random_graph(n: usize, seed: u64) -> WorldGraph {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut b = WorldGraphBuilder::new();
        let ids: Vec<LocationId> = (0..n).map(|i| LocationId::new(format!("loc-{i:03}"))).collect();
        for id in &ids {
            b.add_location(id.clone());
        }
        for i in 0..n {
            for j in 0..n {
                if i != j && rng.gen_bool(0.08) {
                    let cost = rng.gen_range(0..20);
                    if rng.gen_bool(0.5) {
                        b.add_connection(ids[i].clone(), ids[j].clone(), cost);
                    } else {
                        b.add_directed_edge(ids[i].clone(), ids[j].clone(), cost);
                    }
                }
            }
        }
        b.build().unwrap()
    }

    fn assert_index_matches_dijkstra(g: &WorldGraph) {
        let idx = PathIndex::build(g);
        for i in 0..g.node_count() {
            for j in 0..g.node_count() {
                let (from, to) = (NodeId(i as u32), NodeId(j as u32));
                let fw = idx.cost(from, to);
                let dj = DijkstraPathFinder.find_path(g, from, to).ok().map(|r| r.cost);
                assert_eq!(fw, dj, "cost mismatch {from} -> {to}");

                if let Some(path) = idx.path(from, to) {
                    let walked: u64 = path
                        .windows(2)
                        .map(|w| g.direct_cost(w[0], w[1]).unwrap())
                        .sum();
                    assert_eq!(Some(walked), fw, "reconstructed path does not price to its cost");
                }
            }
        }
    }

    #[test]
    fn fixed_worlds() {
        assert_index_matches_dijkstra(&graph(&line_world()));
        assert_index_matches_dijkstra(&graph(&detour_world()));
    }

    #[test]
    fn seeded_random_worlds() {
        for seed in 0..8 {
            assert_index_matches_dijkstra(&random_graph(30, seed));
        }
    }
}

// ── Events ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod events {
    use super::helpers::{graph, id, line_world};
    use crate::{EventFlags, EventLookup, EventTable};

    #[test]
    fn table_from_locations() {
        let table = EventTable::from_locations(&line_world());
        assert_eq!(table.len(), 2);
        assert!(!table.event_at(&id("b")).unwrap().forced);
        assert!(table.event_at(&id("c")).unwrap().forced);
        assert!(table.event_at(&id("a")).is_none());
    }

    #[test]
    fn flags_indexed_by_node() {
        let locs = line_world();
        let g = graph(&locs);
        let flags = EventFlags::build(&g, &locs);
        assert!(flags.has_event(g.node(&id("b")).unwrap()));
        assert!(!flags.has_event(g.node(&id("d")).unwrap()));
        assert!(!flags.has_event(nav_core::NodeId::INVALID));
        assert_eq!(flags.flagged_count(), 2);
    }
}

// ── Snapshot ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod snapshot {
    use std::sync::Arc;

    use super::helpers::{id, line_world, link};
    use crate::{DijkstraPathFinder, PathLookup, SnapshotCell, WorldSnapshot};

    #[test]
    fn plan_uses_persisted_ids() {
        let snap = WorldSnapshot::build(&line_world(), 64).unwrap();
        let plan = snap.plan(&id("a"), &id("d")).unwrap();
        assert_eq!(plan.cost, 9);
        assert_eq!(plan.path, vec![id("a"), id("b"), id("c"), id("d")]);
        assert_eq!(snap.path_cost(&id("b"), &id("d")), Some(6));
        assert!(snap.plan(&id("a"), &id("e")).is_none());
        assert!(snap.plan(&id("a"), &id("nowhere")).is_none());
    }

    #[test]
    fn lookups() {
        let snap = WorldSnapshot::build(&line_world(), 64).unwrap();
        assert_eq!(snap.display_name(&id("c")), Some("Cedar Pass"));
        assert!(snap.has_event(&id("b")));
        assert!(!snap.has_event(&id("a")));
        assert_eq!(snap.direct_cost(&id("a"), &id("b")), Some(3));
        assert_eq!(snap.direct_cost(&id("a"), &id("c")), None);
    }

    #[test]
    fn uncached_matches_index() {
        let snap = WorldSnapshot::build(&line_world(), 64).unwrap();
        let fresh = snap.find_path_uncached(&DijkstraPathFinder, &id("d"), &id("a")).unwrap();
        assert_eq!(Some(fresh.cost), snap.path_cost(&id("d"), &id("a")));
    }

    #[test]
    fn install_swaps_and_old_readers_keep_their_view() {
        let cell = SnapshotCell::default();
        assert_eq!(cell.load().generation(), 0);

        let first = cell.install(WorldSnapshot::build(&line_world(), 64).unwrap());
        assert_eq!(first.generation(), 1);
        let held: Arc<WorldSnapshot> = cell.load();

        let mut locs = line_world();
        link(&mut locs, "a", "e", 10);
        let second = cell.install(WorldSnapshot::build(&locs, 64).unwrap());
        assert_eq!(second.generation(), 2);

        // The reader that loaded before the swap still sees the old world.
        assert!(held.path_cost(&id("a"), &id("e")).is_none());
        assert_eq!(cell.load().path_cost(&id("a"), &id("e")), Some(10));
        assert_eq!(cell.load().path_cost(&id("d"), &id("e")), Some(19));
    }
}

// ── CSV loader ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader {
    use std::io::Cursor;

    use super::helpers::id;
    use crate::{load_world_reader, GraphError, PathLookup, WorldSnapshot};

    const LOCATIONS: &str = "\
location_id,name,description,event_name,event_text,event_forced
ford,River Ford,Shallow crossing,,,
mill,Old Mill,,ghost,A cold draft follows you.,false
gate,North Gate,,guards,The guards turn you back.,true
";

    const CONNECTIONS: &str = "\
from,to,cost
ford,mill,3
mill,ford,3
mill,gate,5
gate,mill,5
";

    #[test]
    fn loads_locations_events_and_connections() {
        let locs = load_world_reader(Cursor::new(LOCATIONS), Cursor::new(CONNECTIONS)).unwrap();
        assert_eq!(locs.len(), 3);
        assert_eq!(locs[0].description.as_deref(), Some("Shallow crossing"));
        assert!(locs[0].event.is_none());
        assert!(!locs[1].event.as_ref().unwrap().forced);
        assert!(locs[2].event.as_ref().unwrap().forced);
        assert_eq!(locs[1].connections.len(), 2);

        let snap = WorldSnapshot::build(&locs, 64).unwrap();
        assert_eq!(snap.plan(&id("ford"), &id("gate")).unwrap().cost, 8);
    }

    #[test]
    fn connection_from_unknown_location() {
        let conns = "from,to,cost\nnowhere,ford,1\n";
        let err = load_world_reader(Cursor::new(LOCATIONS), Cursor::new(conns)).unwrap_err();
        assert!(matches!(err, GraphError::UnknownLocation(l) if l == id("nowhere")));
    }

    #[test]
    fn malformed_cost_is_parse_error() {
        let conns = "from,to,cost\nford,mill,lots\n";
        let err = load_world_reader(Cursor::new(LOCATIONS), Cursor::new(conns)).unwrap_err();
        assert!(matches!(err, GraphError::Parse(_)));
    }
}
