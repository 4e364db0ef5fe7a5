//! Integration tests for nav-store.

use std::sync::Arc;

use tempfile::TempDir;

use nav_core::{LocationId, RepositoryError, TravelerId};
use nav_graph::{EdgeRecord, EventDescriptor, Location};
use nav_movement::{CommitOutcome, Traveler, TravelerRepository, TravelerUpdate};
use nav_service::LocationRepository;

use crate::SqliteStore;

fn tmp() -> TempDir {
    tempfile::tempdir().expect("create temp dir")
}

fn id(s: &str) -> LocationId {
    LocationId::from(s)
}

/// `a -3- b -4- c`, optional event at `b`.
fn world() -> Vec<Location> {
    let mut a = Location::new("a", "Harbor").with_description("Salt and gulls");
    let mut b = Location::new("b", "Ford").with_event(EventDescriptor::optional("fox", "A fox."));
    let mut c = Location::new("c", "Mill");
    a.upsert_connection(id("b"), 3);
    b.upsert_connection(id("a"), 3);
    b.upsert_connection(id("c"), 4);
    c.upsert_connection(id("b"), 4);
    vec![a, b, c]
}

fn seeded() -> SqliteStore {
    let store = SqliteStore::open_in_memory().unwrap();
    store.import_locations(&world()).unwrap();
    store
}

#[cfg(test)]
mod locations {
    use super::*;

    #[test]
    fn import_round_trips_documents() {
        let store = seeded();
        let locs  = store.locations().unwrap();
        assert_eq!(locs, world());
    }

    #[test]
    fn event_descriptor_is_read_back() {
        let store = seeded();
        let fox = store.event_descriptor(&id("b")).unwrap().unwrap();
        assert_eq!(fox, EventDescriptor::optional("fox", "A fox."));
        assert!(store.event_descriptor(&id("a")).unwrap().is_none());
        assert!(store.location(&id("zz")).unwrap().is_none());
    }

    #[test]
    fn upsert_edges_overwrites_and_appends() {
        let store = seeded();
        store.upsert_edges(&EdgeRecord::symmetric(&id("a"), &id("b"), 1)).unwrap();
        store.upsert_edges(&EdgeRecord::symmetric(&id("a"), &id("c"), 9)).unwrap();

        let a = store.location(&id("a")).unwrap().unwrap();
        let costs: Vec<_> = a.connections.iter().map(|c| (c.target_id.as_str(), c.cost)).collect();
        assert_eq!(costs, [("b", 1), ("c", 9)]);
    }

    #[test]
    fn upsert_edges_with_unknown_endpoint_writes_nothing() {
        let store = seeded();
        let edges = [
            EdgeRecord { from: id("a"), to: id("c"), cost: 2 },
            EdgeRecord { from: id("c"), to: id("nowhere"), cost: 2 },
        ];
        let err = store.upsert_edges(&edges).unwrap_err();
        assert!(matches!(err, RepositoryError::LocationNotFound(l) if l == id("nowhere")));
        assert_eq!(store.location(&id("a")).unwrap().unwrap().connections.len(), 1);
    }

    #[test]
    fn file_database_persists_across_opens() {
        let dir  = tmp();
        let path = dir.path().join("world.db");
        SqliteStore::open(&path).unwrap().import_locations(&world()).unwrap();

        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(reopened.locations().unwrap().len(), 3);
    }
}

#[cfg(test)]
mod travelers {
    use super::*;

    fn ash() -> Traveler {
        Traveler::new("t1", "Ash", "a", 10)
    }

    #[test]
    fn insert_then_load() {
        let store = seeded();
        store.insert(&ash()).unwrap();
        assert_eq!(store.load(&TravelerId::from("t1")).unwrap(), Some(ash()));
        assert!(store.load(&TravelerId::from("t2")).unwrap().is_none());

        let err = store.insert(&ash()).unwrap_err();
        assert!(matches!(err, RepositoryError::DuplicateTraveler(_)));
    }

    #[test]
    fn guarded_commit_applies_once() {
        let store = seeded();
        let t = ash();
        store.insert(&t).unwrap();

        let update = TravelerUpdate { location_id: id("b"), stamina: 7, journey: None };
        let first  = store.commit(&t.id, &t.guard(), &update).unwrap();
        let second = store.commit(&t.id, &t.guard(), &update).unwrap();
        assert_eq!(first, CommitOutcome::Applied { revision: 1 });
        assert_eq!(second, CommitOutcome::Stale);

        let stored = store.load(&t.id).unwrap().unwrap();
        assert_eq!(stored.stamina, 7);
        assert_eq!(stored.location_id, id("b"));
        assert_eq!(stored.revision, 1);
    }

    #[test]
    fn commit_to_missing_traveler_errors() {
        let store  = seeded();
        let update = TravelerUpdate { location_id: id("a"), stamina: 1, journey: None };
        let err = store.commit(&TravelerId::from("ghost"), &ash().guard(), &update).unwrap_err();
        assert!(matches!(err, RepositoryError::TravelerNotFound(_)));
    }

    #[test]
    fn discover_is_persisted_once() {
        let store = seeded();
        let t = ash();
        store.insert(&t).unwrap();
        store.discover(&t.id, &id("c")).unwrap();
        store.discover(&t.id, &id("c")).unwrap();
        assert_eq!(store.load(&t.id).unwrap().unwrap().known_locations, vec![id("a"), id("c")]);
    }

    #[test]
    fn discover_for_missing_traveler_errors() {
        let store = seeded();
        let err = store.discover(&TravelerId::from("ghost"), &id("c")).unwrap_err();
        assert!(matches!(err, RepositoryError::TravelerNotFound(_)));
    }

    #[test]
    fn two_handles_on_one_file_keep_every_discovery() {
        let dir   = tmp();
        let path  = dir.path().join("shared.db");
        let left  = SqliteStore::open(&path).unwrap();
        left.import_locations(&world()).unwrap();
        let right = SqliteStore::open(&path).unwrap();

        let t = ash();
        left.insert(&t).unwrap();
        left.discover(&t.id, &id("b")).unwrap();
        right.discover(&t.id, &id("c")).unwrap();
        right.discover(&t.id, &id("b")).unwrap();

        let known = left.load(&t.id).unwrap().unwrap().known_locations;
        assert_eq!(known, vec![id("a"), id("b"), id("c")]);
    }

    #[test]
    fn duplicate_insert_from_another_handle_is_reported() {
        let dir   = tmp();
        let path  = dir.path().join("shared.db");
        let left  = SqliteStore::open(&path).unwrap();
        let right = SqliteStore::open(&path).unwrap();

        left.insert(&ash()).unwrap();
        let err = right.insert(&ash()).unwrap_err();
        assert!(matches!(err, RepositoryError::DuplicateTraveler(t) if t == TravelerId::from("t1")));
    }
}

#[cfg(test)]
mod service {
    use nav_service::{NavigationServiceBuilder, StopOutcome};

    use super::*;

    #[test]
    fn journey_survives_in_sqlite_between_triggers() {
        let dir   = tmp();
        let store = Arc::new(SqliteStore::open(&dir.path().join("nav.db")).unwrap());
        store.import_locations(&world()).unwrap();

        let service = NavigationServiceBuilder::new(Arc::clone(&store), Arc::clone(&store))
            .build()
            .unwrap();
        let t1 = TravelerId::from("t1");
        service.register_traveler("t1", "Ash", "a").unwrap();
        service.discover(&t1, &id("c")).unwrap();

        let ticket = service.request_move(&t1, &id("c")).unwrap();
        service.execute(&ticket).unwrap();

        // Paused at the ford with the journey stored as camelCase JSON.
        let raw: String = store
            .conn
            .lock()
            .query_row("SELECT journey FROM travelers WHERE id = 't1'", [], |r| r.get(0))
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["plannedPath"], serde_json::json!(["a", "b", "c"]));
        assert_eq!(json["cursorIndex"], 1);
        assert_eq!(json["totalCost"], 7);

        assert_eq!(service.stop_move(&t1).unwrap(), StopOutcome::Stopped { at: id("b") });
        let t = store.load(&t1).unwrap().unwrap();
        assert_eq!(t.stamina, 97);
        assert!(t.journey.is_none());
    }

    #[test]
    fn set_connection_is_persisted() {
        let store = Arc::new(seeded());
        let service = NavigationServiceBuilder::new(Arc::clone(&store), Arc::clone(&store))
            .build()
            .unwrap();
        service.set_connection(&id("a"), &id("c"), 5).unwrap();

        assert_eq!(service.direct_cost(&id("c"), &id("a")), Some(5));
        let c = store.location(&id("c")).unwrap().unwrap();
        assert!(c.connections.iter().any(|e| e.target_id == id("a") && e.cost == 5));
    }
}
