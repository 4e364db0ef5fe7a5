//! SQLite backend for locations and travelers.

use std::path::Path;

use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::debug;

use nav_core::{LocationId, RepoResult, RepositoryError, TravelerId};
use nav_graph::{Connection as Edge, EdgeRecord, EventDescriptor, Location};
use nav_movement::{CommitGuard, CommitOutcome, Journey, Traveler, TravelerRepository, TravelerUpdate};
use nav_service::LocationRepository;

use crate::{StoreError, StoreResult};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS locations (
        id           TEXT PRIMARY KEY,
        name         TEXT NOT NULL,
        description  TEXT,
        event_name   TEXT,
        event_text   TEXT,
        event_forced INTEGER
    );
    CREATE TABLE IF NOT EXISTS connections (
        from_id TEXT    NOT NULL REFERENCES locations(id),
        to_id   TEXT    NOT NULL REFERENCES locations(id),
        cost    INTEGER NOT NULL,
        PRIMARY KEY (from_id, to_id)
    );
    CREATE TABLE IF NOT EXISTS travelers (
        id              TEXT PRIMARY KEY,
        name            TEXT    NOT NULL,
        location_id     TEXT    NOT NULL,
        stamina         INTEGER NOT NULL,
        max_stamina     INTEGER NOT NULL,
        known_locations TEXT    NOT NULL,
        revision        INTEGER NOT NULL,
        journey         TEXT,
        journey_cursor  INTEGER
    );";

/// SQLite-backed location and traveler repository.
///
/// The connection sits behind a mutex: SQLite serializes writers anyway, and
/// the mutex makes the store `Sync` so one instance can serve both ports.
pub struct SqliteStore {
    pub(crate) conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and initialise the schema.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;",
        )?;
        Self::with_connection(conn)
    }

    /// A private in-memory database; contents vanish on drop.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Insert or replace location documents together with their connections,
    /// in one transaction.
    ///
    /// Connections may point at locations later in the same batch.
    pub fn import_locations(&self, locations: &[Location]) -> StoreResult<()> {
        let conn = self.conn.lock();
        let tx   = conn.unchecked_transaction()?;
        {
            let mut put_loc = tx.prepare_cached(
                "INSERT INTO locations (id, name, description, event_name, event_text, event_forced) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
                 ON CONFLICT(id) DO UPDATE SET \
                     name = excluded.name, description = excluded.description, \
                     event_name = excluded.event_name, event_text = excluded.event_text, \
                     event_forced = excluded.event_forced",
            )?;
            let mut clear_edges = tx.prepare_cached("DELETE FROM connections WHERE from_id = ?1")?;
            for loc in locations {
                let event = loc.event.as_ref();
                put_loc.execute(params![
                    loc.id.as_str(),
                    loc.name,
                    loc.description,
                    event.map(|e| e.name.as_str()),
                    event.map(|e| e.text.as_str()),
                    event.map(|e| e.forced),
                ])?;
                clear_edges.execute(params![loc.id.as_str()])?;
            }
            let edges: Vec<EdgeRecord> = locations.iter().flat_map(Location::edges).collect();
            upsert_edges_in(&tx, &edges)?;
        }
        tx.commit()?;
        debug!(locations = locations.len(), "imported locations");
        Ok(())
    }

    fn load_location(conn: &Connection, id: &LocationId) -> StoreResult<Option<Location>> {
        let loc = conn
            .query_row(
                "SELECT id, name, description, event_name, event_text, event_forced \
                 FROM locations WHERE id = ?1",
                params![id.as_str()],
                location_from_row,
            )
            .optional()?;
        let Some(mut loc) = loc else {
            return Ok(None);
        };
        let mut stmt = conn.prepare_cached(
            "SELECT to_id, cost FROM connections WHERE from_id = ?1 ORDER BY rowid",
        )?;
        let edges = stmt.query_map(params![id.as_str()], |row| {
            Ok(Edge { target_id: LocationId::new(row.get::<_, String>(0)?), cost: row.get(1)? })
        })?;
        for edge in edges {
            loc.connections.push(edge?);
        }
        Ok(Some(loc))
    }

    fn load_traveler(conn: &Connection, id: &TravelerId) -> StoreResult<Option<Traveler>> {
        let raw = conn
            .query_row(
                "SELECT id, name, location_id, stamina, max_stamina, known_locations, revision, journey \
                 FROM travelers WHERE id = ?1",
                params![id.as_str()],
                |row| {
                    Ok(TravelerRow {
                        id:              row.get(0)?,
                        name:            row.get(1)?,
                        location_id:     row.get(2)?,
                        stamina:         row.get(3)?,
                        max_stamina:     row.get(4)?,
                        known_locations: row.get(5)?,
                        revision:        row.get(6)?,
                        journey:         row.get(7)?,
                    })
                },
            )
            .optional()?;
        raw.map(TravelerRow::decode).transpose()
    }
}

// ── Row helpers ───────────────────────────────────────────────────────────────

fn location_from_row(row: &Row<'_>) -> rusqlite::Result<Location> {
    let event = match (
        row.get::<_, Option<String>>(3)?,
        row.get::<_, Option<String>>(4)?,
        row.get::<_, Option<bool>>(5)?,
    ) {
        (Some(name), Some(text), forced) => {
            Some(EventDescriptor { name, text, forced: forced.unwrap_or(false) })
        }
        _ => None,
    };
    Ok(Location {
        id:          LocationId::new(row.get::<_, String>(0)?),
        name:        row.get(1)?,
        description: row.get(2)?,
        connections: Vec::new(),
        event,
    })
}

/// Traveler columns before JSON decoding.
struct TravelerRow {
    id:              String,
    name:            String,
    location_id:     String,
    stamina:         u64,
    max_stamina:     u64,
    known_locations: String,
    revision:        u64,
    journey:         Option<String>,
}

impl TravelerRow {
    fn decode(self) -> StoreResult<Traveler> {
        let journey = self.journey.as_deref().map(serde_json::from_str::<Journey>).transpose()?;
        Ok(Traveler {
            id:              TravelerId::new(self.id),
            name:            self.name,
            location_id:     LocationId::new(self.location_id),
            stamina:         self.stamina,
            max_stamina:     self.max_stamina,
            known_locations: serde_json::from_str(&self.known_locations)?,
            revision:        self.revision,
            journey,
        })
    }
}

fn journey_json(journey: Option<&Journey>) -> StoreResult<Option<String>> {
    Ok(journey.map(serde_json::to_string).transpose()?)
}

fn location_exists(conn: &Connection, id: &LocationId) -> StoreResult<bool> {
    let found = conn
        .query_row("SELECT 1 FROM locations WHERE id = ?1", params![id.as_str()], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

fn traveler_exists(conn: &Connection, id: &TravelerId) -> StoreResult<bool> {
    let found = conn
        .query_row("SELECT 1 FROM travelers WHERE id = ?1", params![id.as_str()], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

fn upsert_edges_in(conn: &Connection, edges: &[EdgeRecord]) -> StoreResult<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO connections (from_id, to_id, cost) VALUES (?1, ?2, ?3) \
         ON CONFLICT(from_id, to_id) DO UPDATE SET cost = excluded.cost",
    )?;
    for edge in edges {
        stmt.execute(params![edge.from.as_str(), edge.to.as_str(), edge.cost])?;
    }
    Ok(())
}

// ── LocationRepository ────────────────────────────────────────────────────────

impl LocationRepository for SqliteStore {
    fn locations(&self) -> RepoResult<Vec<Location>> {
        let conn = self.conn.lock();
        let ids: Vec<String> = {
            let mut stmt = conn.prepare_cached("SELECT id FROM locations ORDER BY id").map_err(to_repo)?;
            let rows = stmt.query_map([], |row| row.get(0)).map_err(to_repo)?;
            rows.collect::<rusqlite::Result<_>>().map_err(to_repo)?
        };
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(loc) = Self::load_location(&conn, &LocationId::new(id))? {
                out.push(loc);
            }
        }
        Ok(out)
    }

    fn location(&self, id: &LocationId) -> RepoResult<Option<Location>> {
        Ok(Self::load_location(&self.conn.lock(), id)?)
    }

    fn event_descriptor(&self, id: &LocationId) -> RepoResult<Option<EventDescriptor>> {
        Ok(Self::load_location(&self.conn.lock(), id)?.and_then(|l| l.event))
    }

    fn upsert_edges(&self, edges: &[EdgeRecord]) -> RepoResult<()> {
        let conn = self.conn.lock();
        let tx   = conn.unchecked_transaction().map_err(to_repo)?;
        for edge in edges {
            for end in [&edge.from, &edge.to] {
                if !location_exists(&tx, end)? {
                    return Err(RepositoryError::LocationNotFound(end.clone()));
                }
            }
        }
        upsert_edges_in(&tx, edges)?;
        tx.commit().map_err(to_repo)?;
        Ok(())
    }
}

// ── TravelerRepository ────────────────────────────────────────────────────────

impl TravelerRepository for SqliteStore {
    fn load(&self, id: &TravelerId) -> RepoResult<Option<Traveler>> {
        Ok(Self::load_traveler(&self.conn.lock(), id)?)
    }

    fn insert(&self, traveler: &Traveler) -> RepoResult<()> {
        let conn    = self.conn.lock();
        let known   = serde_json::to_string(&traveler.known_locations).map_err(to_repo)?;
        let journey = journey_json(traveler.journey.as_ref())?;
        conn.execute(
            "INSERT INTO travelers \
             (id, name, location_id, stamina, max_stamina, known_locations, revision, journey, journey_cursor) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                traveler.id.as_str(),
                traveler.name,
                traveler.location_id.as_str(),
                traveler.stamina,
                traveler.max_stamina,
                known,
                traveler.revision,
                journey,
                traveler.journey.as_ref().map(|j| j.cursor_index),
            ],
        )
        .map_err(|err| match err {
            rusqlite::Error::SqliteFailure(e, _) if is_key_conflict(&e) => {
                RepositoryError::DuplicateTraveler(traveler.id.clone())
            }
            other => to_repo(other),
        })?;
        Ok(())
    }

    fn commit(
        &self,
        id:     &TravelerId,
        guard:  &CommitGuard,
        update: &TravelerUpdate,
    ) -> RepoResult<CommitOutcome> {
        let conn    = self.conn.lock();
        let journey = journey_json(update.journey.as_ref())?;
        let changed = conn
            .execute(
                "UPDATE travelers \
                 SET location_id = ?1, stamina = ?2, journey = ?3, journey_cursor = ?4, \
                     revision = revision + 1 \
                 WHERE id = ?5 AND revision = ?6 AND journey_cursor IS ?7",
                params![
                    update.location_id.as_str(),
                    update.stamina,
                    journey,
                    update.journey.as_ref().map(|j| j.cursor_index),
                    id.as_str(),
                    guard.revision,
                    guard.journey_cursor,
                ],
            )
            .map_err(to_repo)?;

        if changed == 1 {
            return Ok(CommitOutcome::Applied { revision: guard.revision + 1 });
        }
        if !traveler_exists(&conn, id)? {
            return Err(RepositoryError::TravelerNotFound(id.clone()));
        }
        debug!(traveler = %id, revision = guard.revision, "guarded update matched no row");
        Ok(CommitOutcome::Stale)
    }

    /// Appends to the JSON array in place, so a concurrent writer sharing
    /// the file cannot lose a discovery.
    fn discover(&self, id: &TravelerId, location: &LocationId) -> RepoResult<()> {
        let conn    = self.conn.lock();
        let changed = conn
            .execute(
                "UPDATE travelers \
                 SET known_locations = json_insert(known_locations, '$[#]', ?1) \
                 WHERE id = ?2 \
                   AND NOT EXISTS (SELECT 1 FROM json_each(travelers.known_locations) WHERE value = ?1)",
                params![location.as_str(), id.as_str()],
            )
            .map_err(to_repo)?;
        if changed == 0 && !traveler_exists(&conn, id)? {
            return Err(RepositoryError::TravelerNotFound(id.clone()));
        }
        Ok(())
    }
}

fn to_repo(err: impl Into<StoreError>) -> RepositoryError {
    err.into().into()
}

fn is_key_conflict(err: &rusqlite::ffi::Error) -> bool {
    err.code == rusqlite::ErrorCode::ConstraintViolation
        && matches!(
            err.extended_code,
            rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY | rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        )
}
