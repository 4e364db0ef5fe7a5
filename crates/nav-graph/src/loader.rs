//! CSV world loader.
//!
//! # CSV format
//!
//! Two files.  `locations.csv` has one row per location; the event columns
//! are empty for locations without a scripted encounter:
//!
//! ```csv
//! location_id,name,description,event_name,event_text,event_forced
//! ford,River Ford,Shallow crossing,,,
//! mill,Old Mill,,ghost,A cold draft follows you.,false
//! ```
//!
//! `connections.csv` has one row per **directed** edge:
//!
//! ```csv
//! from,to,cost
//! ford,mill,3
//! mill,ford,3
//! ```
//!
//! Costs are not validated here; `WorldGraph::build` rejects bad ones so the
//! loader and the repositories share one set of rules.

use std::io::Read;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::Deserialize;

use nav_core::LocationId;

use crate::{EventDescriptor, GraphError, GraphResult, Location};

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct LocationRecord {
    location_id:  String,
    name:         String,
    description:  Option<String>,
    event_name:   Option<String>,
    event_text:   Option<String>,
    event_forced: Option<bool>,
}

#[derive(Deserialize)]
struct ConnectionRecord {
    from: String,
    to:   String,
    cost: i64,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load location documents from a pair of CSV files.
pub fn load_world_csv(locations: &Path, connections: &Path) -> GraphResult<Vec<Location>> {
    let loc_file  = std::fs::File::open(locations)?;
    let conn_file = std::fs::File::open(connections)?;
    load_world_reader(loc_file, conn_file)
}

/// Like [`load_world_csv`] but accepts any `Read` sources.
///
/// Locations are returned in file order with their outgoing connections in
/// file order.
pub fn load_world_reader<L: Read, C: Read>(locations: L, connections: C) -> GraphResult<Vec<Location>> {
    // ── Locations ─────────────────────────────────────────────────────────
    let mut out: Vec<Location> = Vec::new();
    let mut by_id: FxHashMap<LocationId, usize> = FxHashMap::default();

    let mut rdr = csv::Reader::from_reader(locations);
    for result in rdr.deserialize::<LocationRecord>() {
        let row = result.map_err(|e| GraphError::Parse(e.to_string()))?;
        let id  = LocationId::new(row.location_id.trim());
        if by_id.insert(id.clone(), out.len()).is_some() {
            return Err(GraphError::DuplicateLocation(id));
        }

        let event = row.event_text.map(|text| EventDescriptor {
            name:   row.event_name.unwrap_or_default(),
            text,
            forced: row.event_forced.unwrap_or(false),
        });

        out.push(Location {
            id,
            name:        row.name,
            description: row.description,
            connections: Vec::new(),
            event,
        });
    }

    // ── Connections ───────────────────────────────────────────────────────
    let mut rdr = csv::Reader::from_reader(connections);
    for result in rdr.deserialize::<ConnectionRecord>() {
        let row  = result.map_err(|e| GraphError::Parse(e.to_string()))?;
        let from = LocationId::new(row.from.trim());
        let slot = *by_id.get(&from).ok_or(GraphError::UnknownLocation(from))?;
        out[slot].upsert_connection(LocationId::new(row.to.trim()), row.cost);
    }

    Ok(out)
}
