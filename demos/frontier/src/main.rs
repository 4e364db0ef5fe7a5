//! frontier — a small end-to-end run of the waypath navigation engine.
//!
//! Loads a six-location frontier map from embedded CSV, stores it in SQLite,
//! and walks a traveler through an optional encounter, a forced one, and a
//! live connection edit.
//!
//! ```text
//! cargo run -p frontier                   # default NavConfig
//! cargo run -p frontier -- config.json    # {"max_stamina": 40}
//! RUST_LOG=nav_service=debug cargo run -p frontier
//! ```

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nav_core::{LocationId, NavConfig, TravelerId};
use nav_graph::load_world_reader;
use nav_movement::{StepOutcome, TravelerRepository};
use nav_service::{
    LocationRepository, MoveAction, NavigationService, NavigationServiceBuilder, NotificationSink,
    NotifyError, TravelerContext,
};
use nav_store::SqliteStore;

// ── World data ────────────────────────────────────────────────────────────────

const LOCATIONS_CSV: &str = "\
location_id,name,description,event_name,event_text,event_forced\n\
harbor,Harbor Town,Salt air and creaking piers,,,\n\
ford,River Ford,Knee-deep water over smooth stones,fox,A red fox watches you from the reeds.,false\n\
mill,Old Mill,A waterwheel that no longer turns,,,\n\
pass,Mountain Pass,A narrow trail between cliffs,rockslide,Falling rocks block the trail ahead.,true\n\
summit,Summit Camp,Tents pitched above the clouds,view,The whole valley spreads out below.,false\n\
marsh,Grey Marsh,Reeds as far as the eye can see,,,\n\
";

const CONNECTIONS_CSV: &str = "\
from,to,cost\n\
harbor,ford,3\n\
ford,harbor,3\n\
ford,mill,4\n\
mill,ford,4\n\
harbor,mill,9\n\
mill,harbor,9\n\
mill,pass,2\n\
pass,mill,2\n\
pass,summit,5\n\
summit,pass,5\n\
";

const DB_DIR: &str = "output/frontier";

// ── Notification sink ─────────────────────────────────────────────────────────

/// Prints every notification the way a chat follow-up would show it.
struct ConsoleSink;

impl NotificationSink for ConsoleSink {
    fn send(
        &self,
        to:      &TravelerContext,
        text:    &str,
        actions: Option<&[MoveAction]>,
    ) -> Result<(), NotifyError> {
        println!("  [{}] {}", to.name, text.replace('\n', "\n  "));
        if let Some(actions) = actions {
            println!("  [{}] options: {actions:?}", to.name);
        }
        Ok(())
    }
}

type Service = NavigationService<Arc<SqliteStore>, SqliteStore, ConsoleSink>;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn load_config() -> Result<NavConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let raw = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            serde_json::from_str(&raw).with_context(|| format!("parsing {path}"))
        }
        None => Ok(NavConfig::default()),
    }
}

/// Move `traveler` toward `dest`, continuing through optional encounters.
fn drive(service: &Service, traveler: &TravelerId, dest: &str) -> Result<StepOutcome> {
    let dest = LocationId::from(dest);
    let preview = service.route_preview(traveler, &dest)?;
    let names: Vec<_> = preview.path.iter().map(LocationId::as_str).collect();
    println!("Route to {dest}: {} (cost {})", names.join(" → "), preview.cost);

    let mut ticket = service.request_move(traveler, &dest)?;
    loop {
        let outcome = service.execute(&ticket)?;
        if !matches!(outcome, StepOutcome::PausedForEvent { .. }) {
            return Ok(outcome);
        }
        println!("  → continue");
        ticket = service.continue_move(traveler)?;
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "frontier=info,nav_service=info,nav_graph=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== frontier — waypath navigation demo ===");
    let config = load_config()?;
    println!("Max stamina: {}", config.max_stamina);
    println!();

    // 1. Load the map and persist it.
    let locations = load_world_reader(Cursor::new(LOCATIONS_CSV), Cursor::new(CONNECTIONS_CSV))?;
    std::fs::create_dir_all(DB_DIR)?;
    let db_path = Path::new(DB_DIR).join("frontier.db");
    if db_path.exists() {
        std::fs::remove_file(&db_path)?;
    }
    let store = Arc::new(SqliteStore::open(&db_path)?);
    store.import_locations(&locations)?;
    tracing::info!(db = %db_path.display(), locations = locations.len(), "world stored");

    // 2. Build the service; this performs the initial index build.
    let service: Service = NavigationServiceBuilder::new(Arc::clone(&store), Arc::clone(&store))
        .config(config)
        .sink(ConsoleSink)
        .build()?;
    let world = service.snapshot();
    println!(
        "World: {} locations, {} connections (generation {})",
        world.graph().node_count(),
        world.graph().edge_count(),
        world.generation()
    );

    // 3. A traveler who has heard of every place.
    let ash = TravelerId::from("ash");
    service.register_traveler(ash.clone(), "Ash", "harbor")?;
    for loc in store.locations()? {
        service.discover(&ash, &loc.id)?;
    }
    println!("Destinations known to Ash:");
    for d in service.known_destinations(&ash)? {
        println!("  {:<8} {:<14} {}", d.id.as_str(), d.name, d.description.unwrap_or_default());
    }
    println!();

    // 4. Summit: the fox at the ford pauses, the rockslide at the pass halts.
    let outcome = drive(&service, &ash, "summit")?;
    println!("Result: {:?} at {}", outcome.phase(), outcome.location());
    println!();

    // 5. Stop is harmless when nothing is in progress.
    println!("Stop with no journey: {:?}", service.stop_move(&ash)?);
    println!();

    // 6. Open a road to the marsh and travel there over it.
    let harbor = LocationId::from("harbor");
    let marsh  = LocationId::from("marsh");
    let world  = service.set_connection(&harbor, &marsh, 10)?;
    println!(
        "Connected harbor ↔ marsh (generation {}); direct cost {:?}",
        world.generation(),
        service.direct_cost(&harbor, &marsh)
    );
    let outcome = drive(&service, &ash, "marsh")?;
    println!("Result: {:?} at {}", outcome.phase(), outcome.location());
    println!();

    // 7. Final state, read back from SQLite.
    let t = store.load(&ash)?.context("traveler vanished")?;
    println!("{:<8} {:<10} {:<8} {:<8}", "Traveler", "Location", "Stamina", "Revision");
    println!("{}", "-".repeat(38));
    println!("{:<8} {:<10} {:<8} {:<8}", t.name, t.location_id.as_str(), t.stamina, t.revision);

    Ok(())
}
