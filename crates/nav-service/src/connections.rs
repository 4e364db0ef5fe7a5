//! Connection edits and world snapshot rebuilds.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{error, info};

use nav_core::{LocationId, NavConfig};
use nav_graph::{EdgeRecord, GraphError, MAX_EDGE_COST, SnapshotCell, WorldSnapshot};

use crate::{LocationRepository, NavResult};

/// Owns every write to the world: symmetric edge upserts and the snapshot
/// rebuild that follows them.
///
/// Rebuilds are serialized by `rebuild_lock`, held from the repository write
/// through the install, so snapshots are installed in the order their edge
/// sets were written.  A failed rebuild leaves the installed snapshot alone.
pub struct ConnectionMutationService<L: LocationRepository> {
    locations:          Arc<L>,
    cell:               Arc<SnapshotCell>,
    parallel_min_nodes: usize,
    rebuild_lock:       Mutex<()>,
}

impl<L: LocationRepository> ConnectionMutationService<L> {
    pub fn new(locations: Arc<L>, cell: Arc<SnapshotCell>, config: &NavConfig) -> Self {
        Self {
            locations,
            cell,
            parallel_min_nodes: config.parallel_index_min_nodes,
            rebuild_lock:       Mutex::new(()),
        }
    }

    /// The snapshot cell this service installs into.
    pub fn cell(&self) -> &Arc<SnapshotCell> {
        &self.cell
    }

    /// Rebuild the snapshot from the full persisted location set and install
    /// it.  Also used for the initial load.
    pub fn rebuild(&self) -> NavResult<Arc<WorldSnapshot>> {
        let _guard = self.rebuild_lock.lock();
        self.rebuild_locked()
    }

    /// Connect `a` and `b` in both directions with `cost`, then rebuild.
    ///
    /// Rejects a self-connection, a cost outside `0..=MAX_EDGE_COST`, or an
    /// unknown endpoint before anything is written.
    pub fn set_symmetric_edge(
        &self,
        a:    &LocationId,
        b:    &LocationId,
        cost: i64,
    ) -> NavResult<Arc<WorldSnapshot>> {
        if a == b {
            return Err(GraphError::SelfLoop(a.clone()).into());
        }
        if cost < 0 {
            return Err(GraphError::NegativeCost { from: a.clone(), to: b.clone(), cost }.into());
        }
        if cost > MAX_EDGE_COST {
            return Err(GraphError::CostTooHigh { from: a.clone(), to: b.clone(), cost }.into());
        }
        for end in [a, b] {
            if self.locations.location(end)?.is_none() {
                return Err(GraphError::UnknownLocation(end.clone()).into());
            }
        }

        let _guard = self.rebuild_lock.lock();
        self.locations.upsert_edges(&EdgeRecord::symmetric(a, b, cost))?;
        info!(%a, %b, cost, "connection set");
        self.rebuild_locked()
    }

    fn rebuild_locked(&self) -> NavResult<Arc<WorldSnapshot>> {
        let built: NavResult<WorldSnapshot> = self
            .locations
            .locations()
            .map_err(Into::into)
            .and_then(|locs| {
                WorldSnapshot::build(&locs, self.parallel_min_nodes).map_err(Into::into)
            });
        match built {
            Ok(snapshot) => Ok(self.cell.install(snapshot)),
            Err(err) => {
                error!(
                    error      = %err,
                    generation = self.cell.load().generation(),
                    "world rebuild failed; keeping installed snapshot"
                );
                Err(err)
            }
        }
    }
}
