//! The persisted in-progress move.

use serde::{Deserialize, Serialize};

use nav_core::{Cost, LocationId};
use nav_graph::PlannedRoute;

/// A resumable multi-step move.
///
/// Serialized exactly as the traveler document stores it:
///
/// ```json
/// { "plannedPath": ["a", "b", "c"], "cursorIndex": 1,
///   "destinationId": "c", "totalCost": 7 }
/// ```
///
/// `cursor_index` points at the last node whose cost has been committed.
/// It only ever moves forward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Journey {
    pub planned_path:   Vec<LocationId>,
    pub cursor_index:   usize,
    pub destination_id: LocationId,
    /// Cost of the whole plan when it was created.
    pub total_cost:     Cost,
}

impl Journey {
    /// A fresh journey at cursor 0.  `None` for an empty route.
    pub fn from_route(route: PlannedRoute) -> Option<Self> {
        let destination_id = route.path.last()?.clone();
        Some(Self {
            planned_path: route.path,
            cursor_index: 0,
            destination_id,
            total_cost:   route.cost,
        })
    }

    /// The node the traveler is confirmed to be at.
    #[inline]
    pub fn cursor_location(&self) -> &LocationId {
        &self.planned_path[self.cursor_index]
    }

    #[inline]
    pub fn last_index(&self) -> usize {
        self.planned_path.len() - 1
    }

    /// Nodes not yet committed, in travel order.
    pub fn remaining(&self) -> &[LocationId] {
        &self.planned_path[self.cursor_index + 1..]
    }

    /// Structural check before a stored journey is trusted.
    pub fn check(&self) -> Result<(), &'static str> {
        if self.planned_path.is_empty() {
            return Err("planned path is empty");
        }
        if self.cursor_index > self.last_index() {
            return Err("cursor is past the end of the planned path");
        }
        if self.planned_path[self.last_index()] != self.destination_id {
            return Err("planned path does not end at the destination");
        }
        Ok(())
    }
}

/// Where a traveler is in the movement lifecycle.
///
/// `Idle`, `Advancing` and `PausedForEvent` are read off a stored record
/// (see `Traveler::phase`); the other variants are the terminal result of a
/// single advance, after which the record is `Idle` again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovementPhase {
    Idle,
    /// A journey was accepted but no step has been committed yet.
    Advancing,
    PausedForEvent,
    Exhausted,
    Arrived,
    HaltedByForcedEvent,
}
