//! Traveler records and the atomic update applied to them.

use serde::{Deserialize, Serialize};

use nav_core::{Cost, LocationId, TravelerId};

use crate::{Journey, MovementPhase};

/// The persisted actor whose location and stamina the engine manages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Traveler {
    pub id:              TravelerId,
    /// Character name used in notifications.
    pub name:            String,
    pub location_id:     LocationId,
    pub stamina:         Cost,
    pub max_stamina:     Cost,
    /// Locations the traveler has discovered and may pick as destinations.
    #[serde(default)]
    pub known_locations: Vec<LocationId>,
    /// Bumped by every successful commit; the optimistic-concurrency token.
    #[serde(default)]
    pub revision:        u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journey:         Option<Journey>,
}

impl Traveler {
    /// A new idle traveler at `location` with full stamina.
    pub fn new(
        id:          impl Into<TravelerId>,
        name:        impl Into<String>,
        location:    impl Into<LocationId>,
        max_stamina: Cost,
    ) -> Self {
        let location = location.into();
        Self {
            id:              id.into(),
            name:            name.into(),
            known_locations: vec![location.clone()],
            location_id:     location,
            stamina:         max_stamina,
            max_stamina,
            revision:        0,
            journey:         None,
        }
    }

    pub fn with_stamina(mut self, stamina: Cost) -> Self {
        self.stamina = stamina.min(self.max_stamina);
        self
    }

    /// Add `location` to the known set (no-op if already known).
    pub fn discover(&mut self, location: LocationId) {
        if !self.knows(&location) {
            self.known_locations.push(location);
        }
    }

    pub fn knows(&self, location: &LocationId) -> bool {
        self.known_locations.contains(location)
    }

    /// Lifecycle phase derived from the stored journey.
    pub fn phase(&self) -> MovementPhase {
        match &self.journey {
            None                           => MovementPhase::Idle,
            Some(j) if j.cursor_index == 0 => MovementPhase::Advancing,
            Some(_)                        => MovementPhase::PausedForEvent,
        }
    }

    /// Guard matching this record as loaded.
    pub fn guard(&self) -> CommitGuard {
        CommitGuard {
            revision:       self.revision,
            journey_cursor: self.journey.as_ref().map(|j| j.cursor_index),
        }
    }

    /// Apply a committed update in place and bump the revision.
    pub fn apply(&mut self, update: &TravelerUpdate) {
        self.location_id = update.location_id.clone();
        self.stamina     = update.stamina;
        self.journey     = update.journey.clone();
        self.revision   += 1;
    }
}

/// The complete movement state written by one commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TravelerUpdate {
    pub location_id: LocationId,
    pub stamina:     Cost,
    /// `None` clears the journey.
    pub journey:     Option<Journey>,
}

/// Expected prior state for a conditional commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitGuard {
    pub revision:       u64,
    /// Cursor of the journey the step was computed from; `None` if idle.
    pub journey_cursor: Option<usize>,
}

/// A guarded update, ready to hand to a `TravelerRepository`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub guard:  CommitGuard,
    pub update: TravelerUpdate,
}
