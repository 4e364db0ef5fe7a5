//! The movement state machine: plans journeys and advances them one bounded
//! step at a time.

use tracing::debug;

use nav_core::{Cost, LocationId};
use nav_graph::{EventDescriptor, EventLookup, PathLookup};

use crate::{
    Commit, Journey, MovementError, MovementPhase, MovementResult, Traveler, TravelerUpdate,
};

// ── StepOutcome ───────────────────────────────────────────────────────────────

/// What a single advance ended with.
///
/// `spent` is the stamina deducted by this step only; earlier steps of the
/// same journey were charged when they were committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Reached the destination.  `event` is the destination's own event, if
    /// any: it is shown with the arrival but never pauses.
    Arrived { at: LocationId, spent: Cost, event: Option<EventDescriptor> },

    /// Could not afford the next segment; stopped at the last affordable node.
    Exhausted { at: LocationId, spent: Cost },

    /// Stopped on an optional event; the journey is kept for continue/stop.
    PausedForEvent { at: LocationId, spent: Cost, event: EventDescriptor },

    /// Stopped on a forced event; the journey is cleared.
    HaltedByForcedEvent { at: LocationId, spent: Cost, event: EventDescriptor },
}

impl StepOutcome {
    pub fn location(&self) -> &LocationId {
        match self {
            Self::Arrived { at, .. }
            | Self::Exhausted { at, .. }
            | Self::PausedForEvent { at, .. }
            | Self::HaltedByForcedEvent { at, .. } => at,
        }
    }

    pub fn spent(&self) -> Cost {
        match self {
            Self::Arrived { spent, .. }
            | Self::Exhausted { spent, .. }
            | Self::PausedForEvent { spent, .. }
            | Self::HaltedByForcedEvent { spent, .. } => *spent,
        }
    }

    pub fn phase(&self) -> MovementPhase {
        match self {
            Self::Arrived { .. }             => MovementPhase::Arrived,
            Self::Exhausted { .. }           => MovementPhase::Exhausted,
            Self::PausedForEvent { .. }      => MovementPhase::PausedForEvent,
            Self::HaltedByForcedEvent { .. } => MovementPhase::HaltedByForcedEvent,
        }
    }

    /// Event text to show alongside the step, if any.
    pub fn event(&self) -> Option<&EventDescriptor> {
        match self {
            Self::Arrived { event, .. } => event.as_ref(),
            Self::Exhausted { .. } => None,
            Self::PausedForEvent { event, .. } | Self::HaltedByForcedEvent { event, .. } => {
                Some(event)
            }
        }
    }
}

/// Result of [`MovementMachine::advance_journey`]: what happened, and the
/// guarded write that makes it so.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub outcome: StepOutcome,
    pub commit:  Commit,
}

// ── MovementMachine ───────────────────────────────────────────────────────────

/// Plans and advances journeys against one path index.
///
/// The machine borrows a [`PathLookup`] (normally the `WorldSnapshot` loaded
/// for the current request) and never writes anything itself: every
/// operation returns a [`Commit`] for the caller to apply through a
/// `TravelerRepository`.
///
/// # Type parameter
///
/// `P` is any [`PathLookup`]; tests plug in hand-built tables.
pub struct MovementMachine<'w, P: PathLookup + ?Sized> {
    paths: &'w P,
}

impl<'w, P: PathLookup + ?Sized> MovementMachine<'w, P> {
    pub fn new(paths: &'w P) -> Self {
        Self { paths }
    }

    /// Plan a journey from the traveler's location to `destination`.
    ///
    /// The commit stores the journey at cursor 0 without touching location or
    /// stamina; nothing is deducted until the first advance.  An existing
    /// journey is replaced.
    pub fn start_journey(
        &self,
        traveler:    &Traveler,
        destination: &LocationId,
    ) -> MovementResult<Commit> {
        let no_path = || MovementError::NoPath {
            from: traveler.location_id.clone(),
            to:   destination.clone(),
        };
        let route   = self.paths.plan(&traveler.location_id, destination).ok_or_else(no_path)?;
        let journey = Journey::from_route(route).ok_or_else(no_path)?;

        debug!(
            traveler = %traveler.id,
            to       = %destination,
            hops     = journey.last_index(),
            cost     = journey.total_cost,
            "journey planned"
        );
        Ok(Commit {
            guard:  traveler.guard(),
            update: TravelerUpdate {
                location_id: traveler.location_id.clone(),
                stamina:     traveler.stamina,
                journey:     Some(journey),
            },
        })
    }

    /// Advance the traveler's journey from its cursor.
    ///
    /// Walks the planned path from `cursor + 1`, pricing each node by its
    /// cumulative cost from the origin (`total - cost(node, destination)`),
    /// and stops at the first of:
    ///
    /// - the next node is unaffordable → `Exhausted` at the previous node,
    ///   journey cleared;
    /// - the destination → `Arrived`, journey cleared;
    /// - a forced event → `HaltedByForcedEvent`, journey cleared;
    /// - an optional event → `PausedForEvent`, journey kept with the cursor
    ///   moved to that node.
    ///
    /// The returned commit carries the entire step.  Stamina never goes below
    /// zero.
    pub fn advance_journey<E: EventLookup + ?Sized>(
        &self,
        traveler: &Traveler,
        events:   &E,
    ) -> MovementResult<Step> {
        let journey = traveler
            .journey
            .as_ref()
            .ok_or_else(|| MovementError::StaleJourney(traveler.id.clone()))?;
        let corrupt = |reason| MovementError::CorruptJourney { traveler: traveler.id.clone(), reason };
        journey.check().map_err(corrupt)?;
        if *journey.cursor_location() != traveler.location_id {
            return Err(corrupt("traveler is not at the journey cursor"));
        }

        let cursor = journey.cursor_index;
        let paid   = self.cumulative(journey, cursor)?;

        // Last node the traveler can afford to stand on, and its cumulative cost.
        let mut stop     = cursor;
        let mut stop_cum = paid;

        for i in cursor + 1..=journey.last_index() {
            let cum  = self.cumulative(journey, i)?;
            let node = &journey.planned_path[i];
            if cum < stop_cum {
                return Err(MovementError::GraphInconsistency {
                    from: node.clone(),
                    to:   journey.destination_id.clone(),
                });
            }

            if cum - paid > traveler.stamina {
                let outcome = StepOutcome::Exhausted {
                    at:    journey.planned_path[stop].clone(),
                    spent: stop_cum - paid,
                };
                return Ok(self.finish(traveler, outcome, None));
            }

            if i == journey.last_index() {
                let outcome = StepOutcome::Arrived {
                    at:    node.clone(),
                    spent: cum - paid,
                    event: events.event_at(node).cloned(),
                };
                return Ok(self.finish(traveler, outcome, None));
            }

            match events.event_at(node) {
                Some(event) if event.forced => {
                    let outcome = StepOutcome::HaltedByForcedEvent {
                        at:    node.clone(),
                        spent: cum - paid,
                        event: event.clone(),
                    };
                    return Ok(self.finish(traveler, outcome, None));
                }
                Some(event) => {
                    let kept = Journey { cursor_index: i, ..journey.clone() };
                    let outcome = StepOutcome::PausedForEvent {
                        at:    node.clone(),
                        spent: cum - paid,
                        event: event.clone(),
                    };
                    return Ok(self.finish(traveler, outcome, Some(kept)));
                }
                None => {
                    stop     = i;
                    stop_cum = cum;
                }
            }
        }

        // Only reachable when the cursor already sits on the destination,
        // i.e. a journey whose planned path is just the origin.
        let at = journey.destination_id.clone();
        let outcome = StepOutcome::Arrived { event: events.event_at(&at).cloned(), at, spent: 0 };
        Ok(self.finish(traveler, outcome, None))
    }

    /// Clear the traveler's journey without moving them or refunding anything.
    ///
    /// `None` when there is no journey; stopping twice is harmless.
    pub fn stop_journey(&self, traveler: &Traveler) -> Option<Commit> {
        traveler.journey.as_ref()?;
        Some(Commit {
            guard:  traveler.guard(),
            update: TravelerUpdate {
                location_id: traveler.location_id.clone(),
                stamina:     traveler.stamina,
                journey:     None,
            },
        })
    }

    // ── helpers ───────────────────────────────────────────────────────────────

    /// Cost from the origin to `path[i]`, derived from the index.
    fn cumulative(&self, journey: &Journey, i: usize) -> MovementResult<Cost> {
        if i == 0 {
            return Ok(0);
        }
        if i == journey.last_index() {
            return Ok(journey.total_cost);
        }
        let node = &journey.planned_path[i];
        let inconsistent = || MovementError::GraphInconsistency {
            from: node.clone(),
            to:   journey.destination_id.clone(),
        };
        let remaining = self.paths.path_cost(node, &journey.destination_id).ok_or_else(inconsistent)?;
        journey.total_cost.checked_sub(remaining).ok_or_else(inconsistent)
    }

    fn finish(&self, traveler: &Traveler, outcome: StepOutcome, journey: Option<Journey>) -> Step {
        debug!(
            traveler = %traveler.id,
            at       = %outcome.location(),
            spent    = outcome.spent(),
            phase    = ?outcome.phase(),
            "journey step"
        );
        let update = TravelerUpdate {
            location_id: outcome.location().clone(),
            stamina:     traveler.stamina.saturating_sub(outcome.spent()),
            journey,
        };
        Step { outcome, commit: Commit { guard: traveler.guard(), update } }
    }
}
