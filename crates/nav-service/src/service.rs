//! The `NavigationService`: move requests, ticket execution, and world edits.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use nav_core::{Cost, LocationId, NavConfig, RepositoryError, TravelerId};
use nav_graph::{EventTable, GraphError, PathLookup, PlannedRoute, WorldSnapshot};
use nav_movement::{
    CommitOutcome, MovementError, MovementMachine, StepOutcome, Traveler, TravelerRepository,
};

use crate::notify::{self, CONTINUE_STOP};
use crate::{
    ConnectionMutationService, LocationRepository, MoveAction, NavError, NavResult,
    NotificationSink, TravelerContext,
};

// ── Request / response types ──────────────────────────────────────────────────

/// Acknowledgment of an accepted move or continue.
///
/// Pass it to [`NavigationService::execute`] to compute and notify the step.
/// A ticket executes at most once: it names the exact traveler revision and
/// journey cursor it was issued against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveTicket {
    pub traveler_id: TravelerId,
    pub revision:    u64,
    pub cursor:      usize,
}

/// Result of [`NavigationService::stop_move`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    /// The journey was cleared; the traveler stays at `at`.
    Stopped { at: LocationId },
    /// Nothing to stop (already idle, or a concurrent step cleared it first).
    NoJourney,
}

/// One entry of the move menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub id:          LocationId,
    pub name:        String,
    pub description: Option<String>,
}

// ── NavigationService ─────────────────────────────────────────────────────────

/// Front door of the engine.
///
/// Every trigger is a stateless request: load the traveler, compute at most
/// one bounded step against the snapshot installed right now, commit it with
/// one compare-and-set, then notify.  Nothing about a journey lives in memory
/// between requests.
///
/// Moves are split into *accept* ([`request_move`](Self::request_move),
/// [`continue_move`](Self::continue_move)), which validates and returns a
/// [`MoveTicket`] quickly, and *execute* ([`execute`](Self::execute)), which a
/// transport may run later on a worker.
///
/// Create via [`NavigationServiceBuilder`][crate::NavigationServiceBuilder].
pub struct NavigationService<T, L, N>
where
    T: TravelerRepository,
    L: LocationRepository,
    N: NotificationSink,
{
    pub(crate) config:      NavConfig,
    pub(crate) travelers:   T,
    pub(crate) locations:   Arc<L>,
    pub(crate) sink:        N,
    pub(crate) connections: ConnectionMutationService<L>,
}

impl<T, L, N> NavigationService<T, L, N>
where
    T: TravelerRepository,
    L: LocationRepository,
    N: NotificationSink,
{
    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    /// The world snapshot in force right now.
    pub fn snapshot(&self) -> Arc<WorldSnapshot> {
        self.connections.cell().load()
    }

    pub fn travelers(&self) -> &T {
        &self.travelers
    }

    pub fn traveler(&self, id: &TravelerId) -> NavResult<Traveler> {
        self.load(id)
    }

    // ── Travelers ─────────────────────────────────────────────────────────

    /// Create an idle traveler at `origin` with `config.max_stamina` stamina.
    pub fn register_traveler(
        &self,
        id:     impl Into<TravelerId>,
        name:   impl Into<String>,
        origin: impl Into<LocationId>,
    ) -> NavResult<Traveler> {
        let origin = origin.into();
        if !self.snapshot().contains(&origin) {
            return Err(GraphError::UnknownLocation(origin).into());
        }
        let traveler = Traveler::new(id, name, origin, self.config.max_stamina);
        self.travelers.insert(&traveler)?;
        info!(traveler = %traveler.id, at = %traveler.location_id, "traveler registered");
        Ok(traveler)
    }

    /// Let the traveler pick `location` as a destination from now on.
    pub fn discover(&self, traveler_id: &TravelerId, location: &LocationId) -> NavResult<()> {
        if self.locations.location(location)?.is_none() {
            return Err(GraphError::UnknownLocation(location.clone()).into());
        }
        self.travelers.discover(traveler_id, location)?;
        Ok(())
    }

    /// The traveler's known locations, for the move menu.
    ///
    /// Locations that no longer exist are skipped.
    pub fn known_destinations(&self, traveler_id: &TravelerId) -> NavResult<Vec<Destination>> {
        let traveler = self.load(traveler_id)?;
        let mut out = Vec::with_capacity(traveler.known_locations.len());
        for id in &traveler.known_locations {
            if let Some(loc) = self.locations.location(id)? {
                out.push(Destination { id: loc.id, name: loc.name, description: loc.description });
            }
        }
        Ok(out)
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// The path a move to `destination` would take.  Persists nothing.
    pub fn route_preview(
        &self,
        traveler_id: &TravelerId,
        destination: &LocationId,
    ) -> NavResult<PlannedRoute> {
        let traveler = self.load(traveler_id)?;
        self.snapshot().plan(&traveler.location_id, destination).ok_or_else(|| {
            MovementError::NoPath { from: traveler.location_id.clone(), to: destination.clone() }
                .into()
        })
    }

    /// Cost of the direct connection `from -> to`, if there is one.
    pub fn direct_cost(&self, from: &LocationId, to: &LocationId) -> Option<Cost> {
        self.snapshot().direct_cost(from, to)
    }

    // ── Movement triggers ─────────────────────────────────────────────────

    /// Accept a move: validate the destination, plan the journey, and persist
    /// it at cursor 0.  Any previous journey is replaced without refund.
    pub fn request_move(
        &self,
        traveler_id: &TravelerId,
        destination: &LocationId,
    ) -> NavResult<MoveTicket> {
        let traveler = self.load(traveler_id)?;
        if !traveler.knows(destination) {
            return Err(NavError::UnknownDestination {
                traveler: traveler.id.clone(),
                location: destination.clone(),
            });
        }

        let world  = self.snapshot();
        let commit = MovementMachine::new(&*world).start_journey(&traveler, destination)?;
        match self.travelers.commit(&traveler.id, &commit.guard, &commit.update)? {
            CommitOutcome::Applied { revision } => {
                info!(traveler = %traveler.id, to = %destination, "move accepted");
                Ok(MoveTicket { traveler_id: traveler.id, revision, cursor: 0 })
            }
            CommitOutcome::Stale => {
                warn!(traveler = %traveler.id, "move request lost a concurrent update");
                Err(NavError::stale(&traveler.id))
            }
        }
    }

    /// Accept a continue for a journey paused on an optional event.
    ///
    /// Anything else (idle, or a journey not yet started) is a benign
    /// `StaleJourney`.
    pub fn continue_move(&self, traveler_id: &TravelerId) -> NavResult<MoveTicket> {
        let traveler = self.load(traveler_id)?;
        match &traveler.journey {
            Some(j) if j.cursor_index > 0 => Ok(MoveTicket {
                traveler_id: traveler.id.clone(),
                revision:    traveler.revision,
                cursor:      j.cursor_index,
            }),
            _ => {
                warn!(traveler = %traveler.id, "continue without a paused journey");
                Err(NavError::stale(&traveler.id))
            }
        }
    }

    /// End the traveler's journey where they stand.  No further cost.
    ///
    /// Idempotent: with no journey, or when a concurrent step wins the race,
    /// returns `StopOutcome::NoJourney`.
    pub fn stop_move(&self, traveler_id: &TravelerId) -> NavResult<StopOutcome> {
        let traveler = self.load(traveler_id)?;
        let world    = self.snapshot();
        let Some(commit) = MovementMachine::new(&*world).stop_journey(&traveler) else {
            debug!(traveler = %traveler.id, "stop with no journey");
            return Ok(StopOutcome::NoJourney);
        };

        match self.travelers.commit(&traveler.id, &commit.guard, &commit.update)? {
            CommitOutcome::Applied { .. } => {
                let at = commit.update.location_id;
                info!(traveler = %traveler.id, at = %at, "journey stopped");
                let text = notify::stop_message(&world, &traveler.name, &at);
                self.deliver(&traveler, &text, None);
                Ok(StopOutcome::Stopped { at })
            }
            CommitOutcome::Stale => {
                warn!(traveler = %traveler.id, "stop lost a concurrent update");
                Ok(StopOutcome::NoJourney)
            }
        }
    }

    /// Compute, commit, and notify one step for an accepted ticket.
    ///
    /// Fails with a benign `StaleJourney` if the traveler moved on since the
    /// ticket was issued, or if another execution of the same ticket commits
    /// first.  A `GraphInconsistency` aborts the step with nothing written.
    pub fn execute(&self, ticket: &MoveTicket) -> NavResult<StepOutcome> {
        let traveler = self.load(&ticket.traveler_id)?;
        let current = traveler.revision == ticket.revision
            && traveler.journey.as_ref().map(|j| j.cursor_index) == Some(ticket.cursor);
        if !current {
            warn!(traveler = %traveler.id, revision = ticket.revision, "stale move ticket");
            return Err(NavError::stale(&traveler.id));
        }

        let world  = self.snapshot();
        let events = self.remaining_events(&world, &traveler)?;
        let step = match MovementMachine::new(&*world).advance_journey(&traveler, &events) {
            Ok(step) => step,
            Err(err @ MovementError::GraphInconsistency { .. }) => {
                error!(
                    traveler   = %traveler.id,
                    generation = world.generation(),
                    error      = %err,
                    "journey step aborted"
                );
                return Err(err.into());
            }
            Err(err) => return Err(err.into()),
        };

        match self.travelers.commit(&traveler.id, &step.commit.guard, &step.commit.update)? {
            CommitOutcome::Applied { revision } => {
                info!(
                    traveler = %traveler.id,
                    at       = %step.outcome.location(),
                    spent    = step.outcome.spent(),
                    phase    = ?step.outcome.phase(),
                    revision,
                    "journey step committed"
                );
                let stamina = step.commit.update.stamina;
                let text    = notify::step_message(&world, &traveler.name, &step.outcome, stamina);
                let actions = matches!(step.outcome, StepOutcome::PausedForEvent { .. })
                    .then_some(CONTINUE_STOP);
                self.deliver(&traveler, &text, actions);
                Ok(step.outcome)
            }
            CommitOutcome::Stale => {
                warn!(traveler = %traveler.id, "journey step lost a concurrent update");
                Err(NavError::stale(&traveler.id))
            }
        }
    }

    // ── World edits ───────────────────────────────────────────────────────

    /// Connect `a` and `b` both ways and rebuild before returning.
    pub fn set_connection(
        &self,
        a:    &LocationId,
        b:    &LocationId,
        cost: i64,
    ) -> NavResult<Arc<WorldSnapshot>> {
        self.connections.set_symmetric_edge(a, b, cost)
    }

    /// Rebuild the snapshot from the repository, e.g. after an out-of-band
    /// location edit.
    pub fn reload_world(&self) -> NavResult<Arc<WorldSnapshot>> {
        self.connections.rebuild()
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn load(&self, id: &TravelerId) -> NavResult<Traveler> {
        self.travelers
            .load(id)?
            .ok_or_else(|| RepositoryError::TravelerNotFound(id.clone()).into())
    }

    /// Descriptors for the event-flagged nodes still ahead on the journey.
    fn remaining_events(&self, world: &WorldSnapshot, traveler: &Traveler) -> NavResult<EventTable> {
        let mut table = EventTable::new();
        let Some(journey) = &traveler.journey else {
            return Ok(table);
        };
        if journey.check().is_err() {
            // advance_journey reports the precise problem.
            return Ok(table);
        }
        for id in journey.remaining().iter().filter(|id| world.has_event(id)) {
            if let Some(event) = self.locations.event_descriptor(id)? {
                table.insert(id.clone(), event);
            }
        }
        Ok(table)
    }

    fn deliver(&self, traveler: &Traveler, text: &str, actions: Option<&[MoveAction]>) {
        let ctx = TravelerContext::from(traveler);
        if let Err(err) = self.sink.send(&ctx, text, actions) {
            warn!(traveler = %traveler.id, error = %err, "notification not delivered");
        }
    }
}
