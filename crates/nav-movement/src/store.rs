//! The traveler repository port and its in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use nav_core::{LocationId, RepoResult, RepositoryError, TravelerId};

use crate::{CommitGuard, Traveler, TravelerUpdate};

/// Result of a guarded commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Written; the record is now at `revision`.
    Applied { revision: u64 },
    /// The stored revision or journey cursor no longer matched the guard.
    /// Nothing was written.
    Stale,
}

impl CommitOutcome {
    #[inline]
    pub fn is_applied(self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// Persistence for traveler records.
///
/// `commit` is the only write path for movement state and must be atomic:
/// compare `guard` against the stored record and apply `update` (bumping the
/// revision) only if both the revision and the journey cursor match.
pub trait TravelerRepository: Send + Sync {
    fn load(&self, id: &TravelerId) -> RepoResult<Option<Traveler>>;

    /// Store a new traveler.  Fails with `DuplicateTraveler` if the id exists.
    fn insert(&self, traveler: &Traveler) -> RepoResult<()>;

    fn commit(
        &self,
        id:     &TravelerId,
        guard:  &CommitGuard,
        update: &TravelerUpdate,
    ) -> RepoResult<CommitOutcome>;

    /// Add `location` to the traveler's known set.  Does not bump the revision.
    fn discover(&self, id: &TravelerId, location: &LocationId) -> RepoResult<()>;
}

impl<T: TravelerRepository + ?Sized> TravelerRepository for Arc<T> {
    fn load(&self, id: &TravelerId) -> RepoResult<Option<Traveler>> {
        (**self).load(id)
    }

    fn insert(&self, traveler: &Traveler) -> RepoResult<()> {
        (**self).insert(traveler)
    }

    fn commit(
        &self,
        id:     &TravelerId,
        guard:  &CommitGuard,
        update: &TravelerUpdate,
    ) -> RepoResult<CommitOutcome> {
        (**self).commit(id, guard, update)
    }

    fn discover(&self, id: &TravelerId, location: &LocationId) -> RepoResult<()> {
        (**self).discover(id, location)
    }
}

// ── MemoryTravelerStore ───────────────────────────────────────────────────────

/// `HashMap`-backed [`TravelerRepository`].  One mutex makes every commit a
/// single compare-and-set.
#[derive(Debug, Default)]
pub struct MemoryTravelerStore {
    travelers: Mutex<HashMap<TravelerId, Traveler>>,
}

impl MemoryTravelerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.travelers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TravelerRepository for MemoryTravelerStore {
    fn load(&self, id: &TravelerId) -> RepoResult<Option<Traveler>> {
        Ok(self.travelers.lock().get(id).cloned())
    }

    fn insert(&self, traveler: &Traveler) -> RepoResult<()> {
        let mut travelers = self.travelers.lock();
        if travelers.contains_key(&traveler.id) {
            return Err(RepositoryError::DuplicateTraveler(traveler.id.clone()));
        }
        travelers.insert(traveler.id.clone(), traveler.clone());
        Ok(())
    }

    fn commit(
        &self,
        id:     &TravelerId,
        guard:  &CommitGuard,
        update: &TravelerUpdate,
    ) -> RepoResult<CommitOutcome> {
        let mut travelers = self.travelers.lock();
        let traveler = travelers
            .get_mut(id)
            .ok_or_else(|| RepositoryError::TravelerNotFound(id.clone()))?;

        if traveler.guard() != *guard {
            return Ok(CommitOutcome::Stale);
        }
        traveler.apply(update);
        Ok(CommitOutcome::Applied { revision: traveler.revision })
    }

    fn discover(&self, id: &TravelerId, location: &LocationId) -> RepoResult<()> {
        let mut travelers = self.travelers.lock();
        let traveler = travelers
            .get_mut(id)
            .ok_or_else(|| RepositoryError::TravelerNotFound(id.clone()))?;
        traveler.discover(location.clone());
        Ok(())
    }
}
