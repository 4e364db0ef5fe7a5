use nav_core::{CoreError, LocationId, RepositoryError, TravelerId};
use nav_graph::GraphError;
use nav_movement::MovementError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NavError {
    #[error("traveler {traveler} has not discovered {location}")]
    UnknownDestination { traveler: TravelerId, location: LocationId },

    #[error(transparent)]
    Movement(#[from] MovementError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("navigation configuration error: {0}")]
    Config(#[from] CoreError),
}

impl NavError {
    /// A stale or duplicate trigger.  Callers answer with a quiet no-op
    /// rather than a failure message.
    pub fn is_benign(&self) -> bool {
        matches!(self, Self::Movement(MovementError::StaleJourney(_)))
    }

    pub(crate) fn stale(traveler: &TravelerId) -> Self {
        Self::Movement(MovementError::StaleJourney(traveler.clone()))
    }
}

pub type NavResult<T> = Result<T, NavError>;
