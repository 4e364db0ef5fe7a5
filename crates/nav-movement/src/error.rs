use nav_core::{LocationId, TravelerId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MovementError {
    /// The destination cannot be reached from the traveler's location.
    #[error("no path from {from} to {to}")]
    NoPath { from: LocationId, to: LocationId },

    /// A planned segment has no index entry, or its cumulative cost is not
    /// monotone along the plan.  Fatal for the step; nothing is committed.
    #[error("path index has no consistent entry for {from} -> {to}")]
    GraphInconsistency { from: LocationId, to: LocationId },

    /// Continue/stop without a matching journey, or a lost compare-and-set.
    #[error("traveler {0} has no matching journey")]
    StaleJourney(TravelerId),

    #[error("journey of traveler {traveler} is malformed: {reason}")]
    CorruptJourney { traveler: TravelerId, reason: &'static str },
}

pub type MovementResult<T> = Result<T, MovementError>;
