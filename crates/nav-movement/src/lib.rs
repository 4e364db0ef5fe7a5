//! `nav-movement` — journeys, travelers, and the resumable movement machine.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                          |
//! |--------------|-------------------------------------------------------------------|
//! | [`journey`]  | `Journey` (persisted layout), `MovementPhase`                     |
//! | [`traveler`] | `Traveler`, `TravelerUpdate`, `CommitGuard`, `Commit`             |
//! | [`machine`]  | `MovementMachine` — start / advance / stop, `StepOutcome`         |
//! | [`store`]    | `TravelerRepository` port, `CommitOutcome`, `MemoryTravelerStore` |
//! | [`error`]    | `MovementError`, `MovementResult<T>`                              |
//!
//! # Movement model (one bounded step per trigger)
//!
//! 1. `MovementMachine::start_journey` plans a path from the precomputed
//!    index and produces a commit that stores a `Journey` with cursor 0.
//! 2. `MovementMachine::advance_journey` walks the plan from `cursor + 1`
//!    until the traveler arrives, runs out of stamina, or hits an event, and
//!    produces one commit holding the whole step.
//! 3. Every commit carries a [`CommitGuard`]; the repository applies it only
//!    if the stored revision and journey cursor still match, so a duplicate
//!    or racing trigger becomes a no-op instead of a second deduction.
//!
//! The machine itself performs no I/O and holds no state between calls:
//! everything it needs is re-read from the persisted journey.

pub mod error;
pub mod journey;
pub mod machine;
pub mod store;
pub mod traveler;


pub use error::{MovementError, MovementResult};
pub use journey::{Journey, MovementPhase};
pub use machine::{MovementMachine, Step, StepOutcome};
pub use store::{CommitOutcome, MemoryTravelerStore, TravelerRepository};
pub use traveler::{Commit, CommitGuard, Traveler, TravelerUpdate};
