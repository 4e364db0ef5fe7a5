//! Outbound notifications for movement results.

use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use nav_core::{Cost, LocationId, TravelerId};
use nav_graph::WorldSnapshot;
use nav_movement::{StepOutcome, Traveler};

/// Who a notification is addressed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TravelerContext {
    pub traveler_id: TravelerId,
    pub name:        String,
}

impl From<&Traveler> for TravelerContext {
    fn from(t: &Traveler) -> Self {
        Self { traveler_id: t.id.clone(), name: t.name.clone() }
    }
}

/// A follow-up action offered with a paused journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveAction {
    Continue,
    Stop,
}

/// The actions offered when a journey pauses on an optional event.
pub const CONTINUE_STOP: &[MoveAction] = &[MoveAction::Continue, MoveAction::Stop];

#[derive(Debug, Error)]
#[error("notification delivery failed: {0}")]
pub struct NotifyError(pub String);

/// Delivery channel for movement results (chat follow-up, log, test buffer).
///
/// Delivery happens after the step has been committed; a failure is logged
/// by the caller and never rolls the commit back.
pub trait NotificationSink: Send + Sync {
    fn send(
        &self,
        to:      &TravelerContext,
        text:    &str,
        actions: Option<&[MoveAction]>,
    ) -> Result<(), NotifyError>;
}

impl<T: NotificationSink + ?Sized> NotificationSink for Arc<T> {
    fn send(
        &self,
        to:      &TravelerContext,
        text:    &str,
        actions: Option<&[MoveAction]>,
    ) -> Result<(), NotifyError> {
        (**self).send(to, text, actions)
    }
}

/// A [`NotificationSink`] that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl NotificationSink for NoopSink {
    fn send(&self, _: &TravelerContext, _: &str, _: Option<&[MoveAction]>) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// One delivered notification, as captured by [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub traveler_id: TravelerId,
    pub text:        String,
    pub actions:     Vec<MoveAction>,
}

/// Keeps every notification in memory, in delivery order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything delivered so far.
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.sent.lock())
    }

    pub fn len(&self) -> usize {
        self.sent.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NotificationSink for RecordingSink {
    fn send(
        &self,
        to:      &TravelerContext,
        text:    &str,
        actions: Option<&[MoveAction]>,
    ) -> Result<(), NotifyError> {
        self.sent.lock().push(Notification {
            traveler_id: to.traveler_id.clone(),
            text:        text.to_owned(),
            actions:     actions.map(<[MoveAction]>::to_vec).unwrap_or_default(),
        });
        Ok(())
    }
}

// ── Message text ──────────────────────────────────────────────────────────────

fn place<'a>(world: &'a WorldSnapshot, id: &'a LocationId) -> &'a str {
    world.display_name(id).unwrap_or(id.as_str())
}

/// Text for a committed step.  `stamina` is the value after the deduction.
pub(crate) fn step_message(
    world:    &WorldSnapshot,
    traveler: &str,
    outcome:  &StepOutcome,
    stamina:  Cost,
) -> String {
    let at    = place(world, outcome.location());
    let spent = outcome.spent();
    let mut text = match outcome {
        StepOutcome::Arrived { .. } => {
            format!("{traveler} arrived at {at}. Used {spent} stamina, {stamina} left.")
        }
        StepOutcome::Exhausted { .. } => format!(
            "{traveler} is too tired to go on and rests at {at}. Used {spent} stamina, {stamina} left."
        ),
        StepOutcome::PausedForEvent { .. } => format!(
            "{traveler} pauses at {at}. Used {spent} stamina so far, {stamina} left."
        ),
        StepOutcome::HaltedByForcedEvent { .. } => format!(
            "{traveler} is stopped at {at} and cannot go on. Used {spent} stamina, {stamina} left."
        ),
    };
    if let Some(event) = outcome.event() {
        text.push('\n');
        text.push_str(&event.text);
    }
    text
}

pub(crate) fn stop_message(world: &WorldSnapshot, traveler: &str, at: &LocationId) -> String {
    format!("{traveler} ends the journey at {}.", place(world, at))
}
