//! Persisted location records.
//!
//! These mirror the stored documents: each location owns its outgoing
//! connections.  Symmetry (`a -> b` and `b -> a` with equal cost) is a
//! convention maintained by `SetConnection`, not something the records
//! enforce.

use serde::{Deserialize, Serialize};

use nav_core::LocationId;

/// A scripted encounter attached to a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDescriptor {
    pub name: String,
    /// Text shown to the traveler when the encounter triggers.
    pub text: String,
    /// Forced events always halt a journey; optional ones offer continue/stop.
    pub forced: bool,
}

impl EventDescriptor {
    pub fn forced(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self { name: name.into(), text: text.into(), forced: true }
    }

    pub fn optional(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self { name: name.into(), text: text.into(), forced: false }
    }
}

/// One outgoing directed connection.
///
/// `cost` is signed because stored documents are not trusted: negative
/// values are rejected when the graph is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub target_id: LocationId,
    pub cost:      i64,
}

/// A location document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id:          LocationId,
    pub name:        String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub event:       Option<EventDescriptor>,
}

impl Location {
    /// A location with no connections and no event.
    pub fn new(id: impl Into<LocationId>, name: impl Into<String>) -> Self {
        Self {
            id:          id.into(),
            name:        name.into(),
            description: None,
            connections: Vec::new(),
            event:       None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_event(mut self, event: EventDescriptor) -> Self {
        self.event = Some(event);
        self
    }

    /// Insert or overwrite the outgoing connection to `target`.
    pub fn upsert_connection(&mut self, target: LocationId, cost: i64) {
        match self.connections.iter_mut().find(|c| c.target_id == target) {
            Some(existing) => existing.cost = cost,
            None => self.connections.push(Connection { target_id: target, cost }),
        }
    }

    #[inline]
    pub fn has_event(&self) -> bool {
        self.event.is_some()
    }

    /// The location's outgoing connections as free-standing edge records.
    pub fn edges(&self) -> impl Iterator<Item = EdgeRecord> + '_ {
        self.connections.iter().map(|c| EdgeRecord {
            from: self.id.clone(),
            to:   c.target_id.clone(),
            cost: c.cost,
        })
    }
}

/// A directed edge detached from its owning location document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub from: LocationId,
    pub to:   LocationId,
    pub cost: i64,
}

impl EdgeRecord {
    /// Both directions of an undirected connection.
    pub fn symmetric(a: &LocationId, b: &LocationId, cost: i64) -> [EdgeRecord; 2] {
        [
            EdgeRecord { from: a.clone(), to: b.clone(), cost },
            EdgeRecord { from: b.clone(), to: a.clone(), cost },
        ]
    }
}
