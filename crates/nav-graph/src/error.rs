//! Graph-subsystem error type.

use thiserror::Error;

use nav_core::{LocationId, NodeId};

/// Errors produced by `nav-graph`.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("connection {from} -> {to} has negative cost {cost}")]
    NegativeCost { from: LocationId, to: LocationId, cost: i64 },

    #[error("connection {from} -> {to} cost {cost} exceeds the maximum of {max}", max = crate::MAX_EDGE_COST)]
    CostTooHigh { from: LocationId, to: LocationId, cost: i64 },

    #[error("location {0} cannot connect to itself")]
    SelfLoop(LocationId),

    #[error("location {0} is not part of the world")]
    UnknownLocation(LocationId),

    #[error("location {0} is defined more than once")]
    DuplicateLocation(LocationId),

    #[error("world has {0} locations, more than a NodeId can address")]
    TooManyLocations(usize),

    #[error("no route from {from} to {to}")]
    NoRoute { from: NodeId, to: NodeId },

    #[error("node {0} not found in graph")]
    NodeNotFound(NodeId),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(String),
}

pub type GraphResult<T> = Result<T, GraphError>;
