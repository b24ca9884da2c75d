//! Planning failures.

use thiserror::Error;

/// Why a single leg could not be planned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SegmentError {
    /// The open set emptied before reaching the target.
    #[error("no collision-free path on the lattice ({nodes_expanded} nodes expanded)")]
    Unreachable { nodes_expanded: usize },
    /// The search hit its expansion cap.
    #[error("gave up after expanding {nodes_expanded} nodes")]
    ExpansionLimit { nodes_expanded: usize },
    #[error("invalid flight rules: {}", .0.join("; "))]
    InvalidRules(Vec<String>),
    #[error("invalid leg request: {0}")]
    InvalidRequest(String),
}

impl SegmentError {
    pub fn nodes_expanded(&self) -> usize {
        match self {
            Self::Unreachable { nodes_expanded } | Self::ExpansionLimit { nodes_expanded } => {
                *nodes_expanded
            }
            Self::InvalidRules(_) | Self::InvalidRequest(_) => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error("need at least 2 waypoints, got {0}")]
    TooFewWaypoints(usize),
    #[error("waypoint {id} has non-finite coordinates or a non-positive tolerance")]
    InvalidWaypoint { id: String },
    #[error("no-fly zone {zone} is degenerate ({vertices} distinct vertices, or a non-finite vertex)")]
    DegenerateZone { zone: String, vertices: usize },
    #[error("invalid flight rules: {}", .0.join("; "))]
    InvalidRules(Vec<String>),
    #[error("tour order is not a permutation of {expected} waypoints")]
    InvalidOrder { expected: usize },
    #[error("leg {leg} from {from} to {to}: {source}")]
    Segment {
        leg: usize,
        from: String,
        to: String,
        #[source]
        source: SegmentError,
    },
}
