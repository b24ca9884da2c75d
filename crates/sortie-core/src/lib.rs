//! Sortie planning core: waypoint tour ordering and obstacle-aware lattice
//! routing for a fixed-step survey drone.

pub mod assembler;
pub mod error;
pub mod models;
pub mod route_engine;
pub mod rules;
pub mod spatial;
pub mod tour;

pub use assembler::{assemble_flight, plan_flight, validate_inputs};
pub use error::{PlanError, SegmentError};
pub use models::{
    BoundingBox, FlightPlan, FlightSegment, FlightStatus, Instruction, NoFlyZone, Point,
    SkippedSegment, Waypoint,
};
pub use route_engine::{plan_segment, LatticePlanner, SegmentRequest, StepVector};
pub use rules::{FlightRules, UnreachablePolicy};
pub use tour::{
    adjacent_swap, build_insertion_tour, improve_tour, optimize_order, rotate_to_start, two_opt,
    DistanceMatrix, ImprovementStats,
};
