//! Chains per-leg plans into a full sortie under the move budget.

use crate::error::{PlanError, SegmentError};
use crate::models::{FlightPlan, FlightStatus, NoFlyZone, SkippedSegment, Waypoint};
use crate::route_engine::{LatticePlanner, SegmentRequest};
use crate::rules::{FlightRules, UnreachablePolicy};
use crate::tour::{build_insertion_tour, improve_tour, DistanceMatrix};

/// Reject inputs that must never reach the planner.
pub fn validate_inputs(
    waypoints: &[Waypoint],
    zones: &[NoFlyZone],
    rules: &FlightRules,
) -> Result<(), PlanError> {
    if waypoints.len() < 2 {
        return Err(PlanError::TooFewWaypoints(waypoints.len()));
    }
    if let Some(bad) = waypoints.iter().find(|wp| {
        !wp.position.is_finite() || wp.tolerance.is_some_and(|t| !(t.is_finite() && t > 0.0))
    }) {
        return Err(PlanError::InvalidWaypoint { id: bad.id.clone() });
    }
    if let Some(zone) = zones.iter().find(|zone| !zone.validate().is_empty()) {
        return Err(PlanError::DegenerateZone {
            zone: zone.id.clone(),
            vertices: zone.vertices().len(),
        });
    }
    let errors = rules.validate();
    if !errors.is_empty() {
        return Err(PlanError::InvalidRules(errors));
    }
    Ok(())
}

fn check_order(order: &[usize], expected: usize) -> Result<(), PlanError> {
    let mut seen = vec![false; expected];
    for &idx in order {
        if idx >= expected || seen[idx] {
            return Err(PlanError::InvalidOrder { expected });
        }
        seen[idx] = true;
    }
    if order.len() != expected {
        return Err(PlanError::InvalidOrder { expected });
    }
    Ok(())
}

/// Fly `order` as a closed cycle, one planner call per consecutive pair.
///
/// Each leg starts where the previous one actually arrived. Emission stops at
/// `rules.max_moves`; what was emitted up to that point is kept.
pub fn assemble_flight(
    waypoints: &[Waypoint],
    order: &[usize],
    zones: &[NoFlyZone],
    rules: &FlightRules,
) -> Result<FlightPlan, PlanError> {
    validate_inputs(waypoints, zones, rules)?;
    check_order(order, waypoints.len())?;

    let planner = match LatticePlanner::new(zones, rules) {
        Ok(planner) => planner,
        Err(SegmentError::InvalidRules(errors)) => return Err(PlanError::InvalidRules(errors)),
        Err(other) => return Err(PlanError::InvalidRules(vec![other.to_string()])),
    };
    let n = order.len();

    let mut instructions = Vec::new();
    let mut visited = vec![false; waypoints.len()];
    let mut skipped = Vec::new();
    let mut nodes_expanded = 0usize;
    let mut out_of_moves = false;

    visited[order[0]] = true;
    let mut position = waypoints[order[0]].position;
    // Last waypoint actually reached; skipped legs leave it unchanged
    let mut from = order[0];

    for leg in 0..n {
        let to = order[(leg + 1) % n];
        let target = &waypoints[to];
        let request = SegmentRequest {
            from_waypoint: from,
            to_waypoint: to,
            start: position,
            target: target.position,
            tolerance: target.tolerance.unwrap_or(rules.arrival_tolerance),
            tag: target.tag.clone(),
        };

        let segment = match planner.plan(&request) {
            Ok(segment) => segment,
            Err(err) => {
                nodes_expanded += err.nodes_expanded();
                match rules.on_unreachable {
                    UnreachablePolicy::Abort => {
                        return Err(PlanError::Segment {
                            leg,
                            from: waypoints[from].id.clone(),
                            to: target.id.clone(),
                            source: err,
                        });
                    }
                    UnreachablePolicy::Skip => {
                        tracing::warn!(
                            leg,
                            from = %waypoints[from].id,
                            to = %target.id,
                            "skipping leg: {}",
                            err
                        );
                        skipped.push(SkippedSegment {
                            leg,
                            from_waypoint: from,
                            to_waypoint: to,
                            reason: err.to_string(),
                        });
                        continue;
                    }
                }
            }
        };
        nodes_expanded += segment.nodes_expanded;

        let remaining = rules.max_moves - instructions.len();
        if segment.move_count() > remaining {
            tracing::warn!(
                leg,
                to = %target.id,
                needed = segment.move_count(),
                remaining,
                "move budget exhausted"
            );
            instructions.extend(segment.instructions.into_iter().take(remaining));
            out_of_moves = true;
            break;
        }

        position = segment.arrival;
        from = to;
        visited[to] = true;
        instructions.extend(segment.instructions);
    }

    let status = if out_of_moves {
        FlightStatus::OutOfMoves
    } else if skipped.is_empty() {
        FlightStatus::Complete
    } else {
        FlightStatus::Partial
    };

    let plan = FlightPlan {
        order: order.to_vec(),
        move_count: instructions.len(),
        instructions,
        visited,
        status,
        skipped,
        nodes_expanded,
    };
    tracing::info!(
        waypoints = waypoints.len(),
        moves = plan.move_count,
        unvisited = plan.unvisited().len(),
        nodes_expanded = plan.nodes_expanded,
        status = ?plan.status,
        "sortie assembled"
    );
    Ok(plan)
}

/// Order the waypoints and fly the resulting cycle from waypoint 0.
pub fn plan_flight(
    waypoints: &[Waypoint],
    zones: &[NoFlyZone],
    rules: &FlightRules,
) -> Result<FlightPlan, PlanError> {
    validate_inputs(waypoints, zones, rules)?;

    let points: Vec<_> = waypoints.iter().map(|wp| wp.position).collect();
    let matrix = DistanceMatrix::from_points(&points);
    let mut order = build_insertion_tour(&matrix);
    improve_tour(&mut order, &matrix, 0);

    assemble_flight(waypoints, &order, zones, rules)
}
