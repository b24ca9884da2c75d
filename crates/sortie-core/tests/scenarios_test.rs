//! End-to-end planning scenarios.
//!
//! Run with: cargo test -p sortie-core --test scenarios_test

use sortie_core::spatial::{euclidean, segments_intersect};
use sortie_core::{
    build_insertion_tour, improve_tour, plan_flight, plan_segment, DistanceMatrix, FlightRules,
    FlightStatus, NoFlyZone, Point, SegmentRequest, Waypoint,
};

fn rectangle(id: &str, min: Point, max: Point) -> NoFlyZone {
    NoFlyZone::new(
        id,
        vec![
            Point::new(min.lon, min.lat),
            Point::new(max.lon, min.lat),
            Point::new(max.lon, max.lat),
            Point::new(min.lon, max.lat),
            Point::new(min.lon, min.lat),
        ],
    )
}

fn leg(start: Point, target: Point, tolerance: f64) -> SegmentRequest {
    SegmentRequest {
        from_waypoint: 0,
        to_waypoint: 1,
        start,
        target,
        tolerance,
        tag: None,
    }
}

fn assert_clear_of(instructions: &[sortie_core::Instruction], zones: &[NoFlyZone]) {
    for (idx, inst) in instructions.iter().enumerate() {
        for zone in zones {
            for (a, b) in zone.edges() {
                assert!(
                    !segments_intersect(inst.from, inst.to, a, b),
                    "move {idx} crosses zone {}",
                    zone.id
                );
            }
        }
    }
}

/// Triangle without obstacles keeps its natural cycle in either orientation.
#[test]
fn scenario_a_triangle_keeps_natural_order() {
    let points = [
        Point::new(0.0, 0.0),
        Point::new(0.002, 0.0),
        Point::new(0.001, 0.0015),
    ];
    let matrix = DistanceMatrix::from_points(&points);
    let mut order = build_insertion_tour(&matrix);
    improve_tour(&mut order, &matrix, 0);

    assert!(
        order == vec![0, 1, 2] || order == vec![0, 2, 1],
        "unexpected order {order:?}"
    );
    let perimeter = matrix.get(0, 1) + matrix.get(1, 2) + matrix.get(2, 0);
    assert!((matrix.cycle_length(&order) - perimeter).abs() < 1e-15);
}

/// Short straight leg on an axis.
#[test]
fn scenario_b_direct_leg_is_near_optimal() {
    let rules = FlightRules {
        move_length: 0.0003,
        arrival_tolerance: 0.0002,
        ..FlightRules::default()
    };
    let start = Point::new(-3.1880, 55.9440);
    let target = Point::new(-3.1880 + 0.0009, 55.9440);
    let segment = plan_segment(&leg(start, target, 0.0002), &[], &rules).unwrap();

    let moves = segment.move_count();
    assert!((3..=4).contains(&moves), "took {moves} moves");

    let flown: f64 = segment.instructions.iter().map(|inst| inst.length()).sum();
    assert!(flown - euclidean(start, target) <= rules.move_length + 1e-12);

    assert_eq!(segment.instructions[0].from, start);
    let last = segment.instructions.last().unwrap();
    assert!(euclidean(last.to, target) < 0.0002);
}

/// Target directly behind a rectangle: the path goes around a corner.
#[test]
fn scenario_c_detours_around_rectangle() {
    let rules = FlightRules {
        max_expansions: 200_000,
        ..FlightRules::default()
    };
    let zone = rectangle("block", Point::new(0.0009, -0.0002), Point::new(0.0011, 0.0002));
    let start = Point::new(0.0, 0.0);
    let target = Point::new(0.002, 0.0);
    let zones = vec![zone];

    let segment = plan_segment(&leg(start, target, 0.0002), &zones, &rules).unwrap();

    assert_clear_of(&segment.instructions, &zones);
    assert_eq!(segment.instructions[0].from, start);
    assert!(euclidean(segment.arrival, target) < 0.0002);
    assert!(
        segment
            .instructions
            .iter()
            .any(|inst| inst.to.lat.abs() > 0.0002),
        "path never cleared the rectangle's corners"
    );
}

/// Budget of 5 for a sortie needing 20 moves.
#[test]
fn scenario_d_budget_truncates_and_leaves_target_unvisited() {
    let waypoints = vec![
        Waypoint::new("start", 0.0, 0.0),
        Waypoint::new("far", 0.003, 0.0).with_tag("far.away.sensor"),
    ];
    let rules = FlightRules {
        max_moves: 5,
        ..FlightRules::default()
    };
    let plan = plan_flight(&waypoints, &[], &rules).unwrap();

    assert_eq!(plan.status, FlightStatus::OutOfMoves);
    assert!(!plan.is_complete());
    assert_eq!(plan.move_count, 5);
    assert_eq!(plan.instructions.len(), 5);
    assert_eq!(plan.unvisited(), vec![1]);
    assert!(plan.instructions.iter().all(|inst| inst.tag.is_none()));
    assert!(!plan.returned_to_start());
}

#[test]
fn full_sortie_around_a_building_stays_clear() {
    let waypoints = vec![
        Waypoint::new("start", 0.0, 0.0),
        Waypoint::new("a", 0.002, 0.0005).with_tag("a.a.a"),
        Waypoint::new("b", 0.0025, -0.001).with_tag("b.b.b"),
        Waypoint::new("c", 0.0005, -0.0012).with_tag("c.c.c"),
    ];
    let zones = vec![rectangle(
        "library",
        Point::new(0.00105, -0.00045),
        Point::new(0.00135, -0.00015),
    )];
    let rules = FlightRules {
        max_expansions: 200_000,
        ..FlightRules::default()
    };

    let plan = plan_flight(&waypoints, &zones, &rules).unwrap();

    assert_eq!(plan.status, FlightStatus::Complete);
    assert_eq!(plan.order[0], 0);
    assert_eq!(plan.visited, vec![true; 4]);
    assert!(plan.returned_to_start());
    assert!(plan.move_count <= rules.max_moves);
    assert_clear_of(&plan.instructions, &zones);

    assert_eq!(plan.instructions[0].from, waypoints[0].position);
    for pair in plan.instructions.windows(2) {
        assert_eq!(pair[0].to, pair[1].from, "instructions must chain");
    }

    let mut tags: Vec<_> = plan
        .instructions
        .iter()
        .filter_map(|inst| inst.tag.clone())
        .collect();
    tags.sort();
    assert_eq!(tags, vec!["a.a.a", "b.b.b", "c.c.c"]);

    for inst in plan.instructions.iter().filter(|inst| inst.waypoint.is_some()) {
        let wp = &waypoints[inst.waypoint.unwrap()];
        assert!(euclidean(inst.to, wp.position) < rules.arrival_tolerance);
    }
}

#[test]
fn per_waypoint_tolerance_overrides_rules() {
    let waypoints = vec![
        Waypoint::new("start", 0.0, 0.0),
        Waypoint::new("loose", 0.0011, 0.0).with_tolerance(0.00035),
    ];
    let plan = plan_flight(&waypoints, &[], &FlightRules::default()).unwrap();
    assert!(plan.is_complete());
    let arrival = plan
        .instructions
        .iter()
        .find(|inst| inst.waypoint == Some(1))
        .unwrap();
    assert!(euclidean(arrival.to, waypoints[1].position) < 0.00035);
}

#[test]
fn plan_serializes_to_json() {
    let waypoints = vec![
        Waypoint::new("start", 0.0, 0.0),
        Waypoint::new("east", 0.0006, 0.0),
    ];
    let plan = plan_flight(&waypoints, &[], &FlightRules::default()).unwrap();
    let json = serde_json::to_value(&plan).unwrap();
    assert_eq!(json["status"], "complete");
    assert_eq!(json["move_count"], 4);
}
