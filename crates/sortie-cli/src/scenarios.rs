//! Seeded random missions for trying the planner without a mission file.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sortie_core::{BoundingBox, FlightRules, Point, Waypoint};

use crate::mission::{Mission, SurveyPoint};

/// Survey area around George Square, Edinburgh.
pub const CENTRAL_AREA: BoundingBox = BoundingBox {
    min_lon: -3.192473,
    min_lat: 55.942617,
    max_lon: -3.184319,
    max_lat: 55.946233,
};

/// Keep sampled points this far inside the box edges (degrees).
const EDGE_MARGIN: f64 = 0.0003;

/// Launch at the box centre and `count` survey waypoints tagged `wp-01`,
/// `wp-02`, ... sampled uniformly inside `bbox`, each with a sensor reading
/// and battery level. The same seed always gives the same mission.
pub fn random_mission(seed: u64, count: usize, bbox: BoundingBox) -> Mission {
    let mut rng = StdRng::seed_from_u64(seed);

    let margin_lon = EDGE_MARGIN.min((bbox.max_lon - bbox.min_lon) / 4.0);
    let margin_lat = EDGE_MARGIN.min((bbox.max_lat - bbox.min_lat) / 4.0);

    let centre = Point::new(
        (bbox.min_lon + bbox.max_lon) / 2.0,
        (bbox.min_lat + bbox.max_lat) / 2.0,
    );
    let launch = Waypoint::new("launch", centre.lon, centre.lat);
    let mut waypoints = vec![SurveyPoint::from(launch)];
    for i in 1..=count {
        let lon = rng.random_range(bbox.min_lon + margin_lon..bbox.max_lon - margin_lon);
        let lat = rng.random_range(bbox.min_lat + margin_lat..bbox.max_lat - margin_lat);
        let reading = rng.random_range(0.0..256.0);
        let battery = rng.random_range(0.0..100.0);
        let id = format!("wp-{i:02}");
        waypoints.push(
            SurveyPoint::from(Waypoint::new(id.clone(), lon, lat).with_tag(id))
                .with_reading(Some(reading), battery),
        );
    }

    Mission {
        waypoints,
        no_fly_zones: Vec::new(),
        confinement: Some(bbox),
        rules: FlightRules::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_mission() {
        let a = random_mission(7, 5, CENTRAL_AREA);
        let b = random_mission(7, 5, CENTRAL_AREA);
        let positions =
            |m: &Mission| -> Vec<Point> { m.route().iter().map(|w| w.position).collect() };
        assert_eq!(positions(&a), positions(&b));

        let c = random_mission(8, 5, CENTRAL_AREA);
        assert_ne!(positions(&a), positions(&c));
    }

    #[test]
    fn waypoints_are_tagged_and_inside_the_area() {
        let mission = random_mission(42, 12, CENTRAL_AREA);
        assert_eq!(mission.waypoints.len(), 13);
        let route = mission.route();
        assert_eq!(route[0].id, "launch");
        assert!(route[0].tag.is_none());
        assert!(mission.waypoints[0].sensor.is_empty());
        assert_eq!(route[3].tag.as_deref(), Some("wp-03"));
        assert_eq!(route[12].id, "wp-12");
        for wp in &route {
            assert!(CENTRAL_AREA.contains(wp.position), "{} escaped", wp.id);
        }
        for point in &mission.waypoints[1..] {
            let reading = point.sensor.reading.unwrap();
            assert!((0.0..256.0).contains(&reading));
            assert!(point.sensor.battery.is_some());
        }
        assert_eq!(mission.flight_rules().confinement, Some(CENTRAL_AREA));
    }
}
