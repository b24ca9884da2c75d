//! Planar geometry for move validation and distance estimates.

use crate::models::{BoundingBox, NoFlyZone, Point};

/// Tolerance relative to the extent of the points being compared.
const REL_EPS: f64 = 1e-9;

/// Straight-line distance in degrees.
pub fn euclidean(a: Point, b: Point) -> f64 {
    let dlon = a.lon - b.lon;
    let dlat = a.lat - b.lat;
    (dlon * dlon + dlat * dlat).sqrt()
}

/// Move `length` along `heading_deg` (counter-clockwise from east).
pub fn step(from: Point, heading_deg: f64, length: f64) -> Point {
    let angle = heading_deg.to_radians();
    Point::new(
        from.lon + length * angle.cos(),
        from.lat + length * angle.sin(),
    )
}

/// Heading from `from` to `to`, rounded to the nearest multiple of
/// `spacing_deg` and normalized to [0, 360).
pub fn rounded_heading(from: Point, to: Point, spacing_deg: u16) -> u16 {
    let dlon = to.lon - from.lon;
    let dlat = to.lat - from.lat;
    if dlon == 0.0 && dlat == 0.0 {
        return 0;
    }
    let spacing = f64::from(spacing_deg.max(1));
    let degrees = dlat.atan2(dlon).to_degrees();
    let rounded = (degrees / spacing).round() * spacing;
    rounded.rem_euclid(360.0) as u16 % 360
}

/// Segment intersection that treats touching, collinear overlap and
/// degenerate (zero-length) segments as intersecting.
pub fn segments_intersect(a1: Point, a2: Point, b1: Point, b2: Point) -> bool {
    let min_x = a1.lon.min(a2.lon).min(b1.lon).min(b2.lon);
    let max_x = a1.lon.max(a2.lon).max(b1.lon).max(b2.lon);
    let min_y = a1.lat.min(a2.lat).min(b1.lat).min(b2.lat);
    let max_y = a1.lat.max(a2.lat).max(b1.lat).max(b2.lat);
    let span = (max_x - min_x).max(max_y - min_y);
    let orient_eps = REL_EPS * span * span;
    let coord_eps = REL_EPS * span;

    let orient = |p: Point, q: Point, r: Point| -> f64 {
        (q.lon - p.lon) * (r.lat - p.lat) - (q.lat - p.lat) * (r.lon - p.lon)
    };
    let within = |a: f64, b: f64, value: f64| -> bool {
        value >= a.min(b) - coord_eps && value <= a.max(b) + coord_eps
    };
    let on_segment =
        |p: Point, q: Point, r: Point| within(p.lon, q.lon, r.lon) && within(p.lat, q.lat, r.lat);

    let o1 = orient(a1, a2, b1);
    let o2 = orient(a1, a2, b2);
    let o3 = orient(b1, b2, a1);
    let o4 = orient(b1, b2, a2);

    if o1.abs() <= orient_eps && on_segment(a1, a2, b1) {
        return true;
    }
    if o2.abs() <= orient_eps && on_segment(a1, a2, b2) {
        return true;
    }
    if o3.abs() <= orient_eps && on_segment(b1, b2, a1) {
        return true;
    }
    if o4.abs() <= orient_eps && on_segment(b1, b2, a2) {
        return true;
    }

    let a_crosses = (o1 > orient_eps && o2 < -orient_eps) || (o1 < -orient_eps && o2 > orient_eps);
    let b_crosses = (o3 > orient_eps && o4 < -orient_eps) || (o3 < -orient_eps && o4 > orient_eps);
    a_crosses && b_crosses
}

/// Axis-aligned extent of a set of points.
pub fn bounds_of(points: &[Point]) -> Option<BoundingBox> {
    let first = points.first()?;
    let mut bounds = BoundingBox {
        min_lon: first.lon,
        min_lat: first.lat,
        max_lon: first.lon,
        max_lat: first.lat,
    };
    for point in &points[1..] {
        bounds.min_lon = bounds.min_lon.min(point.lon);
        bounds.min_lat = bounds.min_lat.min(point.lat);
        bounds.max_lon = bounds.max_lon.max(point.lon);
        bounds.max_lat = bounds.max_lat.max(point.lat);
    }
    Some(bounds)
}

/// Borrowed zones with precomputed extents for cheap rejection.
pub struct ObstacleSet<'a> {
    zones: Vec<(&'a NoFlyZone, BoundingBox)>,
    confinement: Option<(NoFlyZone, BoundingBox)>,
}

impl<'a> ObstacleSet<'a> {
    pub fn new(zones: impl IntoIterator<Item = &'a NoFlyZone>) -> Self {
        let zones = zones
            .into_iter()
            .filter_map(|zone| bounds_of(zone.vertices()).map(|bounds| (zone, bounds)))
            .collect();
        Self {
            zones,
            confinement: None,
        }
    }

    /// Add the confinement box boundary as a blocking ring.
    pub fn with_confinement(mut self, confinement: Option<BoundingBox>) -> Self {
        self.confinement = confinement.map(|bbox| (bbox.to_zone(), bbox));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty() && self.confinement.is_none()
    }

    /// True when the move `from -> to` touches any zone edge.
    pub fn blocks(&self, from: Point, to: Point) -> bool {
        let min_lon = from.lon.min(to.lon);
        let max_lon = from.lon.max(to.lon);
        let min_lat = from.lat.min(to.lat);
        let max_lat = from.lat.max(to.lat);

        let all_zones = self
            .zones
            .iter()
            .map(|(zone, bounds)| (*zone, bounds))
            .chain(self.confinement.iter().map(|(zone, bounds)| (zone, bounds)));

        for (zone, bounds) in all_zones {
            let pad = REL_EPS
                * (bounds.max_lon - bounds.min_lon)
                    .max(bounds.max_lat - bounds.min_lat)
                    .max(max_lon - min_lon)
                    .max(max_lat - min_lat);
            if max_lon < bounds.min_lon - pad
                || min_lon > bounds.max_lon + pad
                || max_lat < bounds.min_lat - pad
                || min_lat > bounds.max_lat + pad
            {
                continue;
            }
            if zone
                .edges()
                .any(|(start, end)| segments_intersect(from, to, start, end))
            {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(lon: f64, lat: f64) -> Point {
        Point::new(lon, lat)
    }

    #[test]
    fn crossing_segments_intersect() {
        assert!(segments_intersect(p(0.0, 0.0), p(1.0, 1.0), p(0.0, 1.0), p(1.0, 0.0)));
    }

    #[test]
    fn parallel_segments_do_not_intersect() {
        assert!(!segments_intersect(p(0.0, 0.0), p(1.0, 0.0), p(0.0, 1.0), p(1.0, 1.0)));
    }

    #[test]
    fn touching_endpoint_counts_as_intersecting() {
        assert!(segments_intersect(p(0.0, 0.0), p(1.0, 0.0), p(1.0, 0.0), p(1.0, 1.0)));
        // T-junction: endpoint lands on the interior of the other segment
        assert!(segments_intersect(
            p(0.0, 0.0),
            p(0.5, 0.0),
            p(0.5, -1.0),
            p(0.5, 1.0)
        ));
    }

    #[test]
    fn collinear_overlap_intersects_but_disjoint_collinear_does_not() {
        assert!(segments_intersect(p(0.0, 0.0), p(2.0, 0.0), p(1.0, 0.0), p(3.0, 0.0)));
        assert!(!segments_intersect(p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0), p(3.0, 0.0)));
    }

    #[test]
    fn zero_length_edge_is_deterministic() {
        assert!(segments_intersect(p(0.0, 0.0), p(2.0, 0.0), p(1.0, 0.0), p(1.0, 0.0)));
        assert!(!segments_intersect(p(0.0, 0.0), p(2.0, 0.0), p(1.0, 1.0), p(1.0, 1.0)));
        assert!(segments_intersect(p(1.0, 1.0), p(1.0, 1.0), p(1.0, 1.0), p(1.0, 1.0)));
    }

    #[test]
    fn works_at_degree_scale() {
        let base = p(-3.1884, 55.9444);
        let a2 = p(base.lon + 0.0003, base.lat);
        let b1 = p(base.lon + 0.00015, base.lat - 0.0001);
        let b2 = p(base.lon + 0.00015, base.lat + 0.0001);
        assert!(segments_intersect(base, a2, b1, b2));
        let b1 = p(base.lon + 0.00031, base.lat - 0.0001);
        let b2 = p(base.lon + 0.00031, base.lat + 0.0001);
        assert!(!segments_intersect(base, a2, b1, b2));
    }

    #[test]
    fn step_follows_heading_convention() {
        let moved = step(p(0.0, 0.0), 90.0, 1.0);
        assert!(moved.lon.abs() < 1e-12);
        assert!((moved.lat - 1.0).abs() < 1e-12);
        let moved = step(p(0.0, 0.0), 180.0, 2.0);
        assert!((moved.lon + 2.0).abs() < 1e-12);
    }

    #[test]
    fn rounded_heading_normalizes_and_rounds() {
        assert_eq!(rounded_heading(p(0.0, 0.0), p(1.0, 0.0), 10), 0);
        assert_eq!(rounded_heading(p(0.0, 0.0), p(0.0, -1.0), 10), 270);
        assert_eq!(rounded_heading(p(0.0, 0.0), p(1.0, -0.01), 10), 0);
        let angle = 44.0_f64.to_radians();
        assert_eq!(
            rounded_heading(p(0.0, 0.0), p(angle.cos(), angle.sin()), 10),
            40
        );
        assert_eq!(rounded_heading(p(0.0, 0.0), p(0.0, 0.0), 10), 0);
    }

    #[test]
    fn obstacle_set_blocks_only_crossing_moves() {
        let zone = NoFlyZone::new(
            "square",
            vec![p(1.0, -1.0), p(2.0, -1.0), p(2.0, 1.0), p(1.0, 1.0)],
        );
        let obstacles = ObstacleSet::new([&zone]);
        assert!(obstacles.blocks(p(0.0, 0.0), p(1.5, 0.0)));
        assert!(obstacles.blocks(p(0.0, 0.0), p(1.0, 0.0)));
        assert!(!obstacles.blocks(p(0.0, 0.0), p(0.9, 0.0)));
        assert!(!obstacles.blocks(p(0.0, 2.0), p(3.0, 2.0)));
    }

    #[test]
    fn confinement_edges_block_leaving_moves() {
        let bbox = BoundingBox {
            min_lon: 0.0,
            min_lat: 0.0,
            max_lon: 1.0,
            max_lat: 1.0,
        };
        let zones: Vec<NoFlyZone> = Vec::new();
        let obstacles = ObstacleSet::new(&zones).with_confinement(Some(bbox));
        assert!(!obstacles.is_empty());
        assert!(obstacles.blocks(p(0.5, 0.5), p(1.5, 0.5)));
        assert!(!obstacles.blocks(p(0.2, 0.5), p(0.8, 0.5)));
    }
}
