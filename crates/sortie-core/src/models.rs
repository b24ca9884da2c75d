//! Core data models for sortie planning.

use serde::{Deserialize, Serialize};

/// A planar position in degrees. All planning geometry treats (lon, lat) as
/// cartesian x/y.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lon: f64,
    pub lat: f64,
}

impl Point {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }
}

/// A target location the sortie must visit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Waypoint {
    pub id: String,
    pub position: Point,
    /// Stamped on the instruction that arrives here (e.g. a location code)
    #[serde(default)]
    pub tag: Option<String>,
    /// Arrival radius override; falls back to `FlightRules::arrival_tolerance`
    #[serde(default)]
    pub tolerance: Option<f64>,
}

impl Waypoint {
    pub fn new(id: impl Into<String>, lon: f64, lat: f64) -> Self {
        Self {
            id: id.into(),
            position: Point::new(lon, lat),
            tag: None,
            tolerance: None,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }
}

// ========== AIRSPACE ==========

/// A closed polygonal region the flight path must never cross.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoFlyZone {
    pub id: String,
    /// Ring vertices; a repeated closing vertex (first == last) is allowed
    pub ring: Vec<Point>,
}

impl NoFlyZone {
    pub fn new(id: impl Into<String>, ring: Vec<Point>) -> Self {
        Self {
            id: id.into(),
            ring,
        }
    }

    /// Vertices without the duplicated closing vertex.
    pub fn vertices(&self) -> &[Point] {
        match (self.ring.first(), self.ring.last()) {
            (Some(first), Some(last)) if self.ring.len() > 1 && first == last => {
                &self.ring[..self.ring.len() - 1]
            }
            _ => &self.ring,
        }
    }

    /// Iterate ring edges, including the closing edge back to the first vertex.
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let vertices = self.vertices();
        let n = vertices.len();
        (0..n).map(move |i| (vertices[i], vertices[(i + 1) % n]))
    }

    /// Validate the zone geometry.
    /// Returns list of validation errors (empty = valid).
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.vertices().len() < 3 {
            errors.push(format!(
                "zone {} has {} distinct vertices, at least 3 required",
                self.id,
                self.vertices().len()
            ));
        }
        if self.ring.iter().any(|point| !point.is_finite()) {
            errors.push(format!("zone {} has a non-finite vertex", self.id));
        }
        errors
    }
}

/// Rectangular confinement area; the drone may not leave it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub fn contains(&self, point: Point) -> bool {
        point.lon > self.min_lon
            && point.lon < self.max_lon
            && point.lat > self.min_lat
            && point.lat < self.max_lat
    }

    /// The box boundary as a blocking ring.
    pub fn to_zone(&self) -> NoFlyZone {
        NoFlyZone::new(
            "confinement",
            vec![
                Point::new(self.min_lon, self.min_lat),
                Point::new(self.max_lon, self.min_lat),
                Point::new(self.max_lon, self.max_lat),
                Point::new(self.min_lon, self.max_lat),
                Point::new(self.min_lon, self.min_lat),
            ],
        )
    }
}

// ========== FLIGHT OUTPUT ==========

/// A single fixed-length move.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instruction {
    pub from: Point,
    pub to: Point,
    /// Lattice heading in degrees counter-clockwise from east
    pub heading_deg: u16,
    /// Present only on the move that lands within tolerance of a waypoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waypoint: Option<usize>,
}

impl Instruction {
    /// Heading recomputed from the move geometry and rounded to the nearest
    /// multiple of `spacing_deg`, normalized to [0, 360).
    pub fn display_heading(&self, spacing_deg: u16) -> u16 {
        crate::spatial::rounded_heading(self.from, self.to, spacing_deg)
    }

    pub fn length(&self) -> f64 {
        crate::spatial::euclidean(self.from, self.to)
    }
}

/// The moves flown between two consecutive tour stops.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightSegment {
    pub from_waypoint: usize,
    pub to_waypoint: usize,
    pub instructions: Vec<Instruction>,
    /// Where the drone actually ended up, within tolerance of the target
    pub arrival: Point,
    pub nodes_expanded: usize,
}

impl FlightSegment {
    pub fn move_count(&self) -> usize {
        self.instructions.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightStatus {
    /// Every leg planned and emitted within the move budget
    Complete,
    /// Emission stopped at the move budget
    OutOfMoves,
    /// All legs fit the budget but at least one was skipped as unreachable
    Partial,
}

/// A leg that was dropped because no path could be found.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedSegment {
    pub leg: usize,
    pub from_waypoint: usize,
    pub to_waypoint: usize,
    pub reason: String,
}

/// The assembled sortie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightPlan {
    /// Visiting order; `order[0]` is the start waypoint
    pub order: Vec<usize>,
    pub instructions: Vec<Instruction>,
    /// Per input waypoint: was an arriving instruction emitted
    pub visited: Vec<bool>,
    pub move_count: usize,
    pub status: FlightStatus,
    #[serde(default)]
    pub skipped: Vec<SkippedSegment>,
    pub nodes_expanded: usize,
}

impl FlightPlan {
    pub fn is_complete(&self) -> bool {
        self.status == FlightStatus::Complete
    }

    /// Whether the closing leg back to the start was emitted.
    pub fn returned_to_start(&self) -> bool {
        self.order.first().is_some_and(|start| {
            self.instructions
                .last()
                .is_some_and(|last| last.waypoint == Some(*start))
        })
    }

    pub fn unvisited(&self) -> Vec<usize> {
        self.visited
            .iter()
            .enumerate()
            .filter(|(_, visited)| !**visited)
            .map(|(idx, _)| idx)
            .collect()
    }
}
