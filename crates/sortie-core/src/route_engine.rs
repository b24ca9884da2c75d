//! Lattice-constrained A* between two points.
//!
//! Every move has the same length and one of `heading_count` evenly spaced
//! headings. Nodes are keyed by their net step counts per heading pair rather
//! than by location, so branches that reach the same place through the same
//! combination of moves collapse onto one node regardless of float drift.

use crate::error::SegmentError;
use crate::models::{FlightSegment, Instruction, NoFlyZone, Point};
use crate::rules::FlightRules;
use crate::spatial::{euclidean, step, ObstacleSet};
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};

/// One leg to plan.
#[derive(Debug, Clone)]
pub struct SegmentRequest {
    pub from_waypoint: usize,
    pub to_waypoint: usize,
    pub start: Point,
    pub target: Point,
    /// Arrival radius around `target`
    pub tolerance: f64,
    /// Stamped on the arriving instruction
    pub tag: Option<String>,
}

/// Net signed move count per opposite-heading pair.
///
/// Heading `k < H/2` increments counter `k`; heading `k >= H/2` decrements
/// counter `k - H/2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StepVector(Box<[i32]>);

impl StepVector {
    pub fn zero(heading_count: usize) -> Self {
        Self(vec![0; heading_count / 2].into_boxed_slice())
    }

    pub fn stepped(&self, heading_idx: usize) -> Self {
        let pairs = self.0.len();
        let mut counts = self.0.clone();
        if heading_idx < pairs {
            counts[heading_idx] += 1;
        } else {
            counts[heading_idx - pairs] -= 1;
        }
        Self(counts)
    }

    pub fn counts(&self) -> &[i32] {
        &self.0
    }
}

#[derive(Debug, Clone, Copy)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Debug)]
struct LatticeNode {
    steps: StepVector,
    location: Point,
    g_score: f64,
    f_score: f64,
    /// Predecessor node and the heading index taken from it
    came_from: Option<(usize, usize)>,
}

/// Open-set entry. Smaller f first, then smaller g, then earlier push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenEntry {
    f_score: FloatOrd,
    g_score: FloatOrd,
    seq: u64,
    node: usize,
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f_score
            .cmp(&other.f_score)
            .then_with(|| self.g_score.cmp(&other.g_score))
            .then_with(|| self.seq.cmp(&other.seq))
            .then_with(|| self.node.cmp(&other.node))
    }
}

/// Node arena and step-vector index for one leg's search.
struct SearchState {
    nodes: Vec<LatticeNode>,
    index: HashMap<StepVector, usize>,
}

impl SearchState {
    fn new(start: Point, heading_count: usize, start_h: f64) -> Self {
        let steps = StepVector::zero(heading_count);
        let mut index = HashMap::new();
        index.insert(steps.clone(), 0);
        Self {
            nodes: vec![LatticeNode {
                steps,
                location: start,
                g_score: 0.0,
                f_score: start_h,
                came_from: None,
            }],
            index,
        }
    }

    /// Existing node for the stepped vector, or a new one at `location`.
    fn neighbor(&mut self, current: usize, heading_idx: usize, location: Point) -> usize {
        let steps = self.nodes[current].steps.stepped(heading_idx);
        if let Some(&existing) = self.index.get(&steps) {
            return existing;
        }
        let idx = self.nodes.len();
        self.index.insert(steps.clone(), idx);
        self.nodes.push(LatticeNode {
            steps,
            location,
            g_score: f64::INFINITY,
            f_score: f64::INFINITY,
            came_from: None,
        });
        idx
    }
}

/// Plans legs against a fixed obstacle set.
pub struct LatticePlanner<'a> {
    obstacles: ObstacleSet<'a>,
    move_length: f64,
    heuristic_scale: f64,
    max_expansions: usize,
    /// (degrees, dx, dy) per heading index, dx/dy already scaled by move length
    headings: Vec<(u16, f64, f64)>,
}

impl<'a> LatticePlanner<'a> {
    /// Fails with `SegmentError::InvalidRules` when `rules` would make the
    /// lattice ill-formed (odd or non-dividing heading count, bad move length).
    pub fn new(zones: &'a [NoFlyZone], rules: &FlightRules) -> Result<Self, SegmentError> {
        let errors = rules.validate();
        if !errors.is_empty() {
            return Err(SegmentError::InvalidRules(errors));
        }

        let origin = Point::new(0.0, 0.0);
        let spacing = rules.heading_spacing();
        let headings = (0..rules.heading_count)
            .map(|idx| {
                let degrees = idx * spacing;
                let offset = step(origin, f64::from(degrees), rules.move_length);
                (degrees, offset.lon, offset.lat)
            })
            .collect();

        Ok(Self {
            obstacles: ObstacleSet::new(zones).with_confinement(rules.confinement),
            move_length: rules.move_length,
            heuristic_scale: rules.heuristic_scale,
            max_expansions: rules.max_expansions,
            headings,
        })
    }

    fn heuristic(&self, from: Point, target: Point) -> f64 {
        euclidean(from, target) * self.heuristic_scale
    }

    /// Whether the straight move between two points stays clear of every zone.
    pub fn move_is_clear(&self, from: Point, to: Point) -> bool {
        self.obstacles.is_empty() || !self.obstacles.blocks(from, to)
    }

    pub fn plan(&self, request: &SegmentRequest) -> Result<FlightSegment, SegmentError> {
        if !(request.start.is_finite() && request.target.is_finite()) {
            return Err(SegmentError::InvalidRequest(
                "start and target must be finite".to_string(),
            ));
        }
        if !(request.tolerance.is_finite() && request.tolerance > 0.0) {
            return Err(SegmentError::InvalidRequest(format!(
                "arrival tolerance must be positive, got {}",
                request.tolerance
            )));
        }

        let mut state = SearchState::new(
            request.start,
            self.headings.len(),
            self.heuristic(request.start, request.target),
        );

        let mut open_set: BinaryHeap<Reverse<OpenEntry>> = BinaryHeap::new();
        let mut seq = 0u64;
        open_set.push(Reverse(OpenEntry {
            f_score: FloatOrd(state.nodes[0].f_score),
            g_score: FloatOrd(0.0),
            seq,
            node: 0,
        }));

        let mut nodes_expanded = 0usize;

        while let Some(Reverse(entry)) = open_set.pop() {
            let current = entry.node;
            let (location, g_score, has_parent) = {
                let node = &state.nodes[current];
                (node.location, node.g_score, node.came_from.is_some())
            };
            // Superseded by a cheaper push of the same node
            if entry.g_score.0 > g_score {
                continue;
            }

            if has_parent && euclidean(location, request.target) < request.tolerance {
                let segment = self.reconstruct(&state, current, request, nodes_expanded);
                tracing::debug!(
                    from = request.from_waypoint,
                    to = request.to_waypoint,
                    moves = segment.move_count(),
                    nodes_expanded,
                    nodes_created = state.nodes.len(),
                    "leg planned"
                );
                return Ok(segment);
            }

            if nodes_expanded >= self.max_expansions {
                tracing::debug!(
                    from = request.from_waypoint,
                    to = request.to_waypoint,
                    nodes_expanded,
                    "expansion cap reached"
                );
                return Err(SegmentError::ExpansionLimit { nodes_expanded });
            }
            nodes_expanded += 1;

            for (heading_idx, &(_, dx, dy)) in self.headings.iter().enumerate() {
                let candidate_location = Point::new(location.lon + dx, location.lat + dy);
                let neighbor = state.neighbor(current, heading_idx, candidate_location);
                let neighbor_location = state.nodes[neighbor].location;

                let tentative_g = if self.move_is_clear(location, neighbor_location) {
                    g_score + self.move_length
                } else {
                    f64::INFINITY
                };

                if tentative_g < state.nodes[neighbor].g_score {
                    let f_score = tentative_g + self.heuristic(neighbor_location, request.target);
                    let node = &mut state.nodes[neighbor];
                    node.came_from = Some((current, heading_idx));
                    node.g_score = tentative_g;
                    node.f_score = f_score;

                    seq += 1;
                    open_set.push(Reverse(OpenEntry {
                        f_score: FloatOrd(f_score),
                        g_score: FloatOrd(tentative_g),
                        seq,
                        node: neighbor,
                    }));
                }
            }
        }

        tracing::debug!(
            from = request.from_waypoint,
            to = request.to_waypoint,
            nodes_expanded,
            "open set exhausted"
        );
        Err(SegmentError::Unreachable { nodes_expanded })
    }

    fn reconstruct(
        &self,
        state: &SearchState,
        goal: usize,
        request: &SegmentRequest,
        nodes_expanded: usize,
    ) -> FlightSegment {
        let mut instructions = Vec::new();
        let mut current = goal;
        while let Some((previous, heading_idx)) = state.nodes[current].came_from {
            instructions.push(Instruction {
                from: state.nodes[previous].location,
                to: state.nodes[current].location,
                heading_deg: self.headings[heading_idx].0,
                tag: None,
                waypoint: None,
            });
            current = previous;
        }
        instructions.reverse();

        if let Some(last) = instructions.last_mut() {
            last.tag = request.tag.clone();
            last.waypoint = Some(request.to_waypoint);
        }

        FlightSegment {
            from_waypoint: request.from_waypoint,
            to_waypoint: request.to_waypoint,
            instructions,
            arrival: state.nodes[goal].location,
            nodes_expanded,
        }
    }
}

/// Plan a single leg from scratch.
pub fn plan_segment(
    request: &SegmentRequest,
    zones: &[NoFlyZone],
    rules: &FlightRules,
) -> Result<FlightSegment, SegmentError> {
    LatticePlanner::new(zones, rules)?.plan(request)
}
