//! Visiting order: cheapest insertion followed by 2-opt and adjacent swaps.
//!
//! Distances here ignore no-fly zones; they only rank candidate orders.

use crate::models::Point;
use crate::spatial::euclidean;
use serde::{Deserialize, Serialize};

/// Smallest cost reduction accepted as an improvement.
const IMPROVEMENT_EPS: f64 = 1e-12;

/// Symmetric all-pairs straight-line distances.
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    size: usize,
    values: Vec<f64>,
}

impl DistanceMatrix {
    pub fn from_points(points: &[Point]) -> Self {
        let size = points.len();
        let mut values = vec![0.0; size * size];
        for i in 0..size {
            for j in (i + 1)..size {
                let d = euclidean(points[i], points[j]);
                values[i * size + j] = d;
                values[j * size + i] = d;
            }
        }
        Self { size, values }
    }

    /// Number of points.
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn get(&self, a: usize, b: usize) -> f64 {
        self.values[a * self.size + b]
    }

    /// Total length of the closed cycle through `order`.
    pub fn cycle_length(&self, order: &[usize]) -> f64 {
        let n = order.len();
        (0..n).map(|i| self.get(order[i], order[(i + 1) % n])).sum()
    }
}

/// Moves accepted by each local search pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImprovementStats {
    pub two_opt_moves: usize,
    pub swap_moves: usize,
}

/// Build an initial cycle by cheapest insertion, seeded with waypoints 0 and 1.
pub fn build_insertion_tour(matrix: &DistanceMatrix) -> Vec<usize> {
    let n = matrix.size();
    if n < 2 {
        return (0..n).collect();
    }

    let mut tour = vec![0, 1];
    let mut remaining: Vec<usize> = (2..n).collect();

    while !remaining.is_empty() {
        let mut best_cost = f64::INFINITY;
        let mut best = (0usize, 0usize);

        for (candidate_idx, &candidate) in remaining.iter().enumerate() {
            for edge in 0..tour.len() {
                let a = tour[edge];
                let b = tour[(edge + 1) % tour.len()];
                let cost = matrix.get(candidate, a) + matrix.get(candidate, b) - matrix.get(a, b);
                if cost < best_cost {
                    best_cost = cost;
                    best = (candidate_idx, edge);
                }
            }
        }

        let (candidate_idx, edge) = best;
        let waypoint = remaining.remove(candidate_idx);
        tour.insert(edge + 1, waypoint);
    }

    tracing::debug!(
        waypoints = n,
        length = matrix.cycle_length(&tour),
        "insertion tour built"
    );
    tour
}

/// Reverse `order[i..=j]` when that shortens the cycle. Returns whether it did.
pub(crate) fn try_reverse(order: &mut [usize], matrix: &DistanceMatrix, i: usize, j: usize) -> bool {
    let n = order.len();
    let pre_i = order[(i + n - 1) % n];
    let post_j = order[(j + 1) % n];
    let first = order[i];
    let last = order[j];

    let reversed = matrix.get(pre_i, last) + matrix.get(first, post_j);
    let current = matrix.get(pre_i, first) + matrix.get(last, post_j);
    if reversed + IMPROVEMENT_EPS < current {
        order[i..=j].reverse();
        true
    } else {
        false
    }
}

/// Exchange `order[i]` with its cyclic successor when that shortens the cycle.
pub(crate) fn try_swap(order: &mut [usize], matrix: &DistanceMatrix, i: usize) -> bool {
    let n = order.len();
    let next = (i + 1) % n;
    let pre = order[(i + n - 1) % n];
    let a = order[i];
    let b = order[next];
    let post = order[(i + 2) % n];

    let swapped = matrix.get(pre, b) + matrix.get(a, post);
    let current = matrix.get(pre, a) + matrix.get(b, post);
    if swapped + IMPROVEMENT_EPS < current {
        order.swap(i, next);
        true
    } else {
        false
    }
}

/// First-improvement 2-opt: restart the scan after every accepted reversal.
/// Returns the number of reversals applied.
pub fn two_opt(order: &mut [usize], matrix: &DistanceMatrix) -> usize {
    let n = order.len();
    if n < 4 {
        return 0;
    }
    let mut moves = 0;
    'scan: loop {
        // j stops at n - 2: reversing the whole cycle is not a move
        for j in 1..n - 1 {
            for i in 0..j {
                if try_reverse(order, matrix, i, j) {
                    moves += 1;
                    continue 'scan;
                }
            }
        }
        break;
    }
    moves
}

/// Adjacent swap sweeps until one full sweep changes nothing.
/// Returns the number of swaps applied.
pub fn adjacent_swap(order: &mut [usize], matrix: &DistanceMatrix) -> usize {
    let n = order.len();
    if n < 4 {
        return 0;
    }
    let mut moves = 0;
    loop {
        let mut improved = false;
        for i in 0..n {
            if try_swap(order, matrix, i) {
                moves += 1;
                improved = true;
            }
        }
        if !improved {
            break;
        }
    }
    moves
}

/// Rotate the cycle so `start` sits at position 0.
pub fn rotate_to_start(order: &mut [usize], start: usize) {
    if let Some(pos) = order.iter().position(|&idx| idx == start) {
        order.rotate_left(pos);
    }
}

/// Run 2-opt then adjacent swap to their fixpoints and rotate `start` to the front.
pub fn improve_tour(order: &mut [usize], matrix: &DistanceMatrix, start: usize) -> ImprovementStats {
    let before = matrix.cycle_length(order);
    let stats = ImprovementStats {
        two_opt_moves: two_opt(order, matrix),
        swap_moves: adjacent_swap(order, matrix),
    };
    rotate_to_start(order, start);
    tracing::debug!(
        two_opt = stats.two_opt_moves,
        swaps = stats.swap_moves,
        before,
        after = matrix.cycle_length(order),
        "tour improved"
    );
    stats
}

/// Distance matrix, insertion, local search and rotation in one call.
pub fn optimize_order(points: &[Point]) -> Vec<usize> {
    let matrix = DistanceMatrix::from_points(points);
    let mut order = build_insertion_tour(&matrix);
    improve_tour(&mut order, &matrix, 0);
    order
}
