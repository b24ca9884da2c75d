//! Flight rules and planner tuning for a sortie.

use crate::models::BoundingBox;
use serde::{Deserialize, Serialize};

/// What the assembler does when a leg has no feasible path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnreachablePolicy {
    /// Fail the whole plan
    #[default]
    Abort,
    /// Drop the leg, leave the waypoint unvisited and continue
    Skip,
}

/// Configuration for planning a sortie.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightRules {
    /// Length of every move in degrees
    pub move_length: f64,
    /// Number of evenly spaced headings; even and a divisor of 360
    pub heading_count: u16,
    /// Default arrival radius in degrees
    pub arrival_tolerance: f64,
    /// Multiplier on the straight-line distance heuristic (> 1).
    /// Larger values search more greedily: fewer expansions, longer detours.
    pub heuristic_scale: f64,
    /// Maximum instructions for the whole sortie
    pub max_moves: usize,
    /// Maximum nodes expanded per leg before giving up
    pub max_expansions: usize,
    /// Area the drone must stay inside, if any
    pub confinement: Option<BoundingBox>,
    pub on_unreachable: UnreachablePolicy,
}

impl Default for FlightRules {
    fn default() -> Self {
        Self {
            move_length: 0.0003,
            heading_count: 36,
            arrival_tolerance: 0.0002,
            heuristic_scale: 100.0,
            max_moves: 150,
            max_expansions: 50_000,
            confinement: None,
            on_unreachable: UnreachablePolicy::Abort,
        }
    }
}

impl FlightRules {
    /// Degrees between adjacent headings.
    pub fn heading_spacing(&self) -> u16 {
        360 / self.heading_count.max(1)
    }

    /// Validate rule values.
    /// Returns list of validation errors (empty = valid).
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !(self.move_length.is_finite() && self.move_length > 0.0) {
            errors.push(format!(
                "move_length must be positive, got {}",
                self.move_length
            ));
        }
        if self.heading_count < 4 || self.heading_count % 2 != 0 || 360 % self.heading_count != 0
        {
            errors.push(format!(
                "heading_count must be even, at least 4 and divide 360, got {}",
                self.heading_count
            ));
        }
        if !(self.arrival_tolerance.is_finite() && self.arrival_tolerance > 0.0) {
            errors.push(format!(
                "arrival_tolerance must be positive, got {}",
                self.arrival_tolerance
            ));
        }
        if !(self.heuristic_scale.is_finite() && self.heuristic_scale > 1.0) {
            errors.push(format!(
                "heuristic_scale must be greater than 1, got {}",
                self.heuristic_scale
            ));
        }
        if self.max_moves == 0 {
            errors.push("max_moves must be at least 1".to_string());
        }
        if self.max_expansions == 0 {
            errors.push("max_expansions must be at least 1".to_string());
        }
        if let Some(bbox) = &self.confinement {
            if !(bbox.min_lon < bbox.max_lon && bbox.min_lat < bbox.max_lat) {
                errors.push("confinement box has no area".to_string());
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let rules = FlightRules::default();
        assert!(rules.validate().is_empty(), "{:?}", rules.validate());
        assert_eq!(rules.heading_spacing(), 10);
    }

    #[test]
    fn rejects_bad_heading_counts() {
        for count in [0, 2, 7, 14] {
            let rules = FlightRules {
                heading_count: count,
                ..FlightRules::default()
            };
            assert!(!rules.validate().is_empty(), "accepted {count} headings");
        }
        let rules = FlightRules {
            heading_count: 8,
            ..FlightRules::default()
        };
        assert!(rules.validate().is_empty());
    }

    #[test]
    fn heuristic_scale_must_exceed_one() {
        let rules = FlightRules {
            heuristic_scale: 1.0,
            ..FlightRules::default()
        };
        assert_eq!(rules.validate().len(), 1);
    }

    #[test]
    fn partial_rules_fill_from_defaults() {
        let rules: FlightRules =
            serde_json::from_str(r#"{"max_moves": 20, "on_unreachable": "skip"}"#).unwrap();
        assert_eq!(rules.max_moves, 20);
        assert_eq!(rules.on_unreachable, UnreachablePolicy::Skip);
        assert_eq!(rules.heading_count, 36);
    }
}
