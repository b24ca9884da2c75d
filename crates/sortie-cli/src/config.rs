//! Planner overrides from environment.

use std::env;
use std::path::PathBuf;

use sortie_core::FlightRules;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvOverrides {
    pub move_length: Option<f64>,
    pub heading_count: Option<u16>,
    pub arrival_tolerance: Option<f64>,
    pub heuristic_scale: Option<f64>,
    pub max_moves: Option<usize>,
    pub max_expansions: Option<usize>,
    pub output_dir: Option<PathBuf>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Unparseable values are ignored, same as unset ones.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            move_length: lookup("SORTIE_MOVE_LENGTH").and_then(|s| s.parse().ok()),
            heading_count: lookup("SORTIE_HEADINGS").and_then(|s| s.parse().ok()),
            arrival_tolerance: lookup("SORTIE_TOLERANCE").and_then(|s| s.parse().ok()),
            heuristic_scale: lookup("SORTIE_HEURISTIC_SCALE").and_then(|s| s.parse().ok()),
            max_moves: lookup("SORTIE_MAX_MOVES").and_then(|s| s.parse().ok()),
            max_expansions: lookup("SORTIE_MAX_EXPANSIONS").and_then(|s| s.parse().ok()),
            output_dir: lookup("SORTIE_OUTPUT_DIR")
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
        }
    }

    pub fn apply(&self, rules: &mut FlightRules) {
        if let Some(value) = self.move_length {
            rules.move_length = value;
        }
        if let Some(value) = self.heading_count {
            rules.heading_count = value;
        }
        if let Some(value) = self.arrival_tolerance {
            rules.arrival_tolerance = value;
        }
        if let Some(value) = self.heuristic_scale {
            rules.heuristic_scale = value;
        }
        if let Some(value) = self.max_moves {
            rules.max_moves = value;
        }
        if let Some(value) = self.max_expansions {
            rules.max_expansions = value;
        }
    }
}
