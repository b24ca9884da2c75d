//! Mission files: the waypoints, zones and rules for one sortie.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use sortie_core::{validate_inputs, BoundingBox, FlightRules, NoFlyZone, Point, Waypoint};

use crate::sensors::SensorReading;

/// A waypoint together with the sensor found there, if any.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyPoint {
    #[serde(flatten)]
    pub waypoint: Waypoint,
    #[serde(flatten)]
    pub sensor: SensorReading,
}

impl SurveyPoint {
    pub fn with_reading(mut self, reading: Option<f64>, battery: f64) -> Self {
        self.sensor = SensorReading {
            reading,
            battery: Some(battery),
        };
        self
    }
}

impl From<Waypoint> for SurveyPoint {
    fn from(waypoint: Waypoint) -> Self {
        Self {
            waypoint,
            sensor: SensorReading::default(),
        }
    }
}

/// A sortie description as stored on disk. The first waypoint is the
/// launch point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mission {
    pub waypoints: Vec<SurveyPoint>,
    #[serde(default)]
    pub no_fly_zones: Vec<NoFlyZone>,
    /// Shorthand for `rules.confinement`; the rules value wins when both are set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confinement: Option<BoundingBox>,
    #[serde(default)]
    pub rules: FlightRules,
}

impl Mission {
    pub fn from_json(text: &str) -> Result<Self> {
        let mission: Mission = serde_json::from_str(text).context("malformed mission JSON")?;
        Ok(mission)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read mission {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("in mission {}", path.display()))
    }

    /// The planner's view of the waypoints.
    pub fn route(&self) -> Vec<Waypoint> {
        self.waypoints.iter().map(|point| point.waypoint.clone()).collect()
    }

    /// Move the launch point (the first waypoint).
    pub fn with_launch(mut self, position: Point) -> Self {
        if let Some(launch) = self.waypoints.first_mut() {
            launch.waypoint.position = position;
        }
        self
    }

    /// Mission rules with the top-level confinement folded in.
    pub fn flight_rules(&self) -> FlightRules {
        let mut rules = self.rules.clone();
        if rules.confinement.is_none() {
            rules.confinement = self.confinement;
        }
        rules
    }

    /// Check the mission against `rules` before planning.
    pub fn validate(&self, rules: &FlightRules) -> Result<()> {
        let route = self.route();
        validate_inputs(&route, &self.no_fly_zones, rules)?;

        if let Some(bbox) = rules.confinement {
            if let Some(outside) = route.iter().find(|wp| !bbox.contains(wp.position)) {
                bail!("waypoint {} lies outside the confinement area", outside.id);
            }
        }

        let mut ids: Vec<&str> = route.iter().map(|wp| wp.id.as_str()).collect();
        ids.sort_unstable();
        if let Some(pair) = ids.windows(2).find(|pair| pair[0] == pair[1]) {
            bail!("duplicate waypoint id {}", pair[0]);
        }
        Ok(())
    }
}
