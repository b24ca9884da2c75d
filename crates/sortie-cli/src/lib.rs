//! Sortie CLI - mission files, random missions and flight output for the
//! `plan_flight` binary.

pub mod config;
pub mod mission;
pub mod output;
pub mod scenarios;
pub mod sensors;

pub use config::EnvOverrides;
pub use mission::{Mission, SurveyPoint};
pub use scenarios::{random_mission, CENTRAL_AREA};
pub use sensors::{Marker, SensorReading};
