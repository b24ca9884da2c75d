//! Flight output files: the instruction log and a GeoJSON map.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde_json::{json, Value};
use sortie_core::{FlightPlan, FlightRules, NoFlyZone, Point};

use crate::mission::SurveyPoint;
use crate::sensors::{Marker, NO_READING_COLOR};

const START_MARKER: Marker = Marker {
    color: "#ffffff",
    symbol: Some("star"),
};
const UNVISITED_MARKER: Marker = Marker {
    color: NO_READING_COLOR,
    symbol: Some("circle-stroked"),
};

pub fn flightpath_file_name(date: NaiveDate) -> String {
    format!("flightpath-{}.txt", date.format("%d-%m-%Y"))
}

pub fn readings_file_name(date: NaiveDate) -> String {
    format!("readings-{}.geojson", date.format("%d-%m-%Y"))
}

/// One line per move, numbered from 1:
/// `n,fromLon,fromLat,heading,toLon,toLat,tag`.
pub fn flightpath_text(plan: &FlightPlan, rules: &FlightRules) -> String {
    let spacing = rules.heading_spacing();
    let mut out = String::new();
    for (i, inst) in plan.instructions.iter().enumerate() {
        let _ = writeln!(
            out,
            "{},{},{},{},{},{},{}",
            i + 1,
            inst.from.lon,
            inst.from.lat,
            inst.display_heading(spacing),
            inst.to.lon,
            inst.to.lat,
            inst.tag.as_deref().unwrap_or("null"),
        );
    }
    out
}

fn coords(point: Point) -> Value {
    json!([point.lon, point.lat])
}

/// Marker for one survey point. Sensors are only read when visited; a launch
/// point without a sensor keeps its own marker.
pub fn point_marker(point: &SurveyPoint, is_start: bool, visited: bool) -> Marker {
    if is_start && point.sensor.is_empty() {
        START_MARKER
    } else if !visited {
        UNVISITED_MARKER
    } else {
        point.sensor.marker()
    }
}

/// Waypoints, zones and the flown path as a `FeatureCollection`.
pub fn flight_geojson(points: &[SurveyPoint], zones: &[NoFlyZone], plan: &FlightPlan) -> Value {
    let start = plan.order.first().copied();
    let mut features = Vec::with_capacity(points.len() + zones.len() + 1);

    for (idx, point) in points.iter().enumerate() {
        let visited = plan.visited.get(idx).copied().unwrap_or(false);
        let marker = point_marker(point, Some(idx) == start, visited);
        let wp = &point.waypoint;

        let mut properties = json!({
            "id": wp.id,
            "location": wp.tag,
            "visited": visited,
            "rgb-string": marker.color,
            "marker-color": marker.color,
        });
        if let Some(symbol) = marker.symbol {
            properties["marker-symbol"] = json!(symbol);
        }
        if visited {
            if let Some(reading) = point.sensor.reading {
                properties["reading"] = json!(reading);
            }
            if let Some(battery) = point.sensor.battery {
                properties["battery"] = json!(battery);
            }
        }

        features.push(json!({
            "type": "Feature",
            "geometry": { "type": "Point", "coordinates": coords(wp.position) },
            "properties": properties,
        }));
    }

    for zone in zones {
        let mut ring: Vec<Value> = zone.vertices().iter().copied().map(coords).collect();
        if let Some(first) = zone.vertices().first() {
            ring.push(coords(*first));
        }
        features.push(json!({
            "type": "Feature",
            "geometry": { "type": "Polygon", "coordinates": [ring] },
            "properties": { "id": zone.id, "fill": "#ff0000" },
        }));
    }

    if let Some(first) = plan.instructions.first() {
        let line: Vec<Value> = std::iter::once(first.from)
            .chain(plan.instructions.iter().map(|inst| inst.to))
            .map(coords)
            .collect();
        features.push(json!({
            "type": "Feature",
            "geometry": { "type": "LineString", "coordinates": line },
            "properties": { "moves": plan.move_count, "status": plan.status },
        }));
    }

    json!({ "type": "FeatureCollection", "features": features })
}

/// Write both files into `dir`, returning their paths.
pub fn write_outputs(
    dir: &Path,
    date: NaiveDate,
    points: &[SurveyPoint],
    zones: &[NoFlyZone],
    plan: &FlightPlan,
    rules: &FlightRules,
) -> Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let flightpath = dir.join(flightpath_file_name(date));
    fs::write(&flightpath, flightpath_text(plan, rules))
        .with_context(|| format!("failed to write {}", flightpath.display()))?;

    let readings = dir.join(readings_file_name(date));
    let geojson = serde_json::to_string_pretty(&flight_geojson(points, zones, plan))?;
    fs::write(&readings, geojson)
        .with_context(|| format!("failed to write {}", readings.display()))?;

    tracing::debug!(
        flightpath = %flightpath.display(),
        readings = %readings.display(),
        "flight outputs written"
    );
    Ok((flightpath, readings))
}
