//! Plan a survey sortie and write its flightpath and GeoJSON files.
//!
//! Usage:
//!   cargo run -p sortie-cli --bin plan_flight -- --mission mission.json --date 15-06-2021
//!   cargo run -p sortie-cli --bin plan_flight -- --random 20 --seed 5678 \
//!       --start-lon -3.1878 --start-lat 55.9444
//!
//! Exits 1 when planning fails and 2 when the plan is incomplete
//! (out of moves or with skipped legs); the files are still written then.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use sortie_cli::output::write_outputs;
use sortie_cli::{random_mission, EnvOverrides, Mission, CENTRAL_AREA};
use sortie_core::{plan_flight, Point, UnreachablePolicy};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Plan an obstacle-aware survey sortie")]
struct Args {
    /// Mission JSON file
    #[arg(long, required_unless_present = "random", conflicts_with = "random")]
    mission: Option<PathBuf>,

    /// Generate a random mission with this many survey waypoints
    #[arg(long)]
    random: Option<usize>,

    /// Seed for --random
    #[arg(long, default_value_t = 5678)]
    seed: u64,

    /// Launch longitude; replaces the first waypoint's position
    #[arg(long, requires = "start_lat", allow_hyphen_values = true)]
    start_lon: Option<f64>,

    /// Launch latitude
    #[arg(long, requires = "start_lon", allow_hyphen_values = true)]
    start_lat: Option<f64>,

    /// Flight date (DD-MM-YYYY) used in output file names; defaults to today
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,

    /// Output directory (env: SORTIE_OUTPUT_DIR)
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Move budget for the whole sortie
    #[arg(long)]
    max_moves: Option<usize>,

    /// Move length in degrees
    #[arg(long)]
    move_length: Option<f64>,

    /// Number of headings
    #[arg(long)]
    headings: Option<u16>,

    /// Arrival tolerance in degrees
    #[arg(long)]
    tolerance: Option<f64>,

    /// Weight on the distance heuristic (> 1; larger searches more greedily)
    #[arg(long)]
    heuristic_scale: Option<f64>,

    /// Search expansion cap per leg
    #[arg(long)]
    max_expansions: Option<usize>,

    /// Leave unreachable waypoints unvisited instead of failing
    #[arg(long)]
    skip_unreachable: bool,
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%d-%m-%Y")
        .map_err(|e| format!("expected DD-MM-YYYY, got {value:?}: {e}"))
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sortie_core=info".parse()?)
                .add_directive("plan_flight=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let env = EnvOverrides::from_env();

    let mission = match (&args.mission, args.random) {
        (Some(path), _) => Mission::load(path)?,
        (None, Some(count)) => {
            tracing::info!(count, seed = args.seed, "generating random mission");
            random_mission(args.seed, count, CENTRAL_AREA)
        }
        (None, None) => unreachable!("clap requires --mission or --random"),
    };
    let mission = match (args.start_lon, args.start_lat) {
        (Some(lon), Some(lat)) => mission.with_launch(Point::new(lon, lat)),
        _ => mission,
    };

    let flags = EnvOverrides {
        move_length: args.move_length,
        heading_count: args.headings,
        arrival_tolerance: args.tolerance,
        heuristic_scale: args.heuristic_scale,
        max_moves: args.max_moves,
        max_expansions: args.max_expansions,
        output_dir: args.out_dir,
    };

    // Flags win over the environment, which wins over the mission file.
    let mut rules = mission.flight_rules();
    env.apply(&mut rules);
    flags.apply(&mut rules);
    if args.skip_unreachable {
        rules.on_unreachable = UnreachablePolicy::Skip;
    }

    mission.validate(&rules)?;

    let route = mission.route();
    let plan = plan_flight(&route, &mission.no_fly_zones, &rules)
        .context("planning failed")?;

    let date = args
        .date
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let out_dir = flags
        .output_dir
        .or(env.output_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    let (flightpath, readings) = write_outputs(
        &out_dir,
        date,
        &mission.waypoints,
        &mission.no_fly_zones,
        &plan,
        &rules,
    )?;

    println!("Status:     {:?}", plan.status);
    println!("Moves:      {}/{}", plan.move_count, rules.max_moves);
    println!(
        "Visited:    {}/{}",
        plan.visited.iter().filter(|v| **v).count(),
        plan.visited.len()
    );
    for idx in plan.unvisited() {
        println!("  unvisited: {}", route[idx].id);
    }
    println!("Flightpath: {}", flightpath.display());
    println!("Readings:   {}", readings.display());

    if plan.is_complete() {
        Ok(ExitCode::SUCCESS)
    } else {
        tracing::warn!(status = ?plan.status, "sortie is incomplete");
        Ok(ExitCode::from(2))
    }
}
