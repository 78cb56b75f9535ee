#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Waypoint Defence headlessly.
//!
//! The simulation is driven by an external [`Scheduler`](scheduler::Scheduler)
//! exactly like an interactive front end would drive it, minus the window.

mod presenter;
mod scenario;
mod scheduler;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use log::info;
use waypoint_defence_world::World;

use crate::{presenter::TextPresenter, scenario::Scenario, scheduler::Scheduler};

/// Command-line arguments accepted by the runner.
#[derive(Debug, Parser)]
#[command(
    name = "waypoint-defence",
    about = "Runs a headless Waypoint Defence simulation"
)]
struct CliArgs {
    /// Scenario file describing the seed, route and scheduled placements.
    #[arg(long, value_name = "FILE")]
    scenario: Option<PathBuf>,
    /// Seed for the simulation's random source. Overrides the scenario.
    #[arg(long)]
    seed: Option<u64>,
    /// Number of intervals to run. Overrides the scenario.
    #[arg(long)]
    intervals: Option<u64>,
    /// Log the HUD every N presented intervals. Zero disables reports.
    #[arg(long, value_name = "N", default_value_t = 100)]
    report_every: u64,
    /// Stop as soon as every life has been lost.
    #[arg(long)]
    stop_on_defeat: bool,
}

/// Entry point for the Waypoint Defence command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = CliArgs::parse();

    let scenario = match &args.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::default(),
    }
    .with_overrides(args.seed, args.intervals);

    info!(
        "running {} intervals with seed {:#x} and {} scheduled placements",
        scenario.intervals,
        scenario.seed,
        scenario.placements.len()
    );

    let mut world = World::seeded(scenario.world_config(), scenario.seed);
    let mut presenter = TextPresenter::new(args.report_every);
    let mut scheduler = Scheduler::new(scenario.input_schedule());
    let outcome = scheduler.run(
        &mut world,
        scenario.intervals,
        args.stop_on_defeat,
        &mut presenter,
    )?;

    println!("{}", outcome.summary());
    Ok(())
}
