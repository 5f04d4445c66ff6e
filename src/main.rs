//! SensorTest - graph sensor occupancy demo
//!
//! Builds a grid of graph sensors, drops balls over it and logs which grid
//! nodes are occupied as the simulation runs.
//!
//! Usage:
//! - `sensor-test [settings.toml]` runs the simulation
//! - `sensor-test --write-settings [settings.toml]` writes the default settings and exits

mod settings;
mod sim;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use settings::SimSettings;
use sim::Simulation;

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Starting SensorTest...");

    let mut args: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
    if args.first().is_some_and(|arg| arg.as_os_str() == "--write-settings") {
        let path = match args.get(1) {
            Some(path) => path.clone(),
            None => SimSettings::settings_path().context("Could not determine config directory")?,
        };
        return SimSettings::default().save(&path);
    }

    let settings_path = if args.is_empty() { None } else { Some(args.remove(0)) };
    let settings = SimSettings::load(settings_path.as_deref());

    let mut sim = Simulation::new(settings).context("Failed to create sensor grid")?;
    sim.drop_balls();
    sim.run();

    let occupied = sim.occupied_nodes();
    info!(
        "{} sensors still occupied at end of run: [{}]",
        occupied.len(),
        occupied.join(", ")
    );

    let report = sim.shutdown();
    info!(
        steps = report.steps,
        sensors = report.sensors,
        entered = report.entered,
        left = report.left,
        expired_in_sensor = report.expired_in_sensor,
        peak = report.peak_occupied,
        "simulation finished"
    );

    Ok(())
}
