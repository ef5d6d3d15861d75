//! Kilogrid Simulator
//!
//! Run one swarm through the full schedule and print the report as JSON.
//!
//! ```text
//! kilogrid-sim [width] [height] [seed]
//! ```

use std::env;

use kilogrid_sim::{Simulation, SimulationConfig};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let defaults = SimulationConfig::default();

    let width: u32 = args
        .get(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(defaults.grid_width);
    let height: u32 = args
        .get(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(defaults.grid_height);
    let seed: u64 = args
        .get(3)
        .and_then(|s| s.parse().ok())
        .unwrap_or(defaults.seed);

    let config = defaults.with_grid(width, height).with_seed(seed);
    let mut sim = Simulation::new(config)?;
    let report = sim.run();

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
