//! Headless runner: advances a Biotopia zoo and logs population statistics.

mod telemetry;

use anyhow::{Context, Result};
use biotopia_core::SimulationConfig;
use biotopia_world::Zoo;
use tracing::{error, info};

fn main() -> Result<()> {
    telemetry::init_telemetry()?;

    let config = load_config()?;
    info!(
        width = config.world.width,
        height = config.world.height,
        population = config.start_population,
        seed = config.seed,
        "Starting Biotopia"
    );

    let mut zoo = Zoo::from_config(&config).context("failed to build zoo")?;

    let stats = match zoo.run(config.num_ticks) {
        Ok(stats) => stats,
        Err(e) => {
            error!(tick = zoo.tick(), "Simulation aborted: {}", e);
            return Err(e.into());
        }
    };

    info!(
        event = "run_summary",
        ticks = stats.tick,
        population = stats.population,
        total_food = stats.total_food,
        total_keys = stats.total_keys,
        max_age = stats.age.max,
        avg_mouths = format!("{:.2}", stats.mouths.mean),
        "Simulation finished"
    );

    if let Ok(path) = std::env::var("BIOTOPIA_SNAPSHOT") {
        write_snapshot(&zoo, &path)?;
    }

    Ok(())
}

/// Dump the final population as JSON
fn write_snapshot(zoo: &Zoo, path: &str) -> Result<()> {
    let json = serde_json::to_string_pretty(&zoo.snapshot())?;
    std::fs::write(path, json).with_context(|| format!("failed to write snapshot {}", path))?;
    info!(path, creatures = zoo.population(), "Wrote population snapshot");
    Ok(())
}

/// Config comes from the JSON file named by `BIOTOPIA_CONFIG`, or defaults.
fn load_config() -> Result<SimulationConfig> {
    match std::env::var("BIOTOPIA_CONFIG") {
        Ok(path) => {
            info!("Loading config from {}", path);
            SimulationConfig::from_json_file(&path)
                .with_context(|| format!("invalid config file {}", path))
        }
        Err(_) => Ok(SimulationConfig::default()),
    }
}
