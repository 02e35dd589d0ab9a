//! Configuration types for the simulation.

use crate::error::{Error, Result};
use crate::types::WorldSize;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// World configuration parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Width of the world grid (coordinates run from 0 to width inclusive)
    pub width: i32,
    /// Height of the world grid (coordinates run from 0 to height inclusive)
    pub height: i32,
    /// Creatures leaving through the left/right edge re-enter on the other side
    pub wrap_horizontal: bool,
    /// Creatures leaving through the top/bottom edge re-enter on the other side
    pub wrap_vertical: bool,
    /// Food particles scattered at startup
    pub start_food: usize,
    /// Key particles scattered at startup
    pub start_keys: usize,
}

impl WorldConfig {
    pub fn size(&self) -> WorldSize {
        WorldSize::new(self.width, self.height)
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            wrap_horizontal: false,
            wrap_vertical: false,
            start_food: 50_000,
            start_keys: 250,
        }
    }
}

/// Upper bound for every energy setting, far below `i32::MAX` so that
/// creature energy has headroom for many meals.
pub const MAX_ENERGY_SETTING: i32 = 1 << 24;

/// Energy economy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyConfig {
    /// Starting energy for the initial ancestors
    pub ancestor_energy: i32,
    /// Starting energy for every newborn
    pub offspring_energy: i32,
    /// Energy lost by every creature each tick
    pub energy_loss: i32,
    /// Energy gained per food particle eaten
    pub energy_gain: i32,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            ancestor_energy: 2000,
            offspring_energy: 1000,
            energy_loss: 1,
            energy_gain: 10,
        }
    }
}

/// Structural evolution parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionRules {
    /// Chance that a newborn receives one structural mutation
    pub mutation_probability: f64,
    /// Chance that a mutation tries to grow a cell rather than shed one
    pub add_cell_probability: f64,
}

impl Default for EvolutionRules {
    fn default() -> Self {
        Self {
            mutation_probability: 0.2,
            add_cell_probability: 0.5,
        }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of ticks the runner advances
    pub num_ticks: u64,
    /// Random seed for reproducibility
    pub seed: u64,
    /// Number of ancestors created at startup
    pub start_population: usize,
    /// Ticks between population statistics snapshots
    pub stats_interval: u64,
    pub world: WorldConfig,
    pub energy: EnergyConfig,
    pub rules: EvolutionRules,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_ticks: 10_000,
            seed: 0,
            start_population: 250,
            stats_interval: 10,
            world: WorldConfig::default(),
            energy: EnergyConfig::default(),
            rules: EvolutionRules::default(),
        }
    }
}

impl SimulationConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading simulation config");
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Reject configurations the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        let world = &self.world;
        if world.width <= 0 || world.height <= 0 {
            return Err(Error::Config(format!(
                "world size must be positive, got {}x{}",
                world.width, world.height
            )));
        }

        // Particles are placed on distinct coordinates, so they must fit.
        let particles = world.start_food as u64 + world.start_keys as u64;
        let capacity = world.size().cell_count();
        if particles > capacity {
            return Err(Error::Config(format!(
                "{} particles do not fit in a world of {} cells",
                particles, capacity
            )));
        }

        for (name, p) in [
            ("mutation_probability", self.rules.mutation_probability),
            ("add_cell_probability", self.rules.add_cell_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(Error::Config(format!("{} must be within [0, 1], got {}", name, p)));
            }
        }

        let energy = &self.energy;
        for (name, value) in [
            ("ancestor_energy", energy.ancestor_energy),
            ("offspring_energy", energy.offspring_energy),
            ("energy_loss", energy.energy_loss),
            ("energy_gain", energy.energy_gain),
        ] {
            if !(0..=MAX_ENERGY_SETTING).contains(&value) {
                return Err(Error::Config(format!(
                    "{} must be within [0, {}], got {}",
                    name, MAX_ENERGY_SETTING, value
                )));
            }
        }

        if self.stats_interval == 0 {
            return Err(Error::Config("stats_interval must be at least 1".to_string()));
        }

        Ok(())
    }
}
