use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use shared::ColonySnapshot;
use tracing::{debug, info, warn};

use crate::config::SimulationConfig;
use crate::error::ConfigError;

use super::colony::{Colony, TickReport};
use super::map::GameMap;

const FOOD_PLACEMENT_SALT: u64 = 0xF00D_F00D;
const FOOD_PLACEMENT_ATTEMPTS: u32 = 64;

/// A colony on a map, populated from a [`SimulationConfig`], plus run control.
pub struct Simulation {
    pub is_paused: bool,
    pub config: SimulationConfig,
    map: GameMap,
    colony: Colony,
}

impl Simulation {
    /// Build an all-grass world sized from the config.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        let (width, height) = config.colony.grid_size();
        Self::with_map(config, GameMap::new(width, height))
    }

    pub fn with_map(config: SimulationConfig, map: GameMap) -> Result<Self, ConfigError> {
        let colony = populate(&config, map.clone())?;
        Ok(Self {
            is_paused: true,
            config,
            map,
            colony,
        })
    }

    /// Runs one tick unless paused.
    pub fn update(&mut self) -> Option<TickReport> {
        if self.is_paused {
            return None;
        }
        Some(self.tick())
    }

    /// Runs one tick regardless of the pause flag.
    pub fn tick(&mut self) -> TickReport {
        self.colony.tick()
    }

    /// Number of completed ticks since creation or the last reset.
    pub fn tick_count(&self) -> u64 {
        self.colony.tick_count()
    }

    pub fn pause(&mut self) {
        self.is_paused = true;
    }

    pub fn unpause(&mut self) {
        self.is_paused = false;
    }

    pub fn toggle_pause(&mut self) {
        self.is_paused = !self.is_paused;
    }

    /// Throw the colony away and repopulate it from the config and the starting map.
    pub fn reset(&mut self) -> Result<(), ConfigError> {
        self.pause();
        self.colony = populate(&self.config, self.map.clone())?;
        Ok(())
    }

    pub fn colony(&self) -> &Colony {
        &self.colony
    }

    pub fn colony_mut(&mut self) -> &mut Colony {
        &mut self.colony
    }

    pub fn map(&self) -> &GameMap {
        &self.map
    }

    pub fn total_ant_count(&self) -> usize {
        self.colony.population()
    }

    pub fn snapshot(&self) -> ColonySnapshot {
        self.colony.snapshot()
    }
}

/// Create the colony, put the initial population in the nest and scatter food
/// over walkable ground.
fn populate(config: &SimulationConfig, map: GameMap) -> Result<Colony, ConfigError> {
    let mut colony = Colony::new(config.colony.clone(), map)?;
    let nest = colony.nest();
    let bounds = colony.bounds();
    if !colony.is_walkable_at(nest) {
        warn!(?nest, "nest sits on unwalkable ground, ants will not be able to leave it");
    }
    colony.spawn_agents(nest, config.initial_population);

    let mut rng = ChaCha8Rng::seed_from_u64(config.colony.seed ^ FOOD_PLACEMENT_SALT);
    let mut placed = 0;
    for _ in 0..config.food_count {
        let spot = (0..FOOD_PLACEMENT_ATTEMPTS)
            .map(|_| {
                Vec2::new(
                    rng.random_range(0.0..=bounds.width),
                    rng.random_range(0.0..=bounds.height),
                )
            })
            .find(|pos| colony.is_walkable_at(*pos));

        match spot {
            Some(pos) => {
                let key = colony.spawn_food(pos, config.food_energy);
                debug!(?key, ?pos, "food placed");
                placed += 1;
            }
            None => warn!(
                attempts = FOOD_PLACEMENT_ATTEMPTS,
                "no walkable spot found for food source"
            ),
        }
    }

    info!(
        ants = colony.population(),
        food = placed,
        seed = config.colony.seed,
        "colony populated"
    );
    Ok(colony)
}
