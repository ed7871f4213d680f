use serde::Deserialize;
use serde::Serialize;
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::simulation::{
    DEFAULT_DECAY_FACTOR, DEFAULT_DEPOSIT_AMOUNT, DEFAULT_DETECTION_THRESHOLD,
    DEFAULT_FOOD_ENERGY, DEFAULT_FOOD_PICKUP_RADIUS, DEFAULT_TILE_SIZE, DEFAULT_VISION_RADIUS,
    DEFAULT_WORLD_HEIGHT, DEFAULT_WORLD_WIDTH, INITIAL_ENERGY, MAX_PHEROMONE_AMOUNT,
    MOVEMENT_COST, MOVEMENT_SPEED, REPRODUCTION_ENERGY_COST, REPRODUCTION_ENERGY_THRESHOLD,
};

/// Parameters of one colony: world geometry, ant physiology and pheromone dynamics.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ColonyConfig {
    pub tile_size: f32,
    pub world_width: f32,
    pub world_height: f32,
    pub movement_speed: f32,
    pub vision_radius: f32,
    pub pheromone_decay_factor: f32,
    pub pheromone_deposit_amount: f32,
    pub pheromone_max_intensity: f32,
    pub pheromone_detection_threshold: f32,
    pub pheromone_diffusion_rate: f32,
    pub reproduction_energy_cost: u32,
    pub reproduction_energy_threshold: u32,
    pub food_pickup_radius: f32,
    pub initial_energy: u32,
    pub movement_cost: u32,
    pub nest_x: Option<f32>, // None = world centre
    pub nest_y: Option<f32>,
    pub nest_radius: Option<f32>, // None = one tile
    pub max_age: Option<u32>,
    pub seed: u64,
    pub parallel_agents: bool,
}

impl Default for ColonyConfig {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            world_width: DEFAULT_WORLD_WIDTH,
            world_height: DEFAULT_WORLD_HEIGHT,
            movement_speed: MOVEMENT_SPEED,
            vision_radius: DEFAULT_VISION_RADIUS,
            pheromone_decay_factor: DEFAULT_DECAY_FACTOR,
            pheromone_deposit_amount: DEFAULT_DEPOSIT_AMOUNT,
            pheromone_max_intensity: MAX_PHEROMONE_AMOUNT,
            pheromone_detection_threshold: DEFAULT_DETECTION_THRESHOLD,
            pheromone_diffusion_rate: 0.0,
            reproduction_energy_cost: REPRODUCTION_ENERGY_COST,
            reproduction_energy_threshold: REPRODUCTION_ENERGY_THRESHOLD,
            food_pickup_radius: DEFAULT_FOOD_PICKUP_RADIUS,
            initial_energy: INITIAL_ENERGY,
            movement_cost: MOVEMENT_COST,
            nest_x: None,
            nest_y: None,
            nest_radius: None,
            max_age: None,
            seed: 0x5EED_A275,
            parallel_agents: false,
        }
    }
}

impl ColonyConfig {
    /// Tile grid dimensions covering the world.
    pub fn grid_size(&self) -> (u32, u32) {
        (
            (self.world_width / self.tile_size).ceil().max(1.0) as u32,
            (self.world_height / self.tile_size).ceil().max(1.0) as u32,
        )
    }

    pub fn nest(&self) -> (f32, f32) {
        (
            self.nest_x.unwrap_or(self.world_width / 2.0),
            self.nest_y.unwrap_or(self.world_height / 2.0),
        )
    }

    pub fn nest_radius(&self) -> f32 {
        self.nest_radius.unwrap_or(self.tile_size)
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("tile_size", self.tile_size)?;
        positive("world_width", self.world_width)?;
        positive("world_height", self.world_height)?;
        positive("movement_speed", self.movement_speed)?;
        non_negative("vision_radius", self.vision_radius)?;
        non_negative("pheromone_deposit_amount", self.pheromone_deposit_amount)?;
        positive("pheromone_max_intensity", self.pheromone_max_intensity)?;
        non_negative(
            "pheromone_detection_threshold",
            self.pheromone_detection_threshold,
        )?;
        non_negative("food_pickup_radius", self.food_pickup_radius)?;

        let decay = self.pheromone_decay_factor;
        if !(decay > 0.0 && decay < 1.0) {
            return Err(ConfigError::invalid(
                "pheromone_decay_factor",
                format!("{} is not in (0, 1)", decay),
            ));
        }
        let diffusion = self.pheromone_diffusion_rate;
        if !(0.0..=1.0).contains(&diffusion) {
            return Err(ConfigError::invalid(
                "pheromone_diffusion_rate",
                format!("{} is not in [0, 1]", diffusion),
            ));
        }
        if self.initial_energy == 0 {
            return Err(ConfigError::invalid("initial_energy", "must be at least 1"));
        }
        if let Some(radius) = self.nest_radius {
            non_negative("nest_radius", radius)?;
        }
        let (nest_x, nest_y) = self.nest();
        if !(0.0..=self.world_width).contains(&nest_x) || !(0.0..=self.world_height).contains(&nest_y)
        {
            return Err(ConfigError::invalid(
                "nest_x/nest_y",
                format!("({}, {}) lies outside the world", nest_x, nest_y),
            ));
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{} must be positive", value)))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("{} must not be negative", value),
        ))
    }
}

/// Top-level configuration file: the colony plus how the driver seeds and runs it.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub colony: ColonyConfig,
    pub initial_population: u32,
    pub food_count: u32,
    pub food_energy: u32,
    pub ticks: u64,
    pub report_every: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            colony: ColonyConfig::default(),
            initial_population: 50,
            food_count: 20,
            food_energy: DEFAULT_FOOD_ENERGY,
            ticks: 1000,
            report_every: 100,
        }
    }
}

/// Configuration for the driver run including CLI overrides.
pub struct AppConfig {
    pub simulation: SimulationConfig,
    pub snapshot_out: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_cli_and_config(
        cli: &crate::cli::Cli,
        mut simulation: SimulationConfig,
    ) -> Result<Self, ConfigError> {
        if let Some(ticks) = cli.ticks {
            simulation.ticks = ticks;
        }
        if let Some(seed) = cli.seed {
            simulation.colony.seed = seed;
        }
        if let Some(every) = cli.report_every {
            simulation.report_every = every;
        }
        if cli.parallel {
            simulation.colony.parallel_agents = true;
        }

        simulation.colony.validate()?;

        Ok(Self {
            simulation,
            snapshot_out: cli.snapshot_out.clone(),
        })
    }
}
