pub mod ant;
mod colony;
mod food;
mod map;
mod pheromone;
mod sim;

// Re-export key types for easier imports
pub use ant::{Ant, AntId, AntParams, AntState};
pub use colony::{Colony, EnergyThreshold, NeverReproduce, ReproductionPolicy, TickReport};
pub use food::{FoodKey, FoodSource};
pub use map::{GameMap, Terrain, TileGrid, TileIndex, WorldBounds};
pub use pheromone::{PheromoneField, PheromoneSink, Signal, StagedDeposits};
pub use sim::Simulation;

// World defaults
pub const DEFAULT_TILE_SIZE: f32 = 40.0;
pub const DEFAULT_WORLD_WIDTH: f32 = 800.0;
pub const DEFAULT_WORLD_HEIGHT: f32 = 600.0;

// Ant defaults
pub const INITIAL_ENERGY: u32 = 100;
pub const MOVEMENT_COST: u32 = 1;
pub const MOVEMENT_SPEED: f32 = 1.0;
pub const DEFAULT_VISION_RADIUS: f32 = 10.0;
pub const MOVEMENT_JITTER: f32 = 0.2; // Per-axis locomotion noise
pub const TRAIL_NOISE: f32 = std::f32::consts::FRAC_PI_6; // Spread around a sensed trail
pub const WANDER_NOISE: f32 = std::f32::consts::FRAC_PI_4; // Spread of a spontaneous turn
pub const WANDER_INTERVAL: u32 = 20; // Ticks without a deliberate turn before one is forced
pub const WANDER_PROBABILITY: f64 = 0.1;
pub const RETURNING_DEPOSIT_BOOST: f32 = 1.5; // Food-carrying ants lay stronger trails

// Lifecycle defaults
pub const REPRODUCTION_ENERGY_COST: u32 = 10;
pub const REPRODUCTION_ENERGY_THRESHOLD: u32 = 150;
pub const DEFAULT_FOOD_ENERGY: u32 = 10;
pub const DEFAULT_FOOD_PICKUP_RADIUS: f32 = 15.0;

// Pheromone defaults
pub const MAX_PHEROMONE_AMOUNT: f32 = 255.0;
pub const DEFAULT_DECAY_FACTOR: f32 = 0.98;
pub const DEFAULT_DEPOSIT_AMOUNT: f32 = 5.0;
pub const DEFAULT_DETECTION_THRESHOLD: f32 = 0.15;
pub const PHEROMONE_EPSILON: f32 = 0.01; // Intensities below this snap to zero on decay
