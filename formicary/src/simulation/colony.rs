use super::ant::{Ant, AntId, AntParams, Surroundings};
use super::food::{FoodKey, FoodSource};
use super::map::{GameMap, TileGrid, WorldBounds};
use super::pheromone::{PheromoneField, StagedDeposits};
use crate::config::ColonyConfig;
use crate::error::{ColonyError, ConfigError, Result};

use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use shared::{ColonySnapshot, FieldView, FoodView};
use slotmap::SlotMap;
use tracing::{debug, trace, warn};

/// Decides which surviving ants reproduce at the end of a tick.
pub trait ReproductionPolicy: Send {
    fn wants_offspring(&mut self, ant: &Ant, tick: u64) -> bool;
}

impl<F> ReproductionPolicy for F
where
    F: FnMut(&Ant, u64) -> bool + Send,
{
    fn wants_offspring(&mut self, ant: &Ant, tick: u64) -> bool {
        self(ant, tick)
    }
}

/// Reproduce whenever energy is above a threshold.
#[derive(Debug, Clone, Copy)]
pub struct EnergyThreshold {
    pub threshold: u32,
}

impl ReproductionPolicy for EnergyThreshold {
    fn wants_offspring(&mut self, ant: &Ant, _tick: u64) -> bool {
        ant.energy > self.threshold
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NeverReproduce;

impl ReproductionPolicy for NeverReproduce {
    fn wants_offspring(&mut self, _ant: &Ant, _tick: u64) -> bool {
        false
    }
}

/// What happened during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u64,
    pub advanced: usize,
    pub eaten: usize,
    pub delivered: usize,
    pub deaths: usize,
    pub births: usize,
    pub population: usize,
}

/// Owns the live ants, the food and the pheromone field, and runs the tick.
pub struct Colony<G: TileGrid = GameMap> {
    config: ColonyConfig,
    params: AntParams,
    bounds: WorldBounds,
    grid: G,
    field: PheromoneField,
    /// Sorted by ascending id at all times.
    ants: Vec<Ant>,
    food: SlotMap<FoodKey, FoodSource>,
    nest: Vec2,
    next_ant_id: u64,
    tick: u64,
    food_collected: u32,
    staged: StagedDeposits,
    reproduction: Box<dyn ReproductionPolicy>,
}

impl<G: TileGrid> Colony<G> {
    pub fn new(config: ColonyConfig, grid: G) -> std::result::Result<Self, ConfigError> {
        config.validate()?;

        let (width, height) = grid.size();
        if width == 0 || height == 0 {
            return Err(ConfigError::invalid("tiles", "tile grid is empty"));
        }
        let (expected_width, expected_height) = config.grid_size();
        if (width, height) != (expected_width, expected_height) {
            return Err(ConfigError::invalid(
                "tiles",
                format!(
                    "grid is {}x{} tiles, world needs {}x{}",
                    width, height, expected_width, expected_height
                ),
            ));
        }
        let field = PheromoneField::new(
            width,
            height,
            config.tile_size,
            config.pheromone_max_intensity,
            config.pheromone_detection_threshold,
        );
        let (nest_x, nest_y) = config.nest();

        Ok(Self {
            params: AntParams::from(&config),
            bounds: WorldBounds::new(config.world_width, config.world_height, config.tile_size),
            grid,
            field,
            ants: Vec::new(),
            food: SlotMap::with_key(),
            nest: Vec2::new(nest_x, nest_y),
            next_ant_id: 1,
            tick: 0,
            food_collected: 0,
            staged: StagedDeposits::default(),
            reproduction: Box::new(EnergyThreshold {
                threshold: config.reproduction_energy_threshold,
            }),
            config,
        })
    }

    pub fn with_reproduction_policy(mut self, policy: impl ReproductionPolicy + 'static) -> Self {
        self.reproduction = Box::new(policy);
        self
    }

    pub fn set_reproduction_policy(&mut self, policy: impl ReproductionPolicy + 'static) {
        self.reproduction = Box::new(policy);
    }

    /// Advance the whole colony by one step:
    /// 1. Decay (and diffuse) the pheromone field
    /// 2. Advance every live ant in id order against the start-of-tick field
    /// 3. Merge this tick's deposits
    /// 4. Resolve food pickups and deliveries at the nest
    /// 5. Remove dead ants
    /// 6. Let the reproduction policy add offspring
    pub fn tick(&mut self) -> TickReport {
        self.tick += 1;
        let mut report = TickReport {
            tick: self.tick,
            ..Default::default()
        };

        self.field.decay(self.config.pheromone_decay_factor);
        if self.config.pheromone_diffusion_rate > 0.0 {
            self.field.diffuse(self.config.pheromone_diffusion_rate);
        }

        report.advanced = self.advance_ants();
        self.field.apply(&self.staged);
        self.staged.clear();

        self.resolve_food(&mut report);
        self.resolve_deaths(&mut report);
        self.resolve_reproduction(&mut report);

        report.population = self.ants.len();
        trace!(?report, "tick complete");
        report
    }

    fn advance_ants(&mut self) -> usize {
        let surroundings = Surroundings {
            field: &self.field,
            grid: &self.grid,
            bounds: self.bounds,
            nest: self.nest,
        };
        let (seed, tick) = (self.config.seed, self.tick);
        let alive = self.ants.iter().filter(|ant| !ant.is_dead()).count();

        if self.config.parallel_agents {
            let staged: Vec<StagedDeposits> = self
                .ants
                .par_iter_mut()
                .map(|ant| {
                    let mut deposits = StagedDeposits::default();
                    let mut rng = ant_rng(seed, tick, ant.id);
                    ant.advance(&surroundings, &mut deposits, &mut rng);
                    deposits
                })
                .collect();
            for mut deposits in staged {
                self.staged.append(&mut deposits);
            }
        } else {
            for ant in self.ants.iter_mut() {
                let mut rng = ant_rng(seed, tick, ant.id);
                ant.advance(&surroundings, &mut self.staged, &mut rng);
            }
        }
        alive
    }

    /// Each live ant eats the first undepleted food source in range, in food
    /// iteration order. Ants are visited by id, so the lowest id wins a contested source.
    fn resolve_food(&mut self, report: &mut TickReport) {
        let pickup_radius = self.config.food_pickup_radius;
        let nest_radius = self.config.nest_radius();

        for ant in self.ants.iter_mut().filter(|ant| !ant.is_dead()) {
            let found = self
                .food
                .iter_mut()
                .find(|(_, food)| !food.depleted && food.is_within(ant.pos, pickup_radius));
            if let Some((key, food)) = found {
                let energy = food.take();
                match ant.eat(energy) {
                    Ok(()) => {
                        ant.start_returning();
                        report.eaten += 1;
                        debug!(ant = %ant.id, ?key, energy, "food eaten");
                    }
                    Err(e) => warn!("food pickup rejected: {}", e),
                }
            }

            if ant.pos.distance(self.nest) <= nest_radius && ant.arrive_home() {
                self.food_collected += 1;
                report.delivered += 1;
                debug!(ant = %ant.id, total = self.food_collected, "food delivered to nest");
            }
        }
    }

    fn resolve_deaths(&mut self, report: &mut TickReport) {
        if let Some(max_age) = self.config.max_age {
            for ant in self.ants.iter_mut() {
                if !ant.is_dead() && ant.age >= max_age {
                    debug!(ant = %ant.id, age = ant.age, "died of old age");
                    ant.die();
                }
            }
        }

        let before = self.ants.len();
        self.ants.retain(|ant| {
            if ant.is_dead() {
                debug!(ant = %ant.id, "removing dead ant");
            }
            !ant.is_dead()
        });
        report.deaths = before - self.ants.len();
    }

    fn resolve_reproduction(&mut self, report: &mut TickReport) {
        let cost = self.config.reproduction_energy_cost;
        let mut offspring = Vec::new();

        for ant in self.ants.iter_mut() {
            if !self.reproduction.wants_offspring(ant, self.tick) {
                continue;
            }
            match ant.reproduce(cost, AntId(self.next_ant_id)) {
                Ok(child) => {
                    self.next_ant_id += 1;
                    debug!(parent = %ant.id, child = %child.id, "ant born");
                    offspring.push(child);
                }
                Err(e) => debug!("reproduction skipped: {}", e),
            }
        }

        report.births = offspring.len();
        // Fresh ids are larger than every live id, so appending keeps the order.
        self.ants.extend(offspring);
    }

    /// Add an idle ant. Positions outside the world are clamped onto its edge.
    /// An ant placed on unwalkable ground is still added but cannot move.
    pub fn spawn_agent(&mut self, pos: Vec2) -> AntId {
        let id = AntId(self.next_ant_id);
        self.next_ant_id += 1;

        let clamped = self.bounds.clamp(pos);
        if clamped != pos {
            debug!(ant = %id, ?pos, ?clamped, "spawn position clamped into the world");
        }
        if !self.is_walkable_at(clamped) {
            warn!(ant = %id, pos = ?clamped, "ant spawned on unwalkable ground, it will not be able to move");
        }
        self.ants.push(Ant::new(id, clamped, self.params.clone()));
        id
    }

    /// True if `pos` is inside the world and on a walkable tile.
    pub fn is_walkable_at(&self, pos: Vec2) -> bool {
        self.bounds.is_passable(&self.grid, pos)
    }

    pub fn spawn_agents(&mut self, pos: Vec2, count: u32) {
        for _ in 0..count {
            self.spawn_agent(pos);
        }
    }

    /// Remove an ant from the live set and hand it back.
    pub fn despawn_agent(&mut self, id: AntId) -> Result<Ant> {
        match self.ants.binary_search_by_key(&id, |ant| ant.id) {
            Ok(index) => Ok(self.ants.remove(index)),
            Err(_) => Err(ColonyError::NotFound(id)),
        }
    }

    pub fn ant(&self, id: AntId) -> Option<&Ant> {
        self.ants
            .binary_search_by_key(&id, |ant| ant.id)
            .ok()
            .map(|index| &self.ants[index])
    }

    pub fn ant_mut(&mut self, id: AntId) -> Option<&mut Ant> {
        match self.ants.binary_search_by_key(&id, |ant| ant.id) {
            Ok(index) => Some(&mut self.ants[index]),
            Err(_) => None,
        }
    }

    /// Live ants in ascending id order.
    pub fn ants(&self) -> &[Ant] {
        &self.ants
    }

    pub fn population(&self) -> usize {
        self.ants.len()
    }

    pub fn spawn_food(&mut self, pos: Vec2, energy: u32) -> FoodKey {
        self.food.insert(FoodSource::new(pos, energy))
    }

    pub fn remove_food(&mut self, key: FoodKey) -> Result<FoodSource> {
        self.food.remove(key).ok_or(ColonyError::FoodNotFound)
    }

    /// Drop every depleted food source. Returns how many were removed.
    pub fn clear_depleted_food(&mut self) -> usize {
        let before = self.food.len();
        self.food.retain(|_, food| !food.depleted);
        before - self.food.len()
    }

    pub fn food_source(&self, key: FoodKey) -> Option<&FoodSource> {
        self.food.get(key)
    }

    pub fn food(&self) -> impl Iterator<Item = (FoodKey, &FoodSource)> {
        self.food.iter()
    }

    pub fn field(&self) -> &PheromoneField {
        &self.field
    }

    pub fn field_mut(&mut self) -> &mut PheromoneField {
        &mut self.field
    }

    pub fn grid(&self) -> &G {
        &self.grid
    }

    pub fn bounds(&self) -> WorldBounds {
        self.bounds
    }

    pub fn nest(&self) -> Vec2 {
        self.nest
    }

    pub fn food_collected(&self) -> u32 {
        self.food_collected
    }

    /// Number of completed ticks.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn config(&self) -> &ColonyConfig {
        &self.config
    }

    /// Read-only picture of the colony for a renderer.
    pub fn snapshot(&self) -> ColonySnapshot {
        ColonySnapshot {
            tick: self.tick,
            nest: (self.nest.x, self.nest.y),
            food_collected: self.food_collected,
            agents: self.ants.iter().map(Ant::view).collect(),
            food: self
                .food
                .values()
                .map(|food| FoodView {
                    x: food.pos.x,
                    y: food.pos.y,
                    energy: food.energy,
                    depleted: food.depleted,
                })
                .collect(),
            field: FieldView {
                width: self.field.width,
                height: self.field.height,
                cells: self.field.cells().to_vec(),
            },
        }
    }
}

/// Independent random stream for one ant during one tick. Depends only on the
/// colony seed, the tick and the ant id, so results do not depend on thread scheduling.
fn ant_rng(seed: u64, tick: u64, id: AntId) -> ChaCha8Rng {
    let mixed = splitmix64(splitmix64(seed ^ tick.rotate_left(32)) ^ id.0);
    ChaCha8Rng::seed_from_u64(mixed)
}

fn splitmix64(value: u64) -> u64 {
    let mut z = value.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
