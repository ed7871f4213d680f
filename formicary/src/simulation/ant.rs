use super::map::{TileGrid, WorldBounds};
use super::pheromone::{PheromoneField, PheromoneSink};
use super::{
    DEFAULT_DEPOSIT_AMOUNT, DEFAULT_VISION_RADIUS, INITIAL_ENERGY, MOVEMENT_COST,
    MOVEMENT_JITTER, MOVEMENT_SPEED, RETURNING_DEPOSIT_BOOST, TRAIL_NOISE, WANDER_INTERVAL,
    WANDER_NOISE, WANDER_PROBABILITY,
};
use crate::config::ColonyConfig;
use crate::error::{ColonyError, Result};

use glam::Vec2;
use rand::Rng;
use shared::{AgentStateTag, AgentView, bearing, wrap_angle};
use std::f32::consts::{PI, TAU};
use std::fmt;

/// Unique, never reused identifier of an ant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AntId(pub u64);

impl fmt::Display for AntId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Behavioral mode of an ant. `Dead` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AntState {
    Idle,
    Exploring,
    Returning,
    Dead,
}

impl From<AntState> for AgentStateTag {
    fn from(state: AntState) -> Self {
        match state {
            AntState::Idle => AgentStateTag::Idle,
            AntState::Exploring => AgentStateTag::Exploring,
            AntState::Returning => AgentStateTag::Returning,
            AntState::Dead => AgentStateTag::Dead,
        }
    }
}

/// Physiology shared by every ant of a colony.
#[derive(Debug, Clone, PartialEq)]
pub struct AntParams {
    pub speed: f32,
    pub vision: f32,
    pub deposit_amount: f32,
    pub movement_cost: u32,
    pub initial_energy: u32,
}

impl Default for AntParams {
    fn default() -> Self {
        Self {
            speed: MOVEMENT_SPEED,
            vision: DEFAULT_VISION_RADIUS,
            deposit_amount: DEFAULT_DEPOSIT_AMOUNT,
            movement_cost: MOVEMENT_COST,
            initial_energy: INITIAL_ENERGY,
        }
    }
}

impl From<&ColonyConfig> for AntParams {
    fn from(config: &ColonyConfig) -> Self {
        Self {
            speed: config.movement_speed,
            vision: config.vision_radius,
            deposit_amount: config.pheromone_deposit_amount,
            movement_cost: config.movement_cost,
            initial_energy: config.initial_energy,
        }
    }
}

/// Everything an ant reads while advancing.
pub struct Surroundings<'a, G: TileGrid + ?Sized> {
    /// Field as of the start of the tick.
    pub field: &'a PheromoneField,
    pub grid: &'a G,
    pub bounds: WorldBounds,
    pub nest: Vec2,
}

/// State of an ant.
#[derive(Debug, Clone, PartialEq)]
pub struct Ant {
    pub id: AntId,
    pub parent_id: Option<AntId>,

    pub pos: Vec2,
    /// `None` until the first move picks a random heading.
    pub heading: Option<f32>,
    pub energy: u32,
    pub age: u32,
    pub state: AntState,
    pub direction_change_counter: u32,
    pub params: AntParams,
}

impl Ant {
    /// Create a new idle ant with full energy and no heading.
    pub fn new(id: AntId, pos: Vec2, params: AntParams) -> Self {
        Self {
            id,
            parent_id: None,
            pos,
            heading: None,
            energy: params.initial_energy,
            age: 0,
            state: AntState::Idle,
            direction_change_counter: 0,
            params,
        }
    }

    /// Returns true if ant is dead.
    pub fn is_dead(&self) -> bool {
        self.state == AntState::Dead
    }

    /// One tick of sensing, steering, moving, laying pheromone and paying for it.
    ///
    /// Pheromone is read from `surroundings.field` and written to `sink`, so
    /// the caller decides when deposits become visible. Dead ants do nothing.
    pub fn advance<G, S, R>(&mut self, surroundings: &Surroundings<'_, G>, sink: &mut S, rng: &mut R)
    where
        G: TileGrid + ?Sized,
        S: PheromoneSink + ?Sized,
        R: Rng,
    {
        if self.is_dead() {
            return;
        }

        let mut heading = match self.heading {
            Some(heading) => heading,
            None => {
                self.state = AntState::Exploring;
                rng.random_range(0.0..TAU)
            }
        };

        heading = self.steer(heading, surroundings, rng);

        // Move, with imperfect locomotion
        let displacement = Vec2::new(
            self.params.speed * heading.cos() + rng.random_range(-MOVEMENT_JITTER..=MOVEMENT_JITTER),
            self.params.speed * heading.sin() + rng.random_range(-MOVEMENT_JITTER..=MOVEMENT_JITTER),
        );
        let tentative = self.pos + displacement;
        let (hit_x, hit_y) = self.commit_move(tentative, surroundings);
        self.heading = Some(reflect(heading, hit_x, hit_y));

        let mut amount = self.params.deposit_amount;
        if self.state == AntState::Returning {
            amount *= RETURNING_DEPOSIT_BOOST;
        }
        sink.deposit(self.pos, amount);

        self.energy = self.energy.saturating_sub(self.params.movement_cost);
        self.age += 1;
        if self.energy == 0 {
            self.state = AntState::Dead;
        }
    }

    /// Pick this tick's heading.
    fn steer<G, R>(&mut self, heading: f32, surroundings: &Surroundings<'_, G>, rng: &mut R) -> f32
    where
        G: TileGrid + ?Sized,
        R: Rng,
    {
        if self.state == AntState::Returning {
            self.direction_change_counter = 0;
            let home = bearing(self.pos.x, self.pos.y, surroundings.nest.x, surroundings.nest.y);
            return wrap_angle(home + rng.random_range(-TRAIL_NOISE..=TRAIL_NOISE));
        }

        if let Some(signal) = surroundings.field.sample(self.pos, self.params.vision) {
            self.direction_change_counter = 0;
            return wrap_angle(signal.direction + rng.random_range(-TRAIL_NOISE..=TRAIL_NOISE));
        }

        if self.direction_change_counter >= WANDER_INTERVAL || rng.random_bool(WANDER_PROBABILITY) {
            self.direction_change_counter = 0;
            return wrap_angle(heading + rng.random_range(-WANDER_NOISE..=WANDER_NOISE));
        }

        self.direction_change_counter += 1;
        heading
    }

    /// Commit each axis of `tentative` independently. An axis is rejected when it
    /// would leave the world or land on an unwalkable tile. Returns which axes
    /// were rejected.
    fn commit_move<G>(&mut self, tentative: Vec2, surroundings: &Surroundings<'_, G>) -> (bool, bool)
    where
        G: TileGrid + ?Sized,
    {
        let bounds = &surroundings.bounds;
        let grid = surroundings.grid;

        let hit_x = !bounds.is_passable(grid, Vec2::new(tentative.x, self.pos.y));
        if !hit_x {
            self.pos.x = tentative.x;
        }

        let hit_y = !bounds.is_passable(grid, Vec2::new(self.pos.x, tentative.y));
        if !hit_y {
            self.pos.y = tentative.y;
        }

        (hit_x, hit_y)
    }

    /// Gain energy. Fails on a dead ant.
    pub fn eat(&mut self, amount: u32) -> Result<()> {
        if self.is_dead() {
            return Err(ColonyError::AntDead(self.id));
        }
        self.energy = self.energy.saturating_add(amount);
        Ok(())
    }

    /// Pay `cost` energy for an offspring at the same position.
    ///
    /// Requires strictly more energy than `cost`; on failure nothing changes.
    pub fn reproduce(&mut self, cost: u32, child_id: AntId) -> Result<Ant> {
        if self.is_dead() {
            return Err(ColonyError::AntDead(self.id));
        }
        if self.energy <= cost {
            return Err(ColonyError::InsufficientEnergy {
                id: self.id,
                energy: self.energy,
                cost,
            });
        }
        self.energy -= cost;

        let mut child = Ant::new(child_id, self.pos, self.params.clone());
        child.parent_id = Some(self.id);
        Ok(child)
    }

    /// Kill the ant. Idempotent.
    pub fn die(&mut self) {
        self.energy = 0;
        self.age = 0;
        self.state = AntState::Dead;
    }

    /// Switch to homing after picking up food.
    pub fn start_returning(&mut self) {
        if !self.is_dead() {
            self.state = AntState::Returning;
        }
    }

    /// Drop food at the nest and go back to exploring. Returns true if the ant was carrying food.
    pub fn arrive_home(&mut self) -> bool {
        if self.state == AntState::Returning {
            self.state = AntState::Exploring;
            return true;
        }
        false
    }

    pub fn view(&self) -> AgentView {
        AgentView {
            id: self.id.0,
            x: self.pos.x,
            y: self.pos.y,
            heading: self.heading.unwrap_or(0.0),
            state: self.state.into(),
        }
    }
}

/// Billiard reflection: a blocked x-axis mirrors the heading about the vertical
/// (`π − θ`), a blocked y-axis about the horizontal (`−θ`).
pub fn reflect(heading: f32, hit_x: bool, hit_y: bool) -> f32 {
    let mut heading = heading;
    if hit_x {
        heading = PI - heading;
    }
    if hit_y {
        heading = -heading;
    }
    wrap_angle(heading)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::map::{GameMap, Terrain};
    use crate::simulation::pheromone::StagedDeposits;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use shared::angle_distance;
    use std::f32::consts::FRAC_PI_2;

    struct World {
        field: PheromoneField,
        map: GameMap,
        bounds: WorldBounds,
        nest: Vec2,
    }

    impl World {
        fn open() -> Self {
            Self {
                field: PheromoneField::new(20, 15, 40.0, 255.0, 0.15),
                map: GameMap::new(20, 15),
                bounds: WorldBounds::new(800.0, 600.0, 40.0),
                nest: Vec2::new(400.0, 300.0),
            }
        }

        fn surroundings(&self) -> Surroundings<'_, GameMap> {
            Surroundings {
                field: &self.field,
                grid: &self.map,
                bounds: self.bounds,
                nest: self.nest,
            }
        }
    }

    fn ant_at(x: f32, y: f32) -> Ant {
        Ant::new(AntId(1), Vec2::new(x, y), AntParams::default())
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    #[test]
    fn test_first_advance_initializes_heading() {
        let world = World::open();
        let mut ant = ant_at(400.0, 300.0);
        assert_eq!(ant.heading, None);
        assert_eq!(ant.state, AntState::Idle);

        ant.advance(&world.surroundings(), &mut StagedDeposits::default(), &mut rng());

        let heading = ant.heading.unwrap();
        assert!((0.0..TAU).contains(&heading));
        assert_eq!(ant.state, AntState::Exploring);
        assert!(ant.pos.distance(Vec2::new(400.0, 300.0)) < 1.5);
    }

    #[test]
    fn test_movement_costs_one_energy_and_ages() {
        let world = World::open();
        let mut ant = ant_at(400.0, 300.0);
        let mut rng = rng();
        for tick in 1..=5 {
            ant.advance(&world.surroundings(), &mut StagedDeposits::default(), &mut rng);
            assert_eq!(ant.energy, INITIAL_ENERGY - tick);
            assert_eq!(ant.age, tick);
        }
    }

    #[test]
    fn test_last_energy_point_kills() {
        let world = World::open();
        let mut ant = ant_at(400.0, 300.0);
        ant.energy = 1;
        let mut rng = rng();

        ant.advance(&world.surroundings(), &mut StagedDeposits::default(), &mut rng);
        assert_eq!(ant.energy, 0);
        assert_eq!(ant.state, AntState::Dead);

        let pos = ant.pos;
        ant.advance(&world.surroundings(), &mut StagedDeposits::default(), &mut rng);
        assert_eq!(ant.pos, pos);
        assert_eq!(ant.age, 1);
    }

    #[test]
    fn test_deposits_at_new_position() {
        let world = World::open();
        let mut ant = ant_at(400.0, 300.0);
        let mut staged = StagedDeposits::default();
        ant.advance(&world.surroundings(), &mut staged, &mut rng());

        let deposits: Vec<_> = staged.iter().copied().collect();
        assert_eq!(deposits, vec![(ant.pos, DEFAULT_DEPOSIT_AMOUNT)]);
    }

    #[test]
    fn test_west_wall_reflects_heading() {
        let world = World::open();
        let mut ant = ant_at(0.5, 300.0);
        ant.heading = Some(PI);
        ant.state = AntState::Exploring;

        ant.advance(&world.surroundings(), &mut StagedDeposits::default(), &mut rng());

        assert_eq!(ant.pos.x, 0.5);
        assert!(ant.heading.unwrap().cos() > 0.5, "heading still points west");
    }

    #[test]
    fn test_south_wall_reflects_heading() {
        let world = World::open();
        let mut ant = ant_at(400.0, 599.5);
        ant.heading = Some(FRAC_PI_2);
        ant.state = AntState::Exploring;

        ant.advance(&world.surroundings(), &mut StagedDeposits::default(), &mut rng());

        assert_eq!(ant.pos.y, 599.5);
        assert!(ant.heading.unwrap().sin() < -0.5, "heading still points south");
    }

    #[test]
    fn test_water_blocks_like_a_wall() {
        let mut world = World::open();
        world.map.set_terrain_at(1, 0, Terrain::Water);
        let mut ant = ant_at(39.5, 20.0);
        ant.heading = Some(0.0);
        ant.state = AntState::Exploring;

        ant.advance(&world.surroundings(), &mut StagedDeposits::default(), &mut rng());

        assert_eq!(ant.pos.x, 39.5);
        assert!(ant.heading.unwrap().cos() < -0.5);
    }

    #[test]
    fn test_reflect_only_touches_violated_axis() {
        let heading = 0.6;
        let x_only = reflect(heading, true, false);
        assert!((x_only.cos() + heading.cos()).abs() < 1e-5);
        assert!((x_only.sin() - heading.sin()).abs() < 1e-5);

        let y_only = reflect(heading, false, true);
        assert!((y_only.cos() - heading.cos()).abs() < 1e-5);
        assert!((y_only.sin() + heading.sin()).abs() < 1e-5);

        assert!((reflect(heading, false, false) - heading).abs() < 1e-6);
    }

    #[test]
    fn test_follows_sensed_trail() {
        let mut world = World::open();
        world.field.deposit(Vec2::new(140.0, 100.0), 50.0);
        let mut ant = ant_at(119.0, 100.0);
        ant.heading = Some(FRAC_PI_2);
        ant.state = AntState::Exploring;
        ant.direction_change_counter = 5;

        ant.advance(&world.surroundings(), &mut StagedDeposits::default(), &mut rng());

        assert_eq!(ant.direction_change_counter, 0);
        // Trail lies due east; noise is at most π/6
        let heading = ant.heading.unwrap();
        assert!(angle_distance(heading, 0.0) <= TRAIL_NOISE + 1e-4);
    }

    #[test]
    fn test_wander_interval_forces_turn() {
        let world = World::open();
        let mut ant = ant_at(400.0, 300.0);
        ant.heading = Some(1.0);
        ant.state = AntState::Exploring;
        ant.direction_change_counter = WANDER_INTERVAL;

        ant.advance(&world.surroundings(), &mut StagedDeposits::default(), &mut rng());

        assert_eq!(ant.direction_change_counter, 0);
        assert!(angle_distance(ant.heading.unwrap(), 1.0) <= WANDER_NOISE + 1e-4);
    }

    #[test]
    fn test_steady_heading_counts_ticks() {
        let world = World::open();
        let mut rng = rng();
        let mut ant = ant_at(400.0, 300.0);
        ant.heading = Some(1.0);
        ant.state = AntState::Exploring;

        for _ in 0..50 {
            let before = (ant.heading.unwrap(), ant.direction_change_counter);
            ant.advance(&world.surroundings(), &mut StagedDeposits::default(), &mut rng);
            let counter = ant.direction_change_counter;
            if counter == 0 {
                assert!(angle_distance(ant.heading.unwrap(), before.0) <= WANDER_NOISE + 1e-4);
            } else {
                assert_eq!(counter, before.1 + 1);
                assert_eq!(ant.heading.unwrap(), before.0);
            }
            assert!(counter <= WANDER_INTERVAL);
        }
    }

    #[test]
    fn test_returning_ant_heads_home_and_lays_stronger_trail() {
        let world = World::open();
        let mut ant = ant_at(100.0, 300.0);
        ant.heading = Some(PI);
        ant.state = AntState::Returning;
        let mut staged = StagedDeposits::default();

        ant.advance(&world.surroundings(), &mut staged, &mut rng());

        assert_eq!(ant.state, AntState::Returning);
        assert!(angle_distance(ant.heading.unwrap(), 0.0) <= TRAIL_NOISE + 1e-4);
        assert!(ant.pos.x > 100.0);
        let amount = staged.iter().next().unwrap().1;
        assert_eq!(amount, DEFAULT_DEPOSIT_AMOUNT * RETURNING_DEPOSIT_BOOST);
    }

    #[test]
    fn test_eat_adds_energy_unless_dead() {
        let mut ant = ant_at(0.0, 0.0);
        ant.eat(10).unwrap();
        assert_eq!(ant.energy, INITIAL_ENERGY + 10);

        ant.die();
        assert_eq!(ant.eat(10), Err(ColonyError::AntDead(AntId(1))));
        assert_eq!(ant.energy, 0);
    }

    #[test]
    fn test_reproduce_requires_more_than_cost() {
        let mut ant = ant_at(3.0, 4.0);
        ant.energy = 10;
        let before = ant.clone();
        assert_eq!(
            ant.reproduce(10, AntId(2)),
            Err(ColonyError::InsufficientEnergy {
                id: AntId(1),
                energy: 10,
                cost: 10
            })
        );
        assert_eq!(ant, before);
    }

    #[test]
    fn test_reproduce_creates_child() {
        let mut ant = ant_at(3.0, 4.0);
        ant.age = 40;
        ant.heading = Some(2.0);
        ant.state = AntState::Exploring;

        let child = ant.reproduce(10, AntId(2)).unwrap();

        assert_eq!(ant.energy, INITIAL_ENERGY - 10);
        assert_eq!(child.id, AntId(2));
        assert_eq!(child.parent_id, Some(AntId(1)));
        assert_eq!(child.pos, ant.pos);
        assert_eq!(child.energy, INITIAL_ENERGY);
        assert_eq!(child.age, 0);
        assert_eq!(child.state, AntState::Idle);
        assert_eq!(child.heading, None);
    }

    #[test]
    fn test_die_is_idempotent() {
        let mut ant = ant_at(0.0, 0.0);
        ant.age = 12;
        ant.die();
        let once = ant.clone();
        ant.die();
        assert_eq!(ant, once);
        assert_eq!((ant.energy, ant.age, ant.state), (0, 0, AntState::Dead));
    }

    #[test]
    fn test_arrive_home_only_counts_carriers() {
        let mut ant = ant_at(0.0, 0.0);
        ant.state = AntState::Exploring;
        assert!(!ant.arrive_home());
        ant.start_returning();
        assert!(ant.arrive_home());
        assert_eq!(ant.state, AntState::Exploring);
    }
}
