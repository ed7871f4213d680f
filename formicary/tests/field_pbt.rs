use formicary::config::ColonyConfig;
use formicary::simulation::{Colony, GameMap, NeverReproduce, PHEROMONE_EPSILON, PheromoneField};
use glam::Vec2;
use proptest::prelude::*;
use std::f32::consts::TAU;

prop_compose! {
    fn arb_position()(
        x in -50.0f32..850.0,
        y in -50.0f32..650.0
    ) -> Vec2 {
        Vec2::new(x, y)
    }
}

fn field() -> PheromoneField {
    PheromoneField::new(20, 15, 40.0, 255.0, 0.15)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn test_field_stays_within_bounds(
        deposits in prop::collection::vec((arb_position(), -10.0f32..120.0), 1..60),
        factor in 0.01f32..0.999
    ) {
        let mut field = field();
        for (pos, amount) in &deposits {
            field.deposit(*pos, *amount);
        }
        field.decay(factor);

        for &cell in field.cells() {
            prop_assert!(cell >= 0.0, "cell went negative: {}", cell);
            prop_assert!(cell <= field.max_intensity(), "cell {} over max", cell);
        }
    }

    #[test]
    fn test_decay_composes(
        amount in 1.0f32..255.0,
        a in 0.05f32..0.999,
        b in 0.05f32..0.999
    ) {
        let pos = Vec2::new(100.0, 100.0);
        let mut twice = field();
        twice.deposit(pos, amount);
        twice.decay(a);
        twice.decay(b);

        let mut once = field();
        once.deposit(pos, amount);
        once.decay(a * b);

        let (lhs, rhs) = (twice.intensity_at(pos), once.intensity_at(pos));
        // Either side may snap to zero just under the epsilon
        prop_assert!((lhs - rhs).abs() <= 1e-3 * amount + PHEROMONE_EPSILON, "{} vs {}", lhs, rhs);
    }

    #[test]
    fn test_sampled_signal_is_detectable(
        deposits in prop::collection::vec((arb_position(), 0.0f32..5.0), 1..40),
        pos in arb_position(),
        radius in 1.0f32..80.0
    ) {
        let mut field = field();
        for (at, amount) in &deposits {
            field.deposit(*at, *amount);
        }

        if let Some(signal) = field.sample(pos, radius) {
            prop_assert!(signal.intensity >= 0.15);
            prop_assert!((0.0..TAU).contains(&signal.direction));
            prop_assert_ne!(Some(signal.tile), field.tile_of(pos));
        }
    }

    #[test]
    fn test_ants_stay_in_world_and_only_lose_energy(
        seed in any::<u64>(),
        spawns in prop::collection::vec(arb_position(), 1..12)
    ) {
        let config = ColonyConfig { seed, ..ColonyConfig::default() };
        let (w, h) = config.grid_size();
        let (width, height) = (config.world_width, config.world_height);
        let mut colony = Colony::new(config, GameMap::new(w, h))
            .unwrap()
            .with_reproduction_policy(NeverReproduce);
        for pos in &spawns {
            colony.spawn_agent(*pos);
        }

        let mut previous: Vec<(u64, u32)> = colony.ants().iter().map(|a| (a.id.0, a.energy)).collect();
        for _ in 0..40 {
            colony.tick();
            for ant in colony.ants() {
                prop_assert!((0.0..=width).contains(&ant.pos.x), "x out of world: {}", ant.pos.x);
                prop_assert!((0.0..=height).contains(&ant.pos.y), "y out of world: {}", ant.pos.y);
                let before = previous.iter().find(|(id, _)| *id == ant.id.0).map(|(_, e)| *e);
                prop_assert_eq!(before.map(|e| e - 1), Some(ant.energy));
            }
            previous = colony.ants().iter().map(|a| (a.id.0, a.energy)).collect();
        }
    }
}
