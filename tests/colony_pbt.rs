use asteroid_colony::{AgentId, ColonyConfig, World};
use proptest::prelude::*;

prop_compose! {
    fn arb_config()(
        seed in any::<u64>(),
        width in 8u32..30,
        height in 8u32..30,
        num_scouts in 1usize..4,
        num_miners in 1usize..6,
        num_asteroids in 5usize..40,
        radiation_probability in 0.0f64..0.2,
    ) -> ColonyConfig {
        ColonyConfig {
            width,
            height,
            num_scouts,
            num_miners,
            num_asteroids,
            radiation_probability,
            seed: Some(seed),
            ..ColonyConfig::default()
        }
    }
}

fn check_drones(world: &World) -> Result<(), TestCaseError> {
    for (i, scout) in world.scouts.iter().enumerate() {
        prop_assert!(scout.energy >= 0.0 && scout.energy <= scout.max_energy);
        prop_assert!(world.grid.in_bounds(scout.position));
        prop_assert!(world.grid.contents(scout.position).contains(&AgentId::Scout(i)));
    }
    for (i, miner) in world.miners.iter().enumerate() {
        prop_assert!(miner.energy >= 0.0 && miner.energy <= miner.max_energy);
        prop_assert!(miner.capacity <= miner.max_capacity);
        prop_assert!(world.grid.in_bounds(miner.position));
        prop_assert!(world.grid.contents(miner.position).contains(&AgentId::Miner(i)));
        if miner.capacity > 0 {
            prop_assert!(miner.carried_resource.is_some());
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn test_colony_invariants_hold(config in arb_config()) {
        let mut world = World::new(config).unwrap();
        let mut previous: Vec<(u32, bool)> = world
            .deposits
            .iter()
            .map(|d| (d.remaining_value, d.is_depleted))
            .collect();

        for _ in 0..80 {
            world.step();
            check_drones(&world)?;

            for (i, deposit) in world.deposits.iter().enumerate() {
                prop_assert!(deposit.remaining_value <= deposit.original_value);
                if deposit.is_depleted {
                    prop_assert_eq!(deposit.remaining_value, 0);
                }
                if let Some((value, depleted)) = previous.get(i) {
                    prop_assert!(deposit.remaining_value <= *value, "deposit {} value grew", i);
                    prop_assert!(deposit.is_depleted || !*depleted, "deposit {} un-depleted", i);
                }
            }
            previous = world
                .deposits
                .iter()
                .map(|d| (d.remaining_value, d.is_depleted))
                .collect();

            for (id, beacon) in &world.beacons {
                prop_assert!(beacon.value <= beacon.original_value);
                prop_assert!(beacon.value > 0);
                prop_assert!(world.grid.contents(beacon.position).contains(&AgentId::Beacon(*id)));
            }

            let received: u64 = world.station.received.values().sum();
            prop_assert_eq!(received, world.total_resources_collected);
            prop_assert!(world.station.total_processed <= received);
            prop_assert_eq!(world.total_asteroids_depleted as usize, world.count_depleted());
        }
    }

    #[test]
    fn test_same_seed_replays_identically(seed in any::<u64>()) {
        let config = ColonyConfig::default().with_seed(seed);
        let mut a = World::new(config.clone()).unwrap();
        let mut b = World::new(config).unwrap();
        a.run(40);
        b.run(40);
        prop_assert_eq!(a.snapshot(), b.snapshot());
    }
}
