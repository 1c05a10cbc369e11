use asteroid_colony::beacon::BEACON_LIFETIME;
use asteroid_colony::miner::{MiningDrone, find_optimal_beacon};
use asteroid_colony::{
    AgentId, ColonyConfig, ConfigError, ExplorationPattern, MinerState, Position, ResourceType,
    World,
};

fn bare_config(seed: u64) -> ColonyConfig {
    ColonyConfig {
        width: 20,
        height: 20,
        num_scouts: 0,
        num_miners: 0,
        num_asteroids: 0,
        radiation_probability: 0.0,
        seed: Some(seed),
        ..ColonyConfig::default()
    }
}

fn logged(world: &World, needle: &str) -> bool {
    world.events.iter().any(|e| e.message.contains(needle))
}

#[test]
fn test_single_iron_deposit_is_mined_out_and_processed() {
    let mut world = World::new(bare_config(42)).unwrap();
    let base = world.base;
    world.add_deposit(base.offset(2, 0), ResourceType::Iron, 30);
    world.add_scout(base, ExplorationPattern::Spiral);
    world.add_miner(base);

    let mut claim_seen = false;
    let mut depletion_seen = false;
    let mut ticks = 0;
    while world.station.processed_of(ResourceType::Iron) < 30 && ticks < 180 {
        let remaining_before = u64::from(world.deposits[0].remaining_value);
        world.step();
        ticks += 1;

        if !claim_seen {
            if let Some(claim) = world.beacons.values().next() {
                assert_eq!(claim.value, 30);
                assert_eq!(claim.original_value, 30);
                claim_seen = true;
            }
        }

        let mined = world.stats.resources_mined;
        if mined > 0 {
            assert!(mined <= remaining_before);
            assert!(
                (6..=9).contains(&mined) || mined == remaining_before,
                "tick {ticks}: mined {mined} with {remaining_before} left"
            );
        }

        if !depletion_seen && world.deposits[0].is_depleted {
            depletion_seen = true;
            assert_eq!(world.miners[0].state, MinerState::Returning);
            assert_eq!(world.miners[0].target_claim, None);
            assert!(world.beacons.is_empty());
        }
    }

    assert!(claim_seen);
    assert!(depletion_seen);
    assert_eq!(world.station.processed_of(ResourceType::Iron), 30);
    assert_eq!(world.total_resources_collected, 30);
    assert_eq!(world.total_asteroids_depleted, 1);
    assert_eq!(world.deposits[0].remaining_value, 0);
    assert_eq!(world.total_value(), 30);
}

#[test]
fn test_miner_stuck_while_mining_steps_aside() {
    let mut world = World::new(bare_config(11)).unwrap();
    let spot = Position::new(4, 4);
    world.add_deposit(spot, ResourceType::Helium, 10);
    let claim = world.place_beacon(0, 0).unwrap();
    let m = world.add_miner(spot);
    world.miners[m].state = MinerState::Mining;
    world.miners[m].target_claim = Some(claim);
    world.miners[m].recent_positions.extend([spot; 4]);

    world.activate(AgentId::Miner(m));

    let miner = &world.miners[m];
    assert_eq!(miner.position.chebyshev(spot), 1);
    assert_eq!(miner.state, MinerState::Mining);
    assert_eq!(miner.energy, 150.0);
    assert_eq!(world.beacons[&claim].value, 10);
    assert!(world.grid.contents(miner.position).contains(&AgentId::Miner(m)));
    assert!(logged(&world, "Miner 0 was stuck"));
}

#[test]
fn test_stuck_recharging_miner_waits_out_countdown() {
    let mut world = World::new(bare_config(12)).unwrap();
    let base = world.base;
    let m = world.add_miner(base);
    world.miners[m].state = MinerState::Recharging;
    world.miners[m].energy = 100.0;
    world.miners[m].wait_countdown = 2;
    world.miners[m].recent_positions.extend([base; 4]);

    world.activate(AgentId::Miner(m));

    let miner = &world.miners[m];
    assert_eq!(miner.position, base);
    assert_eq!(miner.wait_countdown, 1);
    assert_eq!(miner.energy, 100.0);
    assert_eq!(miner.state, MinerState::Recharging);
}

#[test]
fn test_radiation_forces_miner_home() {
    let mut world = World::new(bare_config(1)).unwrap();
    let spot = Position::new(3, 3);
    world.add_miner(spot);
    world.miners[0] = MiningDrone::with_limits(spot, world.base, 50.0, 50);
    world.miners[0].energy = 12.0;

    let hazard = world.add_radiation(spot, 4);
    if let Some(radiation) = world.hazards.get_mut(&hazard) {
        radiation.warning_countdown = 0;
        radiation.active = true;
    }
    world.activate(AgentId::Hazard(hazard));

    assert_eq!(world.miners[0].energy, 7.0);
    assert_eq!(world.miners[0].state, MinerState::Returning);
    assert!(logged(&world, "miner-0 critically damaged"));
}

#[test]
fn test_warning_phase_does_no_damage() {
    let mut world = World::new(bare_config(1)).unwrap();
    let spot = Position::new(3, 3);
    world.add_miner(spot);
    let hazard = world.add_radiation(spot, 4);

    for _ in 0..3 {
        world.activate(AgentId::Hazard(hazard));
    }
    assert_eq!(world.miners[0].energy, 150.0);
    assert!(world.hazards[&hazard].active);
    assert!(logged(&world, "Radiation activated"));

    for _ in 0..10 {
        world.activate(AgentId::Hazard(hazard));
    }
    assert_eq!(world.miners[0].energy, 100.0);
    assert!(world.hazards.is_empty());
    assert!(logged(&world, "Radiation event ended"));
}

#[test]
fn test_station_processes_in_arrival_order() {
    let mut world = World::new(bare_config(3)).unwrap();
    world.station.receive(12, ResourceType::Iron);
    world.station.receive(5, ResourceType::Gold);

    world.activate(AgentId::Station);
    assert_eq!(world.station.processed_of(ResourceType::Iron), 12);
    assert_eq!(world.station.processed_of(ResourceType::Gold), 0);

    world.activate(AgentId::Station);
    assert_eq!(world.station.processed_of(ResourceType::Gold), 0);
    world.activate(AgentId::Station);
    assert_eq!(world.station.processed_of(ResourceType::Gold), 5);

    assert_eq!(world.total_value(), 12 + 25);
    assert!(logged(&world, "Station processed 12 iron"));
    assert!(logged(&world, "Station processed 5 gold"));
}

#[test]
fn test_claims_offered_in_creation_order_with_congestion() {
    let mut world = World::new(bare_config(5)).unwrap();
    let base = world.base;
    world.add_deposit(base.offset(3, 0), ResourceType::Gold, 20);
    world.add_deposit(base.offset(-3, 0), ResourceType::Gold, 20);
    let first = world.place_beacon(0, 0).unwrap();
    let second = world.place_beacon(1, 0).unwrap();

    let candidates = world.claim_candidates();
    assert_eq!(candidates.iter().map(|c| c.id).collect::<Vec<_>>(), vec![first, second]);
    // same score on both sides: the older claim wins
    assert_eq!(find_optimal_beacon(base, 150.0, &candidates), Some(first));

    for _ in 0..2 {
        let m = world.add_miner(base);
        world.miners[m].target_claim = Some(first);
        world.miners[m].state = MinerState::MovingToClaim;
    }
    assert_eq!(world.miners_targeting(first), 2);
    let candidates = world.claim_candidates();
    assert_eq!(find_optimal_beacon(base, 150.0, &candidates), Some(second));
}

#[test]
fn test_unmined_claim_expires() {
    let mut world = World::new(bare_config(6)).unwrap();
    world.add_deposit(Position::new(4, 4), ResourceType::Water, 20);
    let claim = world.place_beacon(0, 0).unwrap();

    for _ in 0..BEACON_LIFETIME - 1 {
        world.activate(AgentId::Beacon(claim));
    }
    assert!(world.beacons.contains_key(&claim));
    world.activate(AgentId::Beacon(claim));

    assert!(world.beacons.is_empty());
    assert!(!world.grid.contents(Position::new(4, 4)).contains(&AgentId::Beacon(claim)));
    assert!(!world.deposits[0].is_depleted);
    assert!(logged(&world, "Beacon expired"));
}

#[test]
fn test_claim_over_emptied_deposit_is_exhausted() {
    let mut world = World::new(bare_config(6)).unwrap();
    world.add_deposit(Position::new(4, 4), ResourceType::Helium, 10);
    let claim = world.place_beacon(0, 0).unwrap();
    world.deposits[0].remaining_value = 0;

    world.activate(AgentId::Beacon(claim));

    assert!(world.beacons.is_empty());
    assert!(world.deposits[0].is_depleted);
    assert_eq!(world.total_asteroids_depleted, 1);
    // the deposit's own turn must not count it a second time
    world.activate(AgentId::Deposit(0));
    assert_eq!(world.total_asteroids_depleted, 1);
}

#[test]
fn test_bad_configs_are_rejected() {
    assert!(matches!(
        ColonyConfig::from_toml_str("width = 0"),
        Err(ConfigError::EmptyGrid { width: 0, .. })
    ));
    assert!(matches!(
        ColonyConfig::from_toml_str("radiation_probability = 1.5"),
        Err(ConfigError::InvalidProbability { name: "radiation_probability", .. })
    ));
    assert!(matches!(
        ColonyConfig::from_toml_str("width = \"wide\""),
        Err(ConfigError::Parse(_))
    ));

    let config = ColonyConfig::from_toml_str("width = 30\nheight = 24\nseed = 9").unwrap();
    let world = World::new(config).unwrap();
    assert_eq!(world.base, Position::new(15, 12));
}
