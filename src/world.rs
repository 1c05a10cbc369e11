//! # World & Scheduler
//!
//! The [`World`] owns every entity of a colony run and advances them one
//! tick at a time. Each tick the scheduler
//!
//! 1. resets the per-tick statistics,
//! 2. may spawn a solar radiation event (and, if configured, a deposit),
//! 3. activates every live entity exactly once in a freshly shuffled order,
//! 4. folds the drones' spent energy into the operational cost.
//!
//! Entities created during a tick wait for the next one; entities removed
//! during a tick are skipped when their turn comes. Which drone sees a claim
//! that another drone created or exhausted earlier in the same tick depends
//! on the shuffle, and that is accepted nondeterminism.

use crate::beacon::{Beacon, BeaconFate};
use crate::config::ColonyConfig;
use crate::deposit::Deposit;
use crate::error::Result;
use crate::events::EventLog;
use crate::field::{self, RichnessField};
use crate::grid::Grid;
use crate::hazard::{RADIATION_RADIUS, SolarRadiation};
use crate::miner::{ClaimCandidate, MiningDrone};
use crate::scout::{PatternCursor, ScoutDrone};
use crate::station::ProcessingStation;
use crate::types::{AgentId, ExplorationPattern, Position, ResourceType};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Counters reset at the start of every tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickStats {
    pub emergency_returns: u32,
    pub beacons_placed: u32,
    pub resources_mined: u64,
    pub resources_delivered: u64,
    pub asteroids_depleted: u32,
}

pub struct World {
    pub config: ColonyConfig,
    pub grid: Grid,
    pub base: Position,
    pub station: ProcessingStation,
    pub deposits: Vec<Deposit>,
    pub beacons: BTreeMap<u64, Beacon>,
    pub hazards: BTreeMap<u64, SolarRadiation>,
    pub scouts: Vec<ScoutDrone>,
    pub miners: Vec<MiningDrone>,
    pub events: EventLog,
    pub stats: TickStats,
    pub tick: u64,
    pub total_resources_collected: u64,
    pub total_asteroids_depleted: u64,
    pub operational_cost: f64,
    pub(crate) rng: ChaCha8Rng,
    field: RichnessField,
    next_id: u64,
    depletion_decile: u64,
}

impl World {
    /// Builds a colony from `config`: station at the grid center, the deposit
    /// field, then the scouts and miners docked at base.
    pub fn new(config: ColonyConfig) -> Result<Self> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let grid = Grid::new(config.width, config.height);
        let base = Position::new((config.width / 2) as i32, (config.height / 2) as i32);
        let field = RichnessField::new(&mut rng);

        let mut world = Self {
            events: EventLog::new(config.event_log_capacity),
            grid,
            base,
            station: ProcessingStation::new(),
            deposits: Vec::new(),
            beacons: BTreeMap::new(),
            hazards: BTreeMap::new(),
            scouts: Vec::new(),
            miners: Vec::new(),
            stats: TickStats::default(),
            tick: 0,
            total_resources_collected: 0,
            total_asteroids_depleted: 0,
            operational_cost: 0.0,
            rng,
            field,
            next_id: 0,
            depletion_decile: 0,
            config,
        };
        world.grid.place(AgentId::Station, base);

        let plan = field::generate(
            &mut world.rng,
            &world.grid,
            &world.field,
            base,
            world.config.num_asteroids,
            world.config.resource_richness,
        );
        for primary in &plan.clusters {
            world.record(format!("Created {primary} asteroid cluster"));
        }
        for deposit in plan.deposits {
            world.insert_deposit(deposit);
        }
        world.record(format!("Created {} asteroids total", world.deposits.len()));

        for i in 0..world.config.num_scouts {
            world.add_scout(base, ExplorationPattern::for_index(i));
        }
        for _ in 0..world.config.num_miners {
            world.add_miner(base);
        }

        world.record(format!(
            "Colony initialized with {} scouts, {} miners, and {} asteroids",
            world.scouts.len(),
            world.miners.len(),
            world.deposits.len()
        ));
        info!(
            width = world.grid.width,
            height = world.grid.height,
            scouts = world.scouts.len(),
            miners = world.miners.len(),
            deposits = world.deposits.len(),
            "colony ready"
        );
        Ok(world)
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Appends to the recent-events log.
    pub fn record(&mut self, message: String) {
        self.events.push(self.tick, message);
    }

    fn insert_deposit(&mut self, deposit: Deposit) -> usize {
        let index = self.deposits.len();
        self.grid.place(AgentId::Deposit(index), deposit.position);
        self.deposits.push(deposit);
        index
    }

    /// Places a deposit by hand. Off-grid positions are clamped onto the grid.
    pub fn add_deposit(&mut self, position: Position, resource_type: ResourceType, value: u32) -> usize {
        let position = self.grid.clamp(position);
        self.insert_deposit(Deposit::new(position, resource_type, value))
    }

    pub fn add_scout(&mut self, position: Position, pattern: ExplorationPattern) -> usize {
        let position = self.grid.clamp(position);
        let cursor = PatternCursor::new(pattern, self.grid.width, self.grid.height, &mut self.rng);
        let index = self.scouts.len();
        self.grid.place(AgentId::Scout(index), position);
        self.scouts.push(ScoutDrone::new(
            position,
            self.base,
            self.config.scout_sensor_range,
            cursor,
        ));
        index
    }

    pub fn add_miner(&mut self, position: Position) -> usize {
        let position = self.grid.clamp(position);
        let index = self.miners.len();
        self.grid.place(AgentId::Miner(index), position);
        self.miners.push(MiningDrone::new(position, self.base));
        index
    }

    /// Starts a radiation event (in its warning phase) over a disk.
    pub fn add_radiation(&mut self, center: Position, radius: u32) -> u64 {
        let id = self.next_id();
        let radiation = SolarRadiation::new(&self.grid, center, radius);
        let warning = radiation.warning_countdown;
        warn!(hazard = id, %center, radius, tick = self.tick, "solar radiation incoming");
        self.hazards.insert(id, radiation);
        self.record(format!(
            "Radiation warning detected! Will activate in {warning} steps"
        ));
        id
    }

    /// Plants a claim over deposit `deposit` on behalf of scout `scout`.
    pub fn place_beacon(&mut self, deposit: usize, scout: usize) -> Option<u64> {
        let (position, resource, value) = {
            let d = self.deposits.get(deposit)?;
            (d.position, d.resource_type, d.remaining_value)
        };
        let id = self.next_id();
        self.beacons
            .insert(id, Beacon::new(position, resource, value, deposit, self.tick));
        self.grid.place(AgentId::Beacon(id), position);
        self.stats.beacons_placed += 1;
        self.record(format!("Scout {scout} placed beacon for {resource}"));
        Some(id)
    }

    /// Takes a claim off the grid and out of the active set. Exhausted claims
    /// also deplete their deposit. Returns false if the claim was already
    /// gone.
    pub fn retire_beacon(&mut self, id: u64, fate: BeaconFate) -> bool {
        let Some(beacon) = self.beacons.remove(&id) else {
            return false;
        };
        self.grid.remove(AgentId::Beacon(id), beacon.position);

        match fate {
            BeaconFate::Exhausted => {
                let newly_depleted = self
                    .deposits
                    .get_mut(beacon.deposit)
                    .is_some_and(Deposit::deplete);
                if newly_depleted {
                    self.on_deposit_depleted(beacon.deposit);
                }
                self.record(format!("Asteroid depleted: {}", beacon.resource_type));
            }
            BeaconFate::Expired => {
                let age = beacon.age(self.tick);
                self.record(format!("Beacon expired after {age} steps"));
            }
            BeaconFate::Active => {}
        }
        true
    }

    pub fn retire_exhausted_beacon(&mut self, id: u64) -> bool {
        self.retire_beacon(id, BeaconFate::Exhausted)
    }

    pub(crate) fn on_deposit_depleted(&mut self, index: usize) {
        self.stats.asteroids_depleted += 1;
        self.total_asteroids_depleted += 1;
        debug!(deposit = index, tick = self.tick, "deposit depleted");
    }

    /// Number of miners whose current target is `claim`.
    pub fn miners_targeting(&self, claim: u64) -> usize {
        self.miners
            .iter()
            .filter(|m| m.target_claim == Some(claim))
            .count()
    }

    /// Every active claim, in creation order, with its congestion count.
    pub fn claim_candidates(&self) -> Vec<ClaimCandidate> {
        self.beacons
            .iter()
            .map(|(id, beacon)| ClaimCandidate {
                id: *id,
                position: beacon.position,
                value: beacon.value,
                resource_type: beacon.resource_type,
                miners_targeting: self.miners_targeting(*id),
            })
            .collect()
    }

    /// Every live entity, in a stable order before shuffling.
    pub fn agents(&self) -> Vec<AgentId> {
        let mut ids = Vec::with_capacity(
            1 + self.deposits.len()
                + self.scouts.len()
                + self.miners.len()
                + self.beacons.len()
                + self.hazards.len(),
        );
        ids.push(AgentId::Station);
        ids.extend((0..self.deposits.len()).map(AgentId::Deposit));
        ids.extend((0..self.scouts.len()).map(AgentId::Scout));
        ids.extend((0..self.miners.len()).map(AgentId::Miner));
        ids.extend(self.beacons.keys().map(|id| AgentId::Beacon(*id)));
        ids.extend(self.hazards.keys().map(|id| AgentId::Hazard(*id)));
        ids
    }

    /// Advances the whole colony by one tick.
    pub fn step(&mut self) {
        self.stats = TickStats::default();
        self.maybe_spawn_radiation();
        self.maybe_spawn_deposit();

        let mut order = self.agents();
        order.shuffle(&mut self.rng);
        for id in order {
            self.activate(id);
        }

        self.operational_cost += self.energy_spent();
        self.tick += 1;
        self.report_milestones();
    }

    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.step();
        }
    }

    /// Runs one entity's turn. Handles that no longer resolve are ignored.
    pub fn activate(&mut self, id: AgentId) {
        match id {
            AgentId::Station => {
                let outcome = self.station.tick();
                if let Some(batch) = outcome.started {
                    self.record(format!(
                        "Station started processing {} {}",
                        batch.amount, batch.resource_type
                    ));
                }
                if let Some(batch) = outcome.completed {
                    self.record(format!(
                        "Station processed {} {}",
                        batch.amount, batch.resource_type
                    ));
                }
            }
            AgentId::Deposit(index) => {
                let newly_depleted = self
                    .deposits
                    .get_mut(index)
                    .is_some_and(Deposit::check_depleted);
                if newly_depleted {
                    self.on_deposit_depleted(index);
                }
            }
            AgentId::Beacon(beacon_id) => {
                let Some(beacon) = self.beacons.get_mut(&beacon_id) else {
                    return;
                };
                let deposit_value = self
                    .deposits
                    .get(beacon.deposit)
                    .map(|d| d.remaining_value);
                let fate = beacon.tick(deposit_value);
                if fate != BeaconFate::Active {
                    self.retire_beacon(beacon_id, fate);
                }
            }
            AgentId::Scout(index) => {
                if index >= self.scouts.len() {
                    return;
                }
                let mut scout = std::mem::take(&mut self.scouts[index]);
                scout.step(index, self);
                self.scouts[index] = scout;
            }
            AgentId::Miner(index) => {
                if index >= self.miners.len() {
                    return;
                }
                // the parked placeholder has no target, so the miner never
                // counts itself when measuring congestion
                let mut miner = std::mem::take(&mut self.miners[index]);
                miner.step(index, self);
                self.miners[index] = miner;
            }
            AgentId::Hazard(hazard_id) => self.activate_radiation(hazard_id),
        }
    }

    fn activate_radiation(&mut self, id: u64) {
        let Some(radiation) = self.hazards.get_mut(&id) else {
            return;
        };
        let outcome = radiation.tick();
        let radiation = &self.hazards[&id];

        let mut messages = Vec::new();
        if outcome.activated {
            messages.push("Radiation activated! Drones in affected area taking damage".to_string());
        }

        if outcome.damaging {
            let damage = radiation.damage_per_tick;
            let mut affected = 0;
            for (i, scout) in self.scouts.iter_mut().enumerate() {
                if radiation.covers(scout.position) {
                    affected += 1;
                    if scout.take_radiation(damage) {
                        messages.push(format!(
                            "Drone scout-{i} critically damaged by radiation, returning to base"
                        ));
                    }
                }
            }
            for (i, miner) in self.miners.iter_mut().enumerate() {
                if radiation.covers(miner.position) {
                    affected += 1;
                    if miner.take_radiation(damage) {
                        messages.push(format!(
                            "Drone miner-{i} critically damaged by radiation, returning to base"
                        ));
                    }
                }
            }
            if affected > 0 && radiation.duration_remaining % 3 == 0 {
                messages.push(format!("Radiation affecting {affected} drones"));
            }
        }

        if outcome.expired {
            self.hazards.remove(&id);
            messages.push("Radiation event ended".to_string());
        }
        for message in messages {
            self.record(message);
        }
    }

    fn maybe_spawn_radiation(&mut self) {
        if !self.rng.gen_bool(self.config.radiation_probability) {
            return;
        }
        let center = self.grid.random_cell(&mut self.rng);
        let radius = self.rng.gen_range(RADIATION_RADIUS);
        self.add_radiation(center, radius);
    }

    fn maybe_spawn_deposit(&mut self) {
        if self.config.deposit_spawn_probability <= 0.0
            || !self.rng.gen_bool(self.config.deposit_spawn_probability)
        {
            return;
        }
        let deposit = field::spawn_one(
            &mut self.rng,
            &self.grid,
            &self.field,
            self.base,
            self.config.resource_richness,
        );
        let resource = deposit.resource_type;
        let position = deposit.position;
        self.insert_deposit(deposit);
        self.record(format!("New {resource} asteroid drifted in at {position}"));
    }

    /// Energy currently missing across all drones.
    pub fn energy_spent(&self) -> f64 {
        let scouts: f64 = self.scouts.iter().map(|s| s.max_energy - s.energy).sum();
        let miners: f64 = self.miners.iter().map(|m| m.max_energy - m.energy).sum();
        scouts + miners
    }

    fn report_milestones(&mut self) {
        if self.tick % 50 == 0 {
            let value = self.station.total_value();
            let collected = self.total_resources_collected;
            self.record(format!(
                "Step {}: {collected} resources collected, value: {value}",
                self.tick
            ));
            info!(tick = self.tick, collected, value, "colony progress");
        }

        let total = self.deposits.len() as u64;
        if total == 0 {
            return;
        }
        let depleted = self.count_depleted() as u64;
        let decile = depleted * 10 / total;
        if decile > self.depletion_decile {
            self.depletion_decile = decile;
            let pct = depleted as f64 / total as f64 * 100.0;
            self.record(format!(
                "{pct:.1}% of asteroids depleted ({depleted}/{total})"
            ));
        }
    }

    pub fn count_depleted(&self) -> usize {
        self.deposits.iter().filter(|d| d.is_depleted).count()
    }

    /// Undepleted deposits no active claim points at.
    pub fn count_undiscovered(&self) -> usize {
        self.deposits
            .iter()
            .enumerate()
            .filter(|(i, d)| !d.is_depleted && !self.beacons.values().any(|b| b.deposit == *i))
            .count()
    }

    /// Resources delivered per unit of energy currently spent by the fleet.
    pub fn mining_efficiency(&self) -> f64 {
        let spent = self.energy_spent();
        if spent <= 0.0 {
            return 0.0;
        }
        self.total_resources_collected as f64 / spent.max(1.0)
    }

    pub fn total_value(&self) -> u64 {
        self.station.total_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::types::{MinerState, ScoutState};

    fn empty_config() -> ColonyConfig {
        ColonyConfig {
            width: 20,
            height: 20,
            num_scouts: 0,
            num_miners: 0,
            num_asteroids: 0,
            radiation_probability: 0.0,
            seed: Some(1),
            ..ColonyConfig::default()
        }
    }

    #[test]
    fn test_zero_area_fails_fast() {
        let config = ColonyConfig {
            width: 0,
            ..empty_config()
        };
        assert!(matches!(World::new(config), Err(ConfigError::EmptyGrid { .. })));
    }

    #[test]
    fn test_default_world_population() {
        let world = World::new(ColonyConfig::default().with_seed(3)).unwrap();
        assert_eq!(world.scouts.len(), 5);
        assert_eq!(world.miners.len(), 10);
        assert_eq!(world.deposits.len(), 80);
        assert_eq!(world.base, Position::new(25, 25));
        assert!(world.grid.contents(world.base).contains(&AgentId::Station));
        assert_eq!(world.scouts[1].pattern(), ExplorationPattern::Sector);
    }

    #[test]
    fn test_schedule_lists_each_entity_once() {
        let mut world = World::new(empty_config()).unwrap();
        world.add_deposit(Position::new(2, 2), ResourceType::Gold, 10);
        world.add_scout(world.base, ExplorationPattern::Spiral);
        world.add_miner(world.base);
        world.place_beacon(0, 0);
        world.add_radiation(Position::new(1, 1), 4);
        let agents = world.agents();
        assert_eq!(agents.len(), 6);
        let mut sorted = agents.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), agents.len());
    }

    #[test]
    fn test_retire_counts_once() {
        let mut world = World::new(empty_config()).unwrap();
        world.add_deposit(Position::new(2, 2), ResourceType::Gold, 10);
        let id = world.place_beacon(0, 0).unwrap();
        assert!(world.retire_exhausted_beacon(id));
        assert!(!world.retire_exhausted_beacon(id));
        assert!(!world.retire_beacon(id, BeaconFate::Expired));
        assert_eq!(world.total_asteroids_depleted, 1);
        assert!(world.deposits[0].is_depleted);
        assert!(world.grid.contents(Position::new(2, 2)) == [AgentId::Deposit(0)]);
    }

    #[test]
    fn test_vanished_claim_reverts_miner() {
        let mut world = World::new(empty_config()).unwrap();
        world.add_miner(Position::new(3, 3));
        world.miners[0].state = MinerState::MovingToClaim;
        world.miners[0].target_claim = Some(99);
        world.activate(AgentId::Miner(0));
        assert_eq!(world.miners[0].state, MinerState::Idle);
        assert_eq!(world.miners[0].target_claim, None);
    }

    #[test]
    fn test_scout_returns_and_docks() {
        let mut world = World::new(empty_config()).unwrap();
        let base = world.base;
        world.add_scout(base.offset(1, 0), ExplorationPattern::Spiral);
        world.scouts[0].energy = 15.5;
        world.activate(AgentId::Scout(0));
        assert_eq!(world.scouts[0].state, ScoutState::Returning);
        assert_eq!(world.stats.emergency_returns, 1);
        assert_eq!(world.scouts[0].position, base);

        world.activate(AgentId::Scout(0));
        assert_eq!(world.scouts[0].state, ScoutState::Recharging);
        assert!((world.scouts[0].energy - 43.5).abs() < 1e-9);
    }

    #[test]
    fn test_radiation_hits_only_drones_inside() {
        let mut world = World::new(empty_config()).unwrap();
        world.add_miner(Position::new(2, 2));
        world.add_miner(Position::new(15, 15));
        let id = world.add_radiation(Position::new(2, 2), 4);
        if let Some(r) = world.hazards.get_mut(&id) {
            r.warning_countdown = 0;
            r.active = true;
        }
        world.activate(AgentId::Hazard(id));
        assert_eq!(world.miners[0].energy, 145.0);
        assert_eq!(world.miners[1].energy, 150.0);
    }

    #[test]
    fn test_step_advances_clock_and_cost() {
        let mut world = World::new(ColonyConfig::default().with_seed(8)).unwrap();
        world.step();
        world.step();
        assert_eq!(world.tick, 2);
        assert!(world.operational_cost > 0.0);
    }

    #[test]
    fn test_deposit_spawning() {
        let config = ColonyConfig {
            deposit_spawn_probability: 1.0,
            ..empty_config()
        };
        let mut world = World::new(config).unwrap();
        world.run(3);
        assert_eq!(world.deposits.len(), 3);
        for (i, d) in world.deposits.iter().enumerate() {
            assert!(world.grid.contents(d.position).contains(&AgentId::Deposit(i)));
        }
    }

    #[test]
    fn test_same_seed_same_run() {
        let mut a = World::new(ColonyConfig::default().with_seed(21)).unwrap();
        let mut b = World::new(ColonyConfig::default().with_seed(21)).unwrap();
        a.run(60);
        b.run(60);
        assert_eq!(a.total_resources_collected, b.total_resources_collected);
        assert_eq!(a.operational_cost, b.operational_cost);
        let pa: Vec<Position> = a.miners.iter().map(|m| m.position).collect();
        let pb: Vec<Position> = b.miners.iter().map(|m| m.position).collect();
        assert_eq!(pa, pb);
    }
}
