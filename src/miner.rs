//! Mining drones: pick the best claim on offer, extract from it and haul the
//! load back to the processing station.

use crate::movement::{self, MinerStep};
use crate::types::{AgentId, MinerState, Position, ResourceType};
use crate::world::World;
use rand::Rng;
use std::collections::VecDeque;

pub const MINER_MAX_ENERGY: f64 = 150.0;
pub const MINER_MAX_CAPACITY: u32 = 50;
pub const MINER_MALFUNCTION_CHANCE: f64 = 0.002;
/// Claims already targeted by this many other miners are off the table.
pub const CONGESTION_CAP: usize = 2;
const POSITION_HISTORY: usize = 5;

/// A claim as seen by a miner shopping for work.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClaimCandidate {
    pub id: u64,
    pub position: Position,
    pub value: u32,
    pub resource_type: ResourceType,
    /// Other miners currently heading to or working this claim.
    pub miners_targeting: usize,
}

/// `0.5·value + 10·priority − 2·distance − 10·miners_targeting`
pub fn claim_score(candidate: &ClaimCandidate, distance: u32) -> f64 {
    f64::from(candidate.value) * 0.5 + f64::from(candidate.resource_type.priority()) * 10.0
        - f64::from(distance) * 2.0
        - candidate.miners_targeting as f64 * 10.0
}

/// Picks the best-scoring claim reachable with the given energy. Claims at
/// the congestion cap and claims farther (Manhattan) than `energy × 0.4`
/// are skipped; the first of equally scored claims wins.
pub fn find_optimal_beacon(
    position: Position,
    energy: f64,
    candidates: &[ClaimCandidate],
) -> Option<u64> {
    let mut best: Option<(u64, f64)> = None;
    for candidate in candidates {
        if candidate.miners_targeting >= CONGESTION_CAP {
            continue;
        }
        let distance = position.manhattan(candidate.position);
        if f64::from(distance) > energy * 0.4 {
            continue;
        }
        let score = claim_score(candidate, distance);
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((candidate.id, score));
        }
    }
    best.map(|(id, _)| id)
}

#[derive(Clone, Debug, Default)]
pub struct MiningDrone {
    pub position: Position,
    pub base: Position,
    pub energy: f64,
    pub max_energy: f64,
    pub critical_energy: f64,
    pub capacity: u32,
    pub max_capacity: u32,
    pub state: MinerState,
    pub target_claim: Option<u64>,
    pub carried_resource: Option<ResourceType>,
    pub recent_positions: VecDeque<Position>,
    pub wait_countdown: u32,
    pub repair_countdown: u32,
    pub steps_taken: u64,
}

impl MiningDrone {
    pub fn new(position: Position, base: Position) -> Self {
        Self::with_limits(position, base, MINER_MAX_ENERGY, MINER_MAX_CAPACITY)
    }

    pub fn with_limits(position: Position, base: Position, max_energy: f64, max_capacity: u32) -> Self {
        Self {
            position,
            base,
            energy: max_energy,
            max_energy,
            critical_energy: max_energy * 0.2,
            capacity: 0,
            max_capacity,
            state: MinerState::Idle,
            target_claim: None,
            carried_resource: None,
            recent_positions: VecDeque::with_capacity(POSITION_HISTORY),
            wait_countdown: 0,
            repair_countdown: 0,
            steps_taken: 0,
        }
    }

    /// Same cell for the whole recorded history.
    pub fn is_stuck(&self) -> bool {
        self.recent_positions.len() == POSITION_HISTORY
            && self.recent_positions.iter().all(|p| *p == self.recent_positions[0])
    }

    pub fn take_radiation(&mut self, damage: f64) -> bool {
        self.energy = (self.energy - damage).max(0.0);
        if self.energy <= self.critical_energy {
            self.state = MinerState::Returning;
            return true;
        }
        false
    }

    fn remember_position(&mut self) {
        self.recent_positions.push_back(self.position);
        while self.recent_positions.len() > POSITION_HISTORY {
            self.recent_positions.pop_front();
        }
    }

    pub fn step(&mut self, id: usize, world: &mut World) {
        self.steps_taken += 1;

        if self.state != MinerState::Malfunctioning && world.rng.gen_bool(MINER_MALFUNCTION_CHANCE) {
            self.state = MinerState::Malfunctioning;
            self.repair_countdown = world.rng.gen_range(4..=10);
            world.record(format!("Miner {id} malfunctioned!"));
            return;
        }

        if self.state == MinerState::Malfunctioning {
            if self.position == self.base {
                self.repair_countdown = self.repair_countdown.saturating_sub(1);
                if self.repair_countdown == 0 {
                    self.state = MinerState::Recharging;
                    world.record(format!("Miner {id} repaired"));
                }
            } else {
                self.move_towards(id, world, self.base);
            }
            return;
        }

        self.remember_position();

        if self.is_stuck() {
            if self.wait_countdown > 0 {
                self.wait_countdown -= 1;
            } else {
                self.random_move(id, world);
                world.record(format!("Miner {id} was stuck, making random move"));
            }
            return;
        }

        self.energy = (self.energy - 1.0).max(0.0);

        if self.energy <= self.critical_energy
            && !matches!(self.state, MinerState::Returning | MinerState::Recharging)
        {
            self.state = MinerState::Returning;
            world.stats.emergency_returns += 1;
            world.record(format!("Miner {id} low energy, returning to base"));
        }

        match self.state {
            MinerState::Idle => {
                let candidates = world.claim_candidates();
                match find_optimal_beacon(self.position, self.energy, &candidates) {
                    Some(claim) => {
                        self.target_claim = Some(claim);
                        self.state = MinerState::MovingToClaim;
                        if let Some(beacon) = world.beacons.get(&claim) {
                            let resource = beacon.resource_type;
                            world.record(format!("Miner {id} targeting {resource} beacon"));
                        }
                    }
                    None => self.random_move(id, world),
                }
            }
            MinerState::MovingToClaim => {
                let Some(goal) = self.target_claim.and_then(|c| world.beacons.get(&c)) else {
                    self.abandon_claim();
                    return;
                };
                let (goal_position, resource) = (goal.position, goal.resource_type);
                if self.position == goal_position {
                    self.state = MinerState::Mining;
                    world.record(format!("Miner {id} started mining {resource}"));
                } else {
                    self.move_towards(id, world, goal_position);
                }
            }
            MinerState::Mining => {
                let Some(claim) = self.target_claim.filter(|c| world.beacons.contains_key(c)) else {
                    self.abandon_claim();
                    return;
                };
                let exhausted = self.mine(id, claim, world);
                if exhausted || f64::from(self.capacity) >= f64::from(self.max_capacity) * 0.8 {
                    self.state = MinerState::Returning;
                    if exhausted {
                        world.retire_exhausted_beacon(claim);
                    }
                    self.target_claim = None;
                }
            }
            MinerState::Returning => {
                if self.position == self.base {
                    self.state = MinerState::Recharging;
                    self.deliver(id, world);
                } else {
                    self.move_towards(id, world, self.base);
                }
            }
            MinerState::Recharging => {
                // a load kept through a repair is handed over on the next dock tick
                if self.position == self.base {
                    self.deliver(id, world);
                }
                let boost = if self.energy < self.max_energy * 0.3 { 0.3 } else { 0.1 };
                self.energy = (self.energy + self.max_energy * boost).min(self.max_energy);
                if self.energy >= self.max_energy {
                    self.state = MinerState::Idle;
                    world.record(format!("Miner {id} fully recharged and ready"));
                }
            }
            MinerState::Malfunctioning => {}
        }
    }

    fn abandon_claim(&mut self) {
        self.state = MinerState::Idle;
        self.target_claim = None;
    }

    /// Extracts one tick's worth from `claim`. Returns true once the claim
    /// has nothing left.
    fn mine(&mut self, id: usize, claim: u64, world: &mut World) -> bool {
        let Some(beacon) = world.beacons.get_mut(&claim) else {
            return false;
        };
        let resource = beacon.resource_type;
        let jitter: f64 = world.rng.gen_range(0.8..=1.2);
        let speed = ((f64::from(resource.mining_efficiency()) * jitter) as u32).max(1);
        let headroom = self.max_capacity.saturating_sub(self.capacity);
        let amount = beacon.extract(speed.min(headroom));
        let remaining = beacon.value;
        let deposit_index = beacon.deposit;

        let newly_depleted = world
            .deposits
            .get_mut(deposit_index)
            .is_some_and(|deposit| deposit.mirror_value(remaining));
        if newly_depleted {
            world.on_deposit_depleted(deposit_index);
        }

        self.capacity += amount;
        if amount > 0 {
            self.carried_resource = Some(resource);
        }
        world.stats.resources_mined += u64::from(amount);

        if remaining == 0 {
            world.record(format!(
                "Miner {id} depleted asteroid, returning with {} {resource}",
                self.capacity
            ));
        } else if self.steps_taken % 5 == 0 {
            world.record(format!("Miner {id} mined {amount} {resource}, remaining: {remaining}"));
        }

        remaining == 0
    }

    fn deliver(&mut self, id: usize, world: &mut World) {
        if self.capacity == 0 {
            return;
        }
        let Some(resource) = self.carried_resource else {
            return;
        };
        let amount = self.capacity;
        world.station.receive(amount, resource);
        world.total_resources_collected += u64::from(amount);
        world.stats.resources_delivered += u64::from(amount);
        world.record(format!("Miner {id} delivered {amount} {resource}"));
        self.capacity = 0;
        self.carried_resource = None;
    }

    fn random_move(&mut self, id: usize, world: &mut World) {
        match movement::random_free_neighbor(&world.grid, self.position, &mut world.rng) {
            Some(next) => self.relocate(id, world, next),
            None => self.wait_countdown = world.rng.gen_range(1..=3),
        }
    }

    fn move_towards(&mut self, id: usize, world: &mut World, target: Position) {
        match movement::miner_step(&world.grid, &world.hazards, self.position, target, &mut world.rng) {
            MinerStep::Move(next) => self.relocate(id, world, next),
            MinerStep::Wait(ticks) => self.wait_countdown = ticks,
            MinerStep::Stay => {}
        }
    }

    fn relocate(&mut self, id: usize, world: &mut World, to: Position) {
        if world.grid.move_agent(AgentId::Miner(id), self.position, to) {
            self.position = to;
        }
    }
}
