//! # Colony Snapshot Module
//!
//! Serializable picture of a [`World`] taken between ticks. Renderers,
//! metrics collectors and the headless binary consume it instead of reaching
//! into the live world, so everything here is plain data.
//!
//! ## Layout
//!
//! - [`WorldSnapshot`] carries the clock, run totals and metrics
//! - [`EntitySnapshot`] is one record per live entity, tagged by kind
//! - [`StationSnapshot`] summarizes the processing pipeline
//!
//! Snapshots are exported as JSON:
//!
//! ```rust,no_run
//! use asteroid_colony::{ColonyConfig, World};
//!
//! let mut world = World::new(ColonyConfig::default().with_seed(1))?;
//! world.run(10);
//! let json = serde_json::to_string(&world.snapshot())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::events::Event;
use crate::station::ProcessingStation;
use crate::types::{MinerState, Position, ResourceType, ScoutState};
use crate::world::{TickStats, World};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One live entity as seen from outside the simulation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntitySnapshot {
    Station {
        position: Position,
    },
    Deposit {
        id: usize,
        position: Position,
        resource_type: ResourceType,
        remaining_value: u32,
        original_value: u32,
        is_depleted: bool,
    },
    Beacon {
        id: u64,
        position: Position,
        resource_type: ResourceType,
        value: u32,
        lifetime: u32,
    },
    Scout {
        id: usize,
        position: Position,
        state: ScoutState,
        energy: f64,
        max_energy: f64,
    },
    Miner {
        id: usize,
        position: Position,
        state: MinerState,
        energy: f64,
        max_energy: f64,
        /// Units currently carried
        capacity: u32,
        max_capacity: u32,
        carried_resource: Option<ResourceType>,
    },
    Hazard {
        id: u64,
        center: Position,
        radius: u32,
        /// False while the event is still in its warning phase
        active: bool,
        warning_countdown: u32,
        duration_remaining: u32,
    },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StationSnapshot {
    pub position: Position,
    pub status: String,
    pub received: BTreeMap<ResourceType, u64>,
    pub processed: BTreeMap<ResourceType, u64>,
    pub queued_batches: usize,
    pub total_processed: u64,
    pub total_value: u64,
}

/// Aggregates derived from the world at snapshot time.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ColonyMetrics {
    pub total_value: u64,
    pub mining_efficiency: f64,
    /// Percent of processed output per resource
    pub resource_distribution: BTreeMap<ResourceType, f64>,
    pub depleted_deposits: usize,
    pub undiscovered_deposits: usize,
    pub average_scout_energy: f64,
    pub average_miner_energy: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub width: u32,
    pub height: u32,
    pub total_resources_collected: u64,
    pub total_asteroids_depleted: u64,
    pub operational_cost: f64,
    pub active_beacons: usize,
    pub active_hazards: usize,
    pub stats: TickStats,
    pub metrics: ColonyMetrics,
    pub station: StationSnapshot,
    pub entities: Vec<EntitySnapshot>,
    /// Recent event log, oldest first
    pub events: Vec<Event>,
}

pub fn create_station_snapshot(station: &ProcessingStation, position: Position) -> StationSnapshot {
    StationSnapshot {
        position,
        status: station.get_status(),
        received: station.received.clone(),
        processed: station.processed.clone(),
        queued_batches: station.queue.len(),
        total_processed: station.total_processed,
        total_value: station.total_value(),
    }
}

fn average(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}

pub fn create_metrics(world: &World) -> ColonyMetrics {
    ColonyMetrics {
        total_value: world.total_value(),
        mining_efficiency: world.mining_efficiency(),
        resource_distribution: world.station.resource_distribution(),
        depleted_deposits: world.count_depleted(),
        undiscovered_deposits: world.count_undiscovered(),
        average_scout_energy: average(world.scouts.iter().map(|s| s.energy)),
        average_miner_energy: average(world.miners.iter().map(|m| m.energy)),
    }
}

pub fn create_entity_snapshots(world: &World) -> Vec<EntitySnapshot> {
    let mut entities = vec![EntitySnapshot::Station {
        position: world.base,
    }];

    entities.extend(world.deposits.iter().enumerate().map(|(id, d)| {
        EntitySnapshot::Deposit {
            id,
            position: d.position,
            resource_type: d.resource_type,
            remaining_value: d.remaining_value,
            original_value: d.original_value,
            is_depleted: d.is_depleted,
        }
    }));
    entities.extend(world.beacons.iter().map(|(id, b)| EntitySnapshot::Beacon {
        id: *id,
        position: b.position,
        resource_type: b.resource_type,
        value: b.value,
        lifetime: b.lifetime,
    }));
    entities.extend(world.scouts.iter().enumerate().map(|(id, s)| EntitySnapshot::Scout {
        id,
        position: s.position,
        state: s.state,
        energy: s.energy,
        max_energy: s.max_energy,
    }));
    entities.extend(world.miners.iter().enumerate().map(|(id, m)| EntitySnapshot::Miner {
        id,
        position: m.position,
        state: m.state,
        energy: m.energy,
        max_energy: m.max_energy,
        capacity: m.capacity,
        max_capacity: m.max_capacity,
        carried_resource: m.carried_resource,
    }));
    entities.extend(world.hazards.iter().map(|(id, h)| EntitySnapshot::Hazard {
        id: *id,
        center: h.center,
        radius: h.radius,
        active: h.active,
        warning_countdown: h.warning_countdown,
        duration_remaining: h.duration_remaining,
    }));

    entities
}

/// Assembles the full snapshot of `world`.
pub fn create_world_snapshot(world: &World) -> WorldSnapshot {
    WorldSnapshot {
        tick: world.tick,
        width: world.grid.width,
        height: world.grid.height,
        total_resources_collected: world.total_resources_collected,
        total_asteroids_depleted: world.total_asteroids_depleted,
        operational_cost: world.operational_cost,
        active_beacons: world.beacons.len(),
        active_hazards: world.hazards.len(),
        stats: world.stats,
        metrics: create_metrics(world),
        station: create_station_snapshot(&world.station, world.base),
        entities: create_entity_snapshots(world),
        events: world.events.iter().cloned().collect(),
    }
}

impl World {
    pub fn snapshot(&self) -> WorldSnapshot {
        create_world_snapshot(self)
    }
}
