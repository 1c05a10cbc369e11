//! # Colony Types Module
//!
//! Core data types shared by every part of the asteroid mining colony
//! simulation: resource kinds and their tuning tables, grid positions, the
//! behavioral states of both drone kinds and the handles used to refer to
//! entities living on the grid.
//!
//! All types are serializable so that snapshots can be exported to external
//! collaborators (renderers, metrics collectors) after each tick.

use serde::{Deserialize, Serialize};
use std::fmt;

/// NOTE - Mineral kinds found in the deposit field
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Iron,     // NOTE - Common, fast to mine and process
    Gold,     // NOTE - Mid value
    Platinum, // NOTE - Rare, high priority
    Water,    // NOTE - Common, cheap to process
    Helium,   // NOTE - Rarest, slow to mine
}

impl ResourceType {
    pub const ALL: [ResourceType; 5] = [
        ResourceType::Iron,
        ResourceType::Gold,
        ResourceType::Platinum,
        ResourceType::Water,
        ResourceType::Helium,
    ];

    /// Relative spawn weight used when generating the deposit field.
    pub const fn spawn_weight(self) -> f64 {
        match self {
            ResourceType::Iron => 0.5,
            ResourceType::Gold => 0.25,
            ResourceType::Platinum => 0.1,
            ResourceType::Water => 0.1,
            ResourceType::Helium => 0.05,
        }
    }

    /// Deposit value before variation and richness are applied.
    pub const fn base_value(self) -> f64 {
        match self {
            ResourceType::Iron => 30.0,
            ResourceType::Gold => 25.0,
            ResourceType::Platinum => 20.0,
            ResourceType::Water => 25.0,
            ResourceType::Helium => 10.0,
        }
    }

    /// Minimum remaining value for a scout to place a claim.
    pub const fn claim_threshold(self) -> u32 {
        match self {
            ResourceType::Iron => 8,
            ResourceType::Gold => 4,
            ResourceType::Platinum => 2,
            ResourceType::Water => 6,
            ResourceType::Helium => 1,
        }
    }

    /// Units a miner extracts per tick before jitter.
    pub const fn mining_efficiency(self) -> u32 {
        match self {
            ResourceType::Iron => 8,
            ResourceType::Gold => 5,
            ResourceType::Platinum => 4,
            ResourceType::Water => 6,
            ResourceType::Helium => 2,
        }
    }

    /// Weight of the resource kind in claim allocation.
    pub const fn priority(self) -> u32 {
        match self {
            ResourceType::Platinum => 5,
            ResourceType::Helium => 4,
            ResourceType::Gold => 3,
            ResourceType::Water => 2,
            ResourceType::Iron => 1,
        }
    }

    /// Ticks the station needs to process one batch.
    pub const fn processing_time(self) -> u32 {
        match self {
            ResourceType::Iron => 1,
            ResourceType::Gold => 2,
            ResourceType::Platinum => 3,
            ResourceType::Water => 1,
            ResourceType::Helium => 3,
        }
    }

    /// Credits earned per processed unit.
    pub const fn credit_value(self) -> u64 {
        match self {
            ResourceType::Iron => 1,
            ResourceType::Gold => 5,
            ResourceType::Platinum => 10,
            ResourceType::Water => 2,
            ResourceType::Helium => 20,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ResourceType::Iron => "iron",
            ResourceType::Gold => "gold",
            ResourceType::Platinum => "platinum",
            ResourceType::Water => "water",
            ResourceType::Helium => "helium",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A cell coordinate. Signed so that candidate steps just outside the grid
/// can be represented and then rejected by bounds checks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub const fn manhattan(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    pub const fn squared_distance(self, other: Position) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        dx * dx + dy * dy
    }

    pub fn chebyshev(self, other: Position) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// NOTE - Behavioral states of a scout drone
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoutState {
    #[default]
    Exploring,      // NOTE - Following its search pattern
    Analyzing,      // NOTE - Inspecting a deposit found in sensor range
    Returning,      // NOTE - Heading back to base
    Recharging,     // NOTE - Docked at base
    Malfunctioning, // NOTE - Limping home for repairs
}

/// NOTE - Behavioral states of a mining drone
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinerState {
    #[default]
    Idle,
    MovingToClaim,
    Mining,
    Returning,
    Recharging,
    Malfunctioning,
}

/// Search pattern followed by an exploring scout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplorationPattern {
    Spiral,
    Sector,
    Quadrant,
}

impl ExplorationPattern {
    /// Patterns are handed out round-robin across the scout population.
    pub const fn for_index(index: usize) -> Self {
        match index % 3 {
            0 => ExplorationPattern::Spiral,
            1 => ExplorationPattern::Sector,
            _ => ExplorationPattern::Quadrant,
        }
    }
}

/// Handle to an entity owned by the world.
///
/// Scouts, miners and deposits are never removed, so their handles are plain
/// indices into the owning vectors. Claims and hazards come and go; their
/// ids are drawn from a monotonically increasing counter and are never
/// reused, so a stale handle simply fails to resolve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum AgentId {
    Station,
    Deposit(usize),
    Beacon(u64),
    Scout(usize),
    Miner(usize),
    Hazard(u64),
}

impl AgentId {
    /// Scouts and miners are the only entities that physically crowd a cell.
    pub const fn is_drone(self) -> bool {
        matches!(self, AgentId::Scout(_) | AgentId::Miner(_))
    }
}
