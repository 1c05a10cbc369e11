//! Claim markers placed by scouts over viable deposits.

use crate::types::{Position, ResourceType};
use serde::{Deserialize, Serialize};

/// Ticks a claim stays up before it expires on its own.
pub const BEACON_LIFETIME: u32 = 200;

/// What became of a claim after its per-tick update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BeaconFate {
    Active,
    /// Value reached zero: the claim goes and its deposit is depleted.
    Exhausted,
    /// Lifetime ran out before the deposit was mined.
    Expired,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Beacon {
    pub position: Position,
    pub resource_type: ResourceType,
    pub value: u32,
    pub original_value: u32,
    /// Index of the claimed deposit in the world's deposit list.
    pub deposit: usize,
    pub lifetime: u32,
    pub creation_tick: u64,
}

impl Beacon {
    pub fn new(
        position: Position,
        resource_type: ResourceType,
        value: u32,
        deposit: usize,
        creation_tick: u64,
    ) -> Self {
        Self {
            position,
            resource_type,
            value,
            original_value: value,
            deposit,
            lifetime: BEACON_LIFETIME,
            creation_tick,
        }
    }

    /// Removes up to `amount` from the claim and returns what was taken.
    pub fn extract(&mut self, amount: u32) -> u32 {
        let taken = amount.min(self.value);
        self.value -= taken;
        taken
    }

    /// Ages the claim by one tick and re-syncs it with its deposit.
    pub fn tick(&mut self, deposit_value: Option<u32>) -> BeaconFate {
        self.lifetime = self.lifetime.saturating_sub(1);
        if let Some(remaining) = deposit_value {
            self.value = remaining.min(self.original_value);
        }

        if self.value == 0 {
            BeaconFate::Exhausted
        } else if self.lifetime == 0 {
            BeaconFate::Expired
        } else {
            BeaconFate::Active
        }
    }

    pub fn age(&self, now: u64) -> u64 {
        now.saturating_sub(self.creation_tick)
    }
}
