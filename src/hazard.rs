//! Solar radiation: a transient disk that first warns, then drains the
//! energy of every drone standing inside it.

use crate::grid::Grid;
use crate::types::Position;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::RangeInclusive;

pub const RADIATION_DURATION: u32 = 10;
pub const RADIATION_DAMAGE: f64 = 5.0;
pub const RADIATION_WARNING: u32 = 3;
pub const RADIATION_RADIUS: RangeInclusive<u32> = 4..=8;

/// Phase changes produced by one radiation tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RadiationTick {
    /// The warning just ran out; damage starts next tick.
    pub activated: bool,
    /// Drones in the area must take damage this tick.
    pub damaging: bool,
    /// The event is over and must be removed.
    pub expired: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolarRadiation {
    pub center: Position,
    pub radius: u32,
    pub affected_cells: BTreeSet<Position>,
    pub warning_countdown: u32,
    pub active: bool,
    pub duration_remaining: u32,
    pub damage_per_tick: f64,
}

impl SolarRadiation {
    pub fn new(grid: &Grid, center: Position, radius: u32) -> Self {
        Self {
            center,
            radius,
            affected_cells: grid.disk(center, radius).into_iter().collect(),
            warning_countdown: RADIATION_WARNING,
            active: false,
            duration_remaining: RADIATION_DURATION,
            damage_per_tick: RADIATION_DAMAGE,
        }
    }

    pub fn covers(&self, pos: Position) -> bool {
        self.affected_cells.contains(&pos)
    }

    pub fn tick(&mut self) -> RadiationTick {
        let mut outcome = RadiationTick::default();

        if self.warning_countdown > 0 {
            self.warning_countdown -= 1;
            if self.warning_countdown == 0 {
                self.active = true;
                outcome.activated = true;
            }
            return outcome;
        }

        self.duration_remaining = self.duration_remaining.saturating_sub(1);
        outcome.damaging = self.active;
        outcome.expired = self.duration_remaining == 0;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle() {
        let grid = Grid::new(20, 20);
        let mut radiation = SolarRadiation::new(&grid, Position::new(10, 10), 4);

        assert_eq!(radiation.tick(), RadiationTick::default());
        assert_eq!(radiation.tick(), RadiationTick::default());
        let third = radiation.tick();
        assert!(third.activated && !third.damaging);
        assert!(radiation.active);

        for _ in 0..RADIATION_DURATION - 1 {
            let t = radiation.tick();
            assert!(t.damaging && !t.expired);
        }
        let last = radiation.tick();
        assert!(last.damaging && last.expired);
    }

    #[test]
    fn test_area_is_clipped_disk() {
        let grid = Grid::new(10, 10);
        let radiation = SolarRadiation::new(&grid, Position::new(0, 0), 4);
        assert!(radiation.covers(Position::new(0, 0)));
        assert!(radiation.covers(Position::new(0, 4)));
        assert!(!radiation.covers(Position::new(3, 3)));
        assert!(!radiation.covers(Position::new(-1, 0)));
    }
}
