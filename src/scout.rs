//! Scout drones: explore the grid along a search pattern, analyze deposits
//! that come into sensor range and plant claims over the promising ones.

use crate::movement;
use crate::types::{AgentId, ExplorationPattern, Position, ScoutState};
use crate::world::World;
use rand::Rng;
use std::collections::HashSet;
use std::f64::consts::{PI, TAU};

pub const SCOUT_MAX_ENERGY: f64 = 100.0;
pub const SCOUT_MALFUNCTION_CHANCE: f64 = 0.001;
const SECTOR_START_RADIUS: i32 = 3;
const SECTOR_ANGLE_STEP: f64 = PI / 8.0;

/// Where a scout is in its search pattern.
#[derive(Clone, Debug, PartialEq)]
pub enum PatternCursor {
    /// Expanding square spiral; `direction` 0..4 is right, up, left, down.
    Spiral {
        direction: u8,
        run_length: u32,
        steps_taken: u32,
        turns_taken: u32,
    },
    /// Rings of waypoints around base.
    Sector {
        radius: i32,
        max_radius: i32,
        angle: f64,
    },
    /// Random waypoints inside one quarter of the grid.
    Quadrant {
        quadrant: u8,
        target: Option<Position>,
    },
}

impl Default for PatternCursor {
    fn default() -> Self {
        PatternCursor::Spiral {
            direction: 0,
            run_length: 1,
            steps_taken: 0,
            turns_taken: 0,
        }
    }
}

impl PatternCursor {
    pub fn new<R: Rng + ?Sized>(pattern: ExplorationPattern, width: u32, height: u32, rng: &mut R) -> Self {
        match pattern {
            ExplorationPattern::Spiral => PatternCursor::default(),
            ExplorationPattern::Sector => PatternCursor::Sector {
                radius: SECTOR_START_RADIUS,
                max_radius: (width.min(height) / 2) as i32,
                angle: rng.gen_range(0.0..TAU),
            },
            ExplorationPattern::Quadrant => PatternCursor::Quadrant {
                quadrant: rng.gen_range(0..4),
                target: None,
            },
        }
    }

    pub fn pattern(&self) -> ExplorationPattern {
        match self {
            PatternCursor::Spiral { .. } => ExplorationPattern::Spiral,
            PatternCursor::Sector { .. } => ExplorationPattern::Sector,
            PatternCursor::Quadrant { .. } => ExplorationPattern::Quadrant,
        }
    }

    /// Re-randomizes the cursor, keeping the pattern itself.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        match self {
            PatternCursor::Spiral {
                direction,
                run_length,
                steps_taken,
                turns_taken,
            } => {
                *direction = rng.gen_range(0..4);
                *run_length = 1;
                *steps_taken = 0;
                *turns_taken = 0;
            }
            PatternCursor::Sector { radius, angle, .. } => {
                *angle = rng.gen_range(0.0..TAU);
                *radius = SECTOR_START_RADIUS;
            }
            PatternCursor::Quadrant { quadrant, target } => {
                *quadrant = rng.gen_range(0..4);
                *target = None;
            }
        }
    }
}

fn spiral_offset(direction: u8) -> (i32, i32) {
    match direction % 4 {
        0 => (1, 0),
        1 => (0, 1),
        2 => (-1, 0),
        _ => (0, -1),
    }
}

/// Half-open x and y ranges of a grid quadrant: 0 top-right, 1 top-left,
/// 2 bottom-left, 3 bottom-right. Degenerate halves fall back to the full
/// axis so tiny grids still yield a cell.
pub fn quadrant_bounds(quadrant: u8, width: u32, height: u32) -> ((u32, u32), (u32, u32)) {
    let (hw, hh) = (width / 2, height / 2);
    let (xs, ys) = match quadrant % 4 {
        0 => ((hw, width), (hh, height)),
        1 => ((0, hw), (hh, height)),
        2 => ((0, hw), (0, hh)),
        _ => ((hw, width), (0, hh)),
    };
    let fix = |(lo, hi): (u32, u32), full: u32| if hi > lo { (lo, hi) } else { (0, full) };
    (fix(xs, width), fix(ys, height))
}

#[derive(Clone, Debug, Default)]
pub struct ScoutDrone {
    pub position: Position,
    pub base: Position,
    pub energy: f64,
    pub max_energy: f64,
    pub critical_energy: f64,
    pub state: ScoutState,
    pub cursor: PatternCursor,
    pub analyzed_deposits: HashSet<usize>,
    pub visited_positions: HashSet<Position>,
    pub sensor_range: u32,
    pub target_deposit: Option<usize>,
    pub repair_countdown: u32,
}

impl ScoutDrone {
    pub fn new(position: Position, base: Position, sensor_range: u32, cursor: PatternCursor) -> Self {
        Self {
            position,
            base,
            energy: SCOUT_MAX_ENERGY,
            max_energy: SCOUT_MAX_ENERGY,
            critical_energy: SCOUT_MAX_ENERGY * 0.15,
            state: ScoutState::Exploring,
            cursor,
            analyzed_deposits: HashSet::new(),
            visited_positions: HashSet::new(),
            sensor_range,
            target_deposit: None,
            repair_countdown: 0,
        }
    }

    pub fn pattern(&self) -> ExplorationPattern {
        self.cursor.pattern()
    }

    /// Drains radiation damage. Returns true when the hit pushed the scout
    /// to its critical threshold and sent it home.
    pub fn take_radiation(&mut self, damage: f64) -> bool {
        self.energy = (self.energy - damage).max(0.0);
        if self.energy <= self.critical_energy {
            self.state = ScoutState::Returning;
            return true;
        }
        false
    }

    pub fn step(&mut self, id: usize, world: &mut World) {
        if self.state != ScoutState::Malfunctioning && world.rng.gen_bool(SCOUT_MALFUNCTION_CHANCE) {
            self.state = ScoutState::Malfunctioning;
            self.repair_countdown = world.rng.gen_range(3..=8);
            world.record(format!("Scout {id} malfunctioned!"));
            return;
        }

        if self.state == ScoutState::Malfunctioning {
            if self.position == self.base {
                self.repair_countdown = self.repair_countdown.saturating_sub(1);
                if self.repair_countdown == 0 {
                    self.state = ScoutState::Recharging;
                    world.record(format!("Scout {id} repaired"));
                }
            } else {
                self.move_towards(id, world, self.base);
            }
            return;
        }

        self.energy = (self.energy - 1.0).max(0.0);

        if self.energy <= self.critical_energy
            && !matches!(self.state, ScoutState::Returning | ScoutState::Recharging)
        {
            self.state = ScoutState::Returning;
            world.stats.emergency_returns += 1;
        }

        match self.state {
            ScoutState::Exploring => {
                self.visited_positions.insert(self.position);
                if !self.scan_for_deposits(world) {
                    self.move_exploration_pattern(id, world);
                }
            }
            ScoutState::Analyzing => self.analyze_deposit(id, world),
            ScoutState::Returning => {
                if self.position == self.base {
                    self.state = ScoutState::Recharging;
                    self.energy = (self.energy + self.max_energy * 0.3).min(self.max_energy);
                } else {
                    self.move_towards(id, world, self.base);
                }
            }
            ScoutState::Recharging => {
                self.energy = (self.energy + self.max_energy * 0.2).min(self.max_energy);
                if self.energy >= self.max_energy {
                    self.state = ScoutState::Exploring;
                    if world.rng.gen_bool(0.3) {
                        self.cursor.reset(&mut world.rng);
                    }
                }
            }
            ScoutState::Malfunctioning => {}
        }
    }

    /// Looks for undepleted deposits this scout has not analyzed yet and
    /// locks onto the nearest one.
    pub fn scan_for_deposits(&mut self, world: &World) -> bool {
        let nearest = world
            .grid
            .neighbors(self.position, self.sensor_range, false)
            .into_iter()
            .filter_map(|(cell, id)| match id {
                AgentId::Deposit(d) => Some((cell, d)),
                _ => None,
            })
            .filter(|(_, d)| {
                !self.analyzed_deposits.contains(d)
                    && world.deposits.get(*d).is_some_and(|dep| !dep.is_depleted)
            })
            .min_by_key(|(cell, _)| cell.squared_distance(self.position));

        match nearest {
            Some((_, d)) => {
                self.target_deposit = Some(d);
                self.state = ScoutState::Analyzing;
                true
            }
            None => false,
        }
    }

    fn analyze_deposit(&mut self, id: usize, world: &mut World) {
        self.state = ScoutState::Exploring;
        let Some(d) = self.target_deposit.take() else {
            return;
        };
        self.analyzed_deposits.insert(d);

        let Some(deposit) = world.deposits.get(d) else {
            return;
        };
        if deposit.is_depleted || deposit.remaining_value < deposit.resource_type.claim_threshold() {
            return;
        }

        let already_claimed = world
            .grid
            .contents(deposit.position)
            .iter()
            .any(|agent| matches!(agent, AgentId::Beacon(_)));
        if !already_claimed {
            world.place_beacon(d, id);
        }
    }

    fn move_towards(&mut self, id: usize, world: &mut World, target: Position) {
        if let Some(next) = movement::scout_step(
            &world.grid,
            &world.hazards,
            self.position,
            target,
            &self.visited_positions,
        ) {
            self.relocate(id, world, next);
        }
    }

    fn relocate(&mut self, id: usize, world: &mut World, to: Position) {
        if world.grid.move_agent(AgentId::Scout(id), self.position, to) {
            self.position = to;
        }
    }

    fn move_exploration_pattern(&mut self, id: usize, world: &mut World) {
        match self.cursor.pattern() {
            ExplorationPattern::Spiral => self.move_spiral(id, world),
            ExplorationPattern::Sector => self.move_sector(id, world),
            ExplorationPattern::Quadrant => self.move_quadrant(id, world),
        }
    }

    fn move_spiral(&mut self, id: usize, world: &mut World) {
        let PatternCursor::Spiral {
            direction,
            run_length,
            steps_taken,
            turns_taken,
        } = &mut self.cursor
        else {
            return;
        };

        // rotate away from the boundary until a step fits
        let mut next = None;
        for _ in 0..4 {
            let (dx, dy) = spiral_offset(*direction);
            let cell = self.position.offset(dx, dy);
            if world.grid.in_bounds(cell) {
                next = Some(cell);
                break;
            }
            *direction = (*direction + 1) % 4;
        }
        let Some(next) = next else {
            return;
        };

        *steps_taken += 1;
        if *steps_taken >= *run_length {
            *direction = (*direction + 1) % 4;
            *steps_taken = 0;
            *turns_taken += 1;
            if *turns_taken == 2 {
                *run_length += 1;
                *turns_taken = 0;
            }
        }

        self.relocate(id, world, next);
    }

    fn move_sector(&mut self, id: usize, world: &mut World) {
        let PatternCursor::Sector { radius, angle, .. } = self.cursor else {
            return;
        };
        let target = self.base.offset(
            (f64::from(radius) * angle.cos()) as i32,
            (f64::from(radius) * angle.sin()) as i32,
        );

        if world.grid.in_bounds(target) {
            self.move_towards(id, world, target);
            if self.position == target {
                self.advance_sector();
            }
        } else {
            self.advance_sector();
        }
    }

    fn advance_sector(&mut self) {
        if let PatternCursor::Sector {
            radius,
            max_radius,
            angle,
        } = &mut self.cursor
        {
            *angle += SECTOR_ANGLE_STEP;
            if *angle >= TAU {
                *angle = 0.0;
                *radius += 2;
                if *radius > *max_radius {
                    *radius = SECTOR_START_RADIUS;
                }
            }
        }
    }

    fn move_quadrant(&mut self, id: usize, world: &mut World) {
        let PatternCursor::Quadrant { quadrant, target } = &mut self.cursor else {
            return;
        };
        let goal = match *target {
            Some(goal) if goal != self.position => goal,
            _ => {
                let ((x0, x1), (y0, y1)) =
                    quadrant_bounds(*quadrant, world.grid.width, world.grid.height);
                let goal = Position::new(
                    world.rng.gen_range(x0..x1) as i32,
                    world.rng.gen_range(y0..y1) as i32,
                );
                *target = Some(goal);
                goal
            }
        };
        self.move_towards(id, world, goal);
    }
}
