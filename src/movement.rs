//! Hazard-aware greedy stepping shared by scouts and miners.
//!
//! Instead of full path search each drone looks at three candidate cells in
//! the direction of its target: the direct step plus two lateral
//! alternatives. Off-grid candidates are dropped, cells under any known
//! radiation are avoided when possible, and the survivor closest (Manhattan)
//! to the target wins. Ties go to the earlier candidate.

use crate::grid::Grid;
use crate::hazard::SolarRadiation;
use crate::types::Position;
use rand::Rng;
use std::collections::{BTreeMap, HashSet};

/// Chance that a miner facing a crowded, unsafe lane holds still instead.
pub const MINER_YIELD_CHANCE: f64 = 0.7;

/// Outcome of a miner's movement decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MinerStep {
    Move(Position),
    /// Hold position and count down this many ticks.
    Wait(u32),
    /// No in-bounds candidate; nothing happens.
    Stay,
}

/// Unit step (-1, 0 or 1) on each axis from `from` toward `to`.
pub fn direction(from: Position, to: Position) -> (i32, i32) {
    ((to.x - from.x).signum(), (to.y - from.y).signum())
}

/// The direct step toward `to` followed by two lateral alternatives.
/// Empty when already on the target.
pub fn candidate_steps(from: Position, to: Position) -> Vec<Position> {
    match direction(from, to) {
        (0, 0) => Vec::new(),
        (dx, 0) => vec![
            from.offset(dx, 0),
            from.offset(dx, 1),
            from.offset(dx, -1),
        ],
        (0, dy) => vec![
            from.offset(0, dy),
            from.offset(1, dy),
            from.offset(-1, dy),
        ],
        (dx, dy) => vec![
            from.offset(dx, dy),
            from.offset(dx, 0),
            from.offset(0, dy),
        ],
    }
}

pub fn in_hazard(hazards: &BTreeMap<u64, SolarRadiation>, pos: Position) -> bool {
    hazards.values().any(|h| h.covers(pos))
}

fn nearest(cells: &[Position], target: Position) -> Option<Position> {
    cells.iter().copied().min_by_key(|c| c.manhattan(target))
}

fn in_bounds_candidates(grid: &Grid, from: Position, target: Position) -> Vec<Position> {
    candidate_steps(from, target)
        .into_iter()
        .filter(|c| grid.in_bounds(*c))
        .collect()
}

/// Next cell for a scout heading to `target`. Safe cells not yet visited are
/// preferred, then any safe cell, then any in-bounds cell.
pub fn scout_step(
    grid: &Grid,
    hazards: &BTreeMap<u64, SolarRadiation>,
    from: Position,
    target: Position,
    visited: &HashSet<Position>,
) -> Option<Position> {
    let valid = in_bounds_candidates(grid, from, target);
    if valid.is_empty() {
        return None;
    }

    let safe: Vec<Position> = valid
        .iter()
        .copied()
        .filter(|c| !in_hazard(hazards, *c))
        .collect();
    if safe.is_empty() {
        return nearest(&valid, target);
    }

    let unvisited: Vec<Position> = safe
        .iter()
        .copied()
        .filter(|c| !visited.contains(c))
        .collect();
    if unvisited.is_empty() {
        nearest(&safe, target)
    } else {
        nearest(&unvisited, target)
    }
}

/// Next move for a miner heading to `target`. Cells holding another drone
/// count as unsafe so miners do not pile into each other.
pub fn miner_step<R: Rng + ?Sized>(
    grid: &Grid,
    hazards: &BTreeMap<u64, SolarRadiation>,
    from: Position,
    target: Position,
    rng: &mut R,
) -> MinerStep {
    let valid = in_bounds_candidates(grid, from, target);
    if valid.is_empty() {
        return MinerStep::Stay;
    }

    let safe: Vec<Position> = valid
        .iter()
        .copied()
        .filter(|c| !in_hazard(hazards, *c) && !grid.has_drone(*c))
        .collect();
    if let Some(next) = nearest(&safe, target) {
        return MinerStep::Move(next);
    }

    if valid.contains(&target) {
        return MinerStep::Move(target);
    }
    if rng.gen_bool(MINER_YIELD_CHANCE) {
        return MinerStep::Wait(rng.gen_range(1..=2));
    }
    nearest(&valid, target).map_or(MinerStep::Stay, MinerStep::Move)
}

/// A uniformly random neighboring cell free of scouts and miners.
pub fn random_free_neighbor<R: Rng + ?Sized>(
    grid: &Grid,
    from: Position,
    rng: &mut R,
) -> Option<Position> {
    let free: Vec<Position> = grid
        .moore(from)
        .into_iter()
        .filter(|c| !grid.has_drone(*c))
        .collect();
    if free.is_empty() {
        None
    } else {
        Some(free[rng.gen_range(0..free.len())])
    }
}
