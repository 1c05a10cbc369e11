//! Bounded, non-wrapping grid where a cell may hold several entities.

use crate::types::{AgentId, Position};
use rand::Rng;

pub struct Grid {
    pub width: u32,
    pub height: u32,
    cells: Vec<Vec<AgentId>>,
}

impl Grid {
    pub fn new(width: u32, height: u32) -> Self {
        let size = width as usize * height as usize;
        Self {
            width,
            height,
            cells: vec![Vec::new(); size],
        }
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    fn index(&self, pos: Position) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| pos.y as usize * self.width as usize + pos.x as usize)
    }

    /// Entities currently in `pos`, in placement order. Out-of-bounds cells
    /// are empty.
    pub fn contents(&self, pos: Position) -> &[AgentId] {
        match self.index(pos) {
            Some(i) => &self.cells[i],
            None => &[],
        }
    }

    /// Returns false (and does nothing) when `pos` is off the grid.
    pub fn place(&mut self, id: AgentId, pos: Position) -> bool {
        match self.index(pos) {
            Some(i) => {
                self.cells[i].push(id);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: AgentId, pos: Position) {
        if let Some(i) = self.index(pos) {
            self.cells[i].retain(|other| *other != id);
        }
    }

    /// Moves `id` from `from` to `to`. A target off the grid leaves the
    /// entity where it was.
    pub fn move_agent(&mut self, id: AgentId, from: Position, to: Position) -> bool {
        if !self.in_bounds(to) {
            return false;
        }
        self.remove(id, from);
        self.place(id, to)
    }

    pub fn has_drone(&self, pos: Position) -> bool {
        self.contents(pos).iter().any(|id| id.is_drone())
    }

    /// In-bounds cells within Chebyshev distance `radius`, column by column.
    pub fn neighborhood(&self, pos: Position, radius: u32, include_center: bool) -> Vec<Position> {
        let r = radius.min(i32::MAX as u32) as i32;
        // window clipped to the grid, so a wide radius costs no more than the grid
        let x0 = pos.x.saturating_sub(r).max(0);
        let x1 = pos.x.saturating_add(r).min(self.width as i32 - 1);
        let y0 = pos.y.saturating_sub(r).max(0);
        let y1 = pos.y.saturating_add(r).min(self.height as i32 - 1);

        let mut cells = Vec::new();
        for x in x0..=x1 {
            for y in y0..=y1 {
                let cell = Position::new(x, y);
                if cell == pos && !include_center {
                    continue;
                }
                cells.push(cell);
            }
        }
        cells
    }

    /// The eight surrounding cells that lie on the grid.
    pub fn moore(&self, pos: Position) -> Vec<Position> {
        self.neighborhood(pos, 1, false)
    }

    /// Entities found in the neighborhood of `pos`, paired with their cell.
    pub fn neighbors(
        &self,
        pos: Position,
        radius: u32,
        include_center: bool,
    ) -> Vec<(Position, AgentId)> {
        self.neighborhood(pos, radius, include_center)
            .into_iter()
            .flat_map(|cell| self.contents(cell).iter().map(move |id| (cell, *id)))
            .collect()
    }

    /// Every in-bounds cell whose squared distance to `center` is at most
    /// `radius²` (a filled disk clipped to the grid).
    pub fn disk(&self, center: Position, radius: u32) -> Vec<Position> {
        let r2 = radius * radius;
        self.neighborhood(center, radius, true)
            .into_iter()
            .filter(|cell| cell.squared_distance(center) <= r2)
            .collect()
    }

    pub fn random_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Position {
        Position::new(
            rng.gen_range(0..self.width) as i32,
            rng.gen_range(0..self.height) as i32,
        )
    }

    /// Clamps an arbitrary coordinate onto the grid.
    pub fn clamp(&self, pos: Position) -> Position {
        Position::new(
            pos.x.clamp(0, self.width as i32 - 1),
            pos.y.clamp(0, self.height as i32 - 1),
        )
    }
}
