//! Procedural generation of the deposit field.
//!
//! Deposits come in clusters dominated by one resource, topped up with
//! scattered singletons. A Perlin richness field, seeded from the world RNG,
//! makes neighboring deposits similarly rich.

use crate::deposit::Deposit;
use crate::grid::Grid;
use crate::types::{Position, ResourceType};
use noise::{NoiseFn, Perlin};
use rand::distributions::WeightedIndex;
use rand::prelude::*;

const MAX_CLUSTERS: usize = 10;
const CLUSTER_BASE_CLEARANCE: u32 = 5;
const SINGLETON_BASE_CLEARANCE: u32 = 3;
const PRIMARY_SHARE: f64 = 0.8;
const NOISE_SCALE: f64 = 0.15;
const PLACEMENT_ATTEMPTS: usize = 100;

/// Spatially coherent multiplier in `[0.7, 1.3]` applied to deposit values.
#[derive(Clone)]
pub struct RichnessField {
    perlin: Perlin,
    offset: (f64, f64),
}

impl RichnessField {
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let seed: u32 = rng.r#gen();
        Self {
            perlin: Perlin::new(seed),
            offset: (rng.gen_range(0.0..1000.0), rng.gen_range(0.0..1000.0)),
        }
    }

    pub fn variation(&self, pos: Position) -> f64 {
        let nx = f64::from(pos.x) * NOISE_SCALE + self.offset.0;
        let ny = f64::from(pos.y) * NOISE_SCALE + self.offset.1;
        let value = self.perlin.get([nx, ny]);
        let unit = ((value + 1.0) / 2.0).clamp(0.0, 1.0);
        0.7 + 0.6 * unit
    }

    /// Value of a freshly generated deposit at `pos`, never below 1.
    pub fn deposit_value(&self, pos: Position, resource: ResourceType, richness: f64) -> u32 {
        let value = resource.base_value() * self.variation(pos) * richness;
        (value as u32).max(1)
    }
}

fn random_resource<R: Rng + ?Sized>(rng: &mut R) -> ResourceType {
    let weights = ResourceType::ALL.map(ResourceType::spawn_weight);
    match WeightedIndex::new(weights) {
        Ok(dist) => ResourceType::ALL[dist.sample(rng)],
        Err(_) => ResourceType::Iron,
    }
}

/// A random cell at least `clearance` cells off base on some axis. Gives up
/// after a bounded number of tries on grids too small to honor it.
fn cell_away_from_base<R: Rng + ?Sized>(
    rng: &mut R,
    grid: &Grid,
    base: Position,
    clearance: u32,
) -> Position {
    let mut cell = grid.random_cell(rng);
    for _ in 0..PLACEMENT_ATTEMPTS {
        if cell.x.abs_diff(base.x) > clearance || cell.y.abs_diff(base.y) > clearance {
            break;
        }
        cell = grid.random_cell(rng);
    }
    cell
}

/// Output of field generation: the deposits to place plus the primary
/// resource of each cluster.
pub struct FieldPlan {
    pub deposits: Vec<Deposit>,
    pub clusters: Vec<ResourceType>,
}

pub fn generate<R: Rng + ?Sized>(
    rng: &mut R,
    grid: &Grid,
    field: &RichnessField,
    base: Position,
    count: usize,
    richness: f64,
) -> FieldPlan {
    let mut deposits = Vec::with_capacity(count);
    let mut clusters = Vec::new();

    let num_clusters = MAX_CLUSTERS.min(count / 5);
    let centers: Vec<(Position, ResourceType, usize)> = (0..num_clusters)
        .map(|_| {
            let center = cell_away_from_base(rng, grid, base, CLUSTER_BASE_CLEARANCE);
            let primary = random_resource(rng);
            let size = rng.gen_range(3..=10);
            (center, primary, size)
        })
        .collect();

    for (center, primary, size) in centers {
        clusters.push(primary);
        for _ in 0..size {
            if deposits.len() >= count {
                break;
            }
            let radius = f64::from(rng.gen_range(1..=5u32));
            let angle = rng.gen_range(0.0..std::f64::consts::TAU);
            let pos = grid.clamp(center.offset(
                (radius * angle.cos()) as i32,
                (radius * angle.sin()) as i32,
            ));
            let resource = if rng.gen_bool(PRIMARY_SHARE) {
                primary
            } else {
                random_resource(rng)
            };
            let value = field.deposit_value(pos, resource, richness);
            deposits.push(Deposit::new(pos, resource, value));
        }
    }

    while deposits.len() < count {
        let pos = cell_away_from_base(rng, grid, base, SINGLETON_BASE_CLEARANCE);
        let resource = random_resource(rng);
        let value = field.deposit_value(pos, resource, richness);
        deposits.push(Deposit::new(pos, resource, value));
    }

    FieldPlan { deposits, clusters }
}

/// A single deposit dropped somewhere during the run.
pub fn spawn_one<R: Rng + ?Sized>(
    rng: &mut R,
    grid: &Grid,
    field: &RichnessField,
    base: Position,
    richness: f64,
) -> Deposit {
    let pos = cell_away_from_base(rng, grid, base, SINGLETON_BASE_CLEARANCE);
    let resource = random_resource(rng);
    Deposit::new(pos, resource, field.deposit_value(pos, resource, richness))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_generates_requested_count_in_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let grid = Grid::new(50, 50);
        let field = RichnessField::new(&mut rng);
        let plan = generate(&mut rng, &grid, &field, Position::new(25, 25), 80, 1.0);
        assert_eq!(plan.deposits.len(), 80);
        assert_eq!(plan.clusters.len(), 10);
        assert!(plan.deposits.iter().all(|d| grid.in_bounds(d.position)));
        assert!(plan.deposits.iter().all(|d| d.original_value >= 1 && !d.is_depleted));
    }

    #[test]
    fn test_values_follow_richness() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let field = RichnessField::new(&mut rng);
        let pos = Position::new(3, 4);
        let base = field.deposit_value(pos, ResourceType::Iron, 1.0);
        let rich = field.deposit_value(pos, ResourceType::Iron, 2.0);
        assert!((21..=39).contains(&base));
        assert!(rich >= base * 2 - 1 && rich <= base * 2 + 1);
    }

    #[test]
    fn test_variation_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let field = RichnessField::new(&mut rng);
        for x in 0..30 {
            for y in 0..30 {
                let v = field.variation(Position::new(x, y));
                assert!((0.7..=1.3).contains(&v));
            }
        }
    }

    #[test]
    fn test_tiny_grid_still_places() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let grid = Grid::new(3, 3);
        let field = RichnessField::new(&mut rng);
        let plan = generate(&mut rng, &grid, &field, Position::new(1, 1), 12, 1.0);
        assert_eq!(plan.deposits.len(), 12);
    }
}
