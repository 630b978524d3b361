//! Planar sample layout.
//!
//! [`PointSampler`] is the seam to whatever spatial sampler the embedding
//! application prefers. The only contract is the separation guarantee: no two
//! returned points are closer than `min_separation`, and all points lie in
//! `[0, w] × [0, h]`. [`PointField`] then centers the result on the origin.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

/// Produces separated planar points inside `[0, area.x] × [0, area.y]`.
pub trait PointSampler {
    fn sample(&mut self, area: Vec2, min_separation: f32, max_separation: f32) -> Vec<Vec2>;
}

/// Bridson Poisson-disk sampling.
///
/// New candidates are drawn from the annulus `[min_separation, max_separation]`
/// around an active point. Seeded, so layouts are reproducible.
#[derive(Debug)]
pub struct PoissonDiskSampler {
    rng: StdRng,
    /// Candidates tried around an active point before it is retired.
    pub max_attempts: u32,
}

impl PoissonDiskSampler {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            max_attempts: 30,
        }
    }
}

impl PointSampler for PoissonDiskSampler {
    fn sample(&mut self, area: Vec2, min_separation: f32, max_separation: f32) -> Vec<Vec2> {
        if !(area.x > 0.0 && area.y > 0.0 && min_separation > 0.0) {
            return Vec::new();
        }
        let max_separation = max_separation.max(min_separation);

        let mut grid = BackgroundGrid::new(area, min_separation);
        let mut points = Vec::new();
        let mut active = Vec::new();

        let first = Vec2::new(
            self.rng.random_range(0.0..area.x),
            self.rng.random_range(0.0..area.y),
        );
        grid.insert(first, points.len());
        active.push(points.len());
        points.push(first);

        while !active.is_empty() {
            let slot = self.rng.random_range(0..active.len());
            let origin = points[active[slot]];
            let mut placed = false;

            for _ in 0..self.max_attempts {
                let angle = self.rng.random_range(0.0..TAU);
                let radius = if max_separation > min_separation {
                    self.rng.random_range(min_separation..max_separation)
                } else {
                    min_separation
                };
                let candidate = origin + Vec2::from_angle(angle) * radius;

                if candidate.x < 0.0 || candidate.y < 0.0 || candidate.x > area.x || candidate.y > area.y {
                    continue;
                }
                if grid.has_neighbor_within(candidate, &points) {
                    continue;
                }

                grid.insert(candidate, points.len());
                active.push(points.len());
                points.push(candidate);
                placed = true;
                break;
            }

            if !placed {
                active.swap_remove(slot);
            }
        }

        points
    }
}

/// Acceleration grid with cells of `r / √2`, so each cell holds at most one point.
struct BackgroundGrid {
    cell_size: f32,
    min_distance_sq: f32,
    columns: usize,
    rows: usize,
    cells: Vec<Option<usize>>,
}

impl BackgroundGrid {
    fn new(area: Vec2, min_distance: f32) -> Self {
        let cell_size = min_distance / std::f32::consts::SQRT_2;
        let columns = (area.x / cell_size).ceil() as usize + 1;
        let rows = (area.y / cell_size).ceil() as usize + 1;
        Self {
            cell_size,
            min_distance_sq: min_distance * min_distance,
            columns,
            rows,
            cells: vec![None; columns * rows],
        }
    }

    fn cell_of(&self, p: Vec2) -> (usize, usize) {
        let cx = ((p.x / self.cell_size) as usize).min(self.columns - 1);
        let cy = ((p.y / self.cell_size) as usize).min(self.rows - 1);
        (cx, cy)
    }

    fn insert(&mut self, p: Vec2, index: usize) {
        let (cx, cy) = self.cell_of(p);
        self.cells[cy * self.columns + cx] = Some(index);
    }

    fn has_neighbor_within(&self, p: Vec2, points: &[Vec2]) -> bool {
        let (cx, cy) = self.cell_of(p);
        let x_range = cx.saturating_sub(2)..=(cx + 2).min(self.columns - 1);
        for y in cy.saturating_sub(2)..=(cy + 2).min(self.rows - 1) {
            for x in x_range.clone() {
                if let Some(index) = self.cells[y * self.columns + x]
                    && points[index].distance_squared(p) < self.min_distance_sq
                {
                    return true;
                }
            }
        }
        false
    }
}

/// Returns a pre-baked layout regardless of the requested area.
#[derive(Debug, Clone, Default)]
pub struct FixedSampler {
    points: Vec<Vec2>,
}

impl FixedSampler {
    #[must_use]
    pub fn new(points: Vec<Vec2>) -> Self {
        Self { points }
    }
}

impl PointSampler for FixedSampler {
    fn sample(&mut self, _area: Vec2, _min_separation: f32, _max_separation: f32) -> Vec<Vec2> {
        self.points.clone()
    }
}

pub struct PointField;

impl PointField {
    /// Samples `area` and re-centers the points on the origin.
    pub fn generate(
        sampler: &mut dyn PointSampler,
        area: Vec2,
        min_separation: f32,
        max_separation: f32,
    ) -> Vec<Vec2> {
        let half = area * 0.5;
        sampler
            .sample(area, min_separation, max_separation)
            .into_iter()
            .map(|p| p - half)
            .collect()
    }
}
