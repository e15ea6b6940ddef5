//! Uniform bucket grid for fixed-radius neighbor search.
//!
//! The grid covers the simulation domain with cells at least as wide as the
//! kernel support radius `h`, so every particle within `h` of a query point
//! lies in the 3x3 block of cells around the query cell. Cell indices wrap
//! at the grid edges in both directions; whether separations are measured
//! across the seam is decided by the grid's [`Topology`].
//!
//! The grid is rebuilt every tick: [`SpatialGrid::clear`] keeps the bucket
//! allocations and [`SpatialGrid::insert`] refills them.

use bevy::prelude::*;

use super::error::{ensure_positive, FluidError};
use super::vector::{torus_separation, Vector2};

/// Upper bound on `count_x * count_y`.
pub const MAX_GRID_CELLS: usize = 1 << 22;

/// How separations between particles are measured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Reflect)]
pub enum Topology {
    /// Plain subtraction; particles on opposite edges never interact.
    #[default]
    Bounded,
    /// Minimum-image subtraction on a torus the size of the domain.
    Periodic,
}

/// Reducer applied to every neighbor found by [`SpatialGrid::fold_neighbors`].
///
/// `candidate` is the slot index given at insertion and `separation` is the
/// vector from the candidate to the query point.
pub trait NeighborFold {
    type State;

    fn fold(&mut self, candidate: usize, separation: Vector2, state: Self::State) -> Self::State;
}

/// One particle reference stored in a bucket.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridEntry {
    /// Particle slot index.
    pub index: usize,
    /// Position at insertion time.
    pub position: Vector2,
}

/// Uniform grid of particle buckets over a rectangular domain.
#[derive(Clone, Debug)]
pub struct SpatialGrid {
    /// Query radius (kernel support radius).
    radius: f64,
    /// Domain extent.
    size: Vector2,
    /// Cell extent on each axis, never below `radius`.
    cell_size: Vector2,
    count_x: usize,
    count_y: usize,
    topology: Topology,
    cells: Vec<Vec<GridEntry>>,
    len: usize,
}

impl SpatialGrid {
    /// Creates an empty grid for a `width x height` domain.
    ///
    /// Bounded grids use `ceil(extent / radius)` cells of exactly `radius`.
    /// Periodic grids use `floor(extent / radius)` cells stretched to tile the
    /// torus exactly, which keeps the 3x3 search valid across the seam.
    /// Domains needing more than [`MAX_GRID_CELLS`] cells are rejected.
    pub fn new(width: f64, height: f64, radius: f64, topology: Topology) -> Result<Self, FluidError> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(FluidError::InvalidDomain { width, height });
        }
        let radius = ensure_positive("smoothing_radius", radius)?;
        if (width / radius).ceil() * (height / radius).ceil() > MAX_GRID_CELLS as f64 {
            return Err(FluidError::InvalidDomain { width, height });
        }

        let (count_x, count_y, cell_size) = match topology {
            Topology::Bounded => (
                (width / radius).ceil() as usize,
                (height / radius).ceil() as usize,
                Vector2::splat(radius),
            ),
            Topology::Periodic => {
                let count_x = periodic_count(width, radius);
                let count_y = periodic_count(height, radius);
                (
                    count_x,
                    count_y,
                    Vector2::new(width / count_x as f64, height / count_y as f64),
                )
            }
        };

        Ok(Self {
            radius,
            size: Vector2::new(width, height),
            cell_size,
            count_x,
            count_y,
            topology,
            cells: vec![Vec::new(); count_x * count_y],
            len: 0,
        })
    }

    /// Number of cells along x.
    pub fn count_x(&self) -> usize {
        self.count_x
    }

    /// Number of cells along y.
    pub fn count_y(&self) -> usize {
        self.count_y
    }

    /// Cell extent on each axis.
    pub fn cell_size(&self) -> Vector2 {
        self.cell_size
    }

    /// Cell extent along x.
    pub fn cell_width(&self) -> f64 {
        self.cell_size.x
    }

    /// Cell extent along y.
    pub fn cell_height(&self) -> f64 {
        self.cell_size.y
    }

    /// Query radius.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Domain extent the grid was built for.
    pub fn size(&self) -> Vector2 {
        self.size
    }

    /// Whether separations wrap across the domain edges.
    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Number of entries inserted since the last clear.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Entries of the cell at `(ix, iy)`, wrapped into range.
    pub fn bucket(&self, ix: i64, iy: i64) -> &[GridEntry] {
        &self.cells[self.cell_index(ix, iy)]
    }

    /// Empties every bucket, keeping their allocations.
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
        self.len = 0;
    }

    /// Adds a particle reference at `position`.
    ///
    /// Positions outside the domain wrap onto the opposite edge; nothing is
    /// ever addressed outside the bucket array.
    pub fn insert(&mut self, position: Vector2, index: usize) {
        let (ix, iy) = self.cell_coords(position);
        let cell = self.cell_index(ix, iy);
        self.cells[cell].push(GridEntry { index, position });
        self.len += 1;
    }

    /// Unwrapped cell coordinates of a position.
    #[inline]
    pub fn cell_coords(&self, position: Vector2) -> (i64, i64) {
        (
            (position.x / self.cell_size.x).floor() as i64,
            (position.y / self.cell_size.y).floor() as i64,
        )
    }

    /// Flat bucket index with Euclidean wrap on both axes.
    #[inline]
    fn cell_index(&self, ix: i64, iy: i64) -> usize {
        let x = ix.rem_euclid(self.count_x as i64) as usize;
        let y = iy.rem_euclid(self.count_y as i64) as usize;
        x + y * self.count_x
    }

    /// Folds `fold` over every entry strictly within `radius` of `target`.
    pub fn fold_neighbors<F: NeighborFold>(
        &self,
        target: Vector2,
        fold: &mut F,
        mut state: F::State,
    ) -> F::State {
        let (ix, iy) = self.cell_coords(target);
        let (columns, column_count) = wrapped_span(ix, self.count_x);
        let (rows, row_count) = wrapped_span(iy, self.count_y);

        for &row in &rows[..row_count] {
            for &column in &columns[..column_count] {
                for entry in &self.cells[column + row * self.count_x] {
                    let separation = match self.topology {
                        Topology::Bounded => target - entry.position,
                        Topology::Periodic => torus_separation(target, entry.position, self.size),
                    };
                    if separation.length() >= self.radius {
                        continue;
                    }
                    state = fold.fold(entry.index, separation, state);
                }
            }
        }

        state
    }
}

/// Largest cell count whose cells are still at least `radius` wide.
fn periodic_count(extent: f64, radius: f64) -> usize {
    let mut count = ((extent / radius).floor() as usize).max(1);
    while count > 1 && extent / (count as f64) < radius {
        count -= 1;
    }
    count
}

/// Distinct wrapped indices of `center - 1 ..= center + 1` on an axis with
/// `count` cells. Axes with fewer than three cells yield each cell once.
#[inline]
fn wrapped_span(center: i64, count: usize) -> ([usize; 3], usize) {
    if count >= 3 {
        let n = count as i64;
        let mid = center.rem_euclid(n);
        (
            [
                (mid - 1).rem_euclid(n) as usize,
                mid as usize,
                (mid + 1).rem_euclid(n) as usize,
            ],
            3,
        )
    } else {
        ([0, 1, 2], count)
    }
}
