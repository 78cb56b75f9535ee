#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Uniform grid bucketing for near-constant-time proximity queries.
//!
//! The index is rebuilt from scratch every tick and only stores slice indices
//! into the entity collection it was built from, so it never owns or outlives
//! the entities themselves. It performs no radius logic: callers that need a
//! neighborhood walk the 3×3 block of cells around a point.

use std::collections::HashMap;

use glam::DVec2;
use thiserror::Error;
use waypoint_defence_core::{HostileUnit, SPATIAL_CELL_SIZE};

/// Reasons a cell size may be rejected.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum SpatialIndexError {
    /// Cell sizes must be positive and finite.
    #[error("cell size must be positive and finite, got {0}")]
    InvalidCellSize(f64),
}

/// Edge length of a grid cell, validated to be positive and finite.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct CellSize(f64);

impl CellSize {
    /// Cell size used by the simulation stepper.
    pub const STANDARD: CellSize = CellSize(SPATIAL_CELL_SIZE);

    /// Validates and wraps a cell size.
    pub fn new(size: f64) -> Result<Self, SpatialIndexError> {
        if size.is_finite() && size > 0.0 {
            Ok(Self(size))
        } else {
            Err(SpatialIndexError::InvalidCellSize(size))
        }
    }

    /// Edge length in world units.
    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl Default for CellSize {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Integer coordinate of a grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId {
    column: i64,
    row: i64,
}

impl CellId {
    /// Creates a cell identifier from column and row indices.
    #[must_use]
    pub const fn new(column: i64, row: i64) -> Self {
        Self { column, row }
    }

    /// Horizontal cell index.
    #[must_use]
    pub const fn column(&self) -> i64 {
        self.column
    }

    /// Vertical cell index.
    #[must_use]
    pub const fn row(&self) -> i64 {
        self.row
    }
}

/// Anything with a world position that can be bucketed.
pub trait Positioned {
    /// Current world position.
    fn position(&self) -> DVec2;
}

impl Positioned for DVec2 {
    fn position(&self) -> DVec2 {
        *self
    }
}

impl Positioned for HostileUnit {
    fn position(&self) -> DVec2 {
        self.position
    }
}

/// Closest entity found by a proximity search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Nearest {
    /// Index of the entity in the slice that was searched.
    pub index: usize,
    /// Euclidean distance between the entity and the query point.
    pub distance: f64,
}

/// Snapshot of entity positions bucketed into square cells.
#[derive(Clone, Debug)]
pub struct SpatialIndex {
    cell_size: CellSize,
    cells: HashMap<CellId, Vec<usize>>,
}

impl SpatialIndex {
    /// Buckets every entity of `entities` by the cell containing its position.
    ///
    /// Indices within a cell keep the order of the source slice.
    #[must_use]
    pub fn build<T: Positioned>(entities: &[T], cell_size: CellSize) -> Self {
        let mut index = Self {
            cell_size,
            cells: HashMap::new(),
        };
        for (slot, entity) in entities.iter().enumerate() {
            let cell = index.cell_of(entity.position());
            index.cells.entry(cell).or_default().push(slot);
        }
        index
    }

    /// Identifier of the cell containing `position`.
    #[must_use]
    pub fn cell_of(&self, position: DVec2) -> CellId {
        let size = self.cell_size.get();
        CellId::new(
            (position.x / size).floor() as i64,
            (position.y / size).floor() as i64,
        )
    }

    /// Entity indices bucketed in exactly `cell`, empty when the cell is vacant.
    #[must_use]
    pub fn query(&self, cell: CellId) -> &[usize] {
        self.cells.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Entity indices in the 3×3 block of cells centred on the cell of `position`.
    ///
    /// Cells are visited column by column, rows ascending within a column.
    pub fn neighborhood(&self, position: DVec2) -> impl Iterator<Item = usize> + '_ {
        let centre = self.cell_of(position);
        (-1..=1).flat_map(move |dx| {
            (-1..=1).flat_map(move |dy| {
                self.query(CellId::new(centre.column + dx, centre.row + dy))
                    .iter()
                    .copied()
            })
        })
    }

    /// Closest entity to `point` among the 3×3 neighborhood.
    ///
    /// `entities` must be the slice the index was built from. Exact distance
    /// ties go to the lowest slice index, matching [`nearest_brute_force`].
    #[must_use]
    pub fn nearest_in_neighborhood<T: Positioned>(
        &self,
        entities: &[T],
        point: DVec2,
    ) -> Option<Nearest> {
        closest(
            self.neighborhood(point)
                .filter_map(|slot| entities.get(slot).map(|entity| (slot, entity))),
            point,
        )
    }

    /// Number of non-empty cells.
    #[must_use]
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }
}

/// Closest entity to `point` found by checking every entity.
///
/// Exact distance ties go to the lowest slice index.
#[must_use]
pub fn nearest_brute_force<T: Positioned>(entities: &[T], point: DVec2) -> Option<Nearest> {
    closest(entities.iter().enumerate(), point)
}

fn closest<'a, T, I>(candidates: I, point: DVec2) -> Option<Nearest>
where
    T: Positioned + 'a,
    I: Iterator<Item = (usize, &'a T)>,
{
    let mut best: Option<Nearest> = None;
    for (index, entity) in candidates {
        let distance = point.distance(entity.position());
        let closer = best.map_or(true, |existing| {
            distance < existing.distance
                || (distance == existing.distance && index < existing.index)
        });
        if closer {
            best = Some(Nearest { index, distance });
        }
    }
    best
}
