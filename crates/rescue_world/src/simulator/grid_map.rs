//! GridMap: everything an agent has learned about the explored area.
//!
//! Only visited coordinates own a [`Cell`]. What is known about a coordinate
//! that was merely probed lives in the outcome vectors of its visited
//! neighbours and is surfaced through [`GridMap::probe`]. Unknown coordinates
//! are never reported as blocked.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::geometry::{Direction, DirectionPriority, GridCoord};

use super::types::{NeighborOutcome, NeighborScan, PointId};

/// Recorded exploration state of one visited coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub coord: GridCoord,
    /// Time spent reaching the cell, normalized by the straight or diagonal
    /// step cost of the move.
    pub difficulty: f64,
    pub point: Option<PointId>,
    pub outcomes: NeighborScan,
}

/// Answer to "what do we know about this coordinate".
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellProbe<'a> {
    Visited(&'a Cell),
    /// Not visited, but a visited neighbour saw it clear.
    Clear,
    Blocked,
    OutOfBounds,
    Unknown,
}

impl CellProbe<'_> {
    pub fn is_unknown(&self) -> bool {
        matches!(self, CellProbe::Unknown)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridMap {
    cells: HashMap<u64, Cell>,
}

impl GridMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites the cell at `coord`.
    pub fn add(
        &mut self,
        coord: GridCoord,
        difficulty: f64,
        point: Option<PointId>,
        outcomes: NeighborScan,
    ) {
        self.cells.insert(
            coord.pack(),
            Cell {
                coord,
                difficulty,
                point,
                outcomes,
            },
        );
    }

    pub fn get(&self, coord: GridCoord) -> Option<&Cell> {
        self.cells.get(&coord.pack())
    }

    pub fn is_known(&self, coord: GridCoord) -> bool {
        self.cells.contains_key(&coord.pack())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn difficulty(&self, coord: GridCoord) -> Option<f64> {
        self.get(coord).map(|cell| cell.difficulty)
    }

    /// Updates one slot of the outcome vector of a visited cell. Returns false
    /// when `coord` has not been visited.
    pub fn record_outcome(
        &mut self,
        coord: GridCoord,
        direction: Direction,
        outcome: NeighborOutcome,
    ) -> bool {
        match self.cells.get_mut(&coord.pack()) {
            Some(cell) => {
                cell.outcomes.set(direction, outcome);
                true
            }
            None => false,
        }
    }

    pub fn probe(&self, coord: GridCoord) -> CellProbe<'_> {
        if let Some(cell) = self.get(coord) {
            return CellProbe::Visited(cell);
        }
        let mut seen_clear = false;
        for direction in Direction::ALL {
            let Some(neighbor) = self.get(coord.offset(direction)) else {
                continue;
            };
            match neighbor.outcomes.get(direction.opposite()) {
                NeighborOutcome::Blocked => return CellProbe::Blocked,
                NeighborOutcome::OutOfBounds => return CellProbe::OutOfBounds,
                NeighborOutcome::Clear => seen_clear = true,
                NeighborOutcome::Unknown => {}
            }
        }
        if seen_clear {
            CellProbe::Clear
        } else {
            CellProbe::Unknown
        }
    }

    /// Visited neighbours of `coord` reachable in one step, in compass order.
    pub fn neighbors(&self, coord: GridCoord) -> Vec<GridCoord> {
        self.neighbors_in(coord, Direction::ALL.iter().copied())
    }

    pub fn neighbors_with_priority(
        &self,
        coord: GridCoord,
        priority: &DirectionPriority,
    ) -> Vec<GridCoord> {
        self.neighbors_in(coord, priority.iter())
    }

    fn neighbors_in(
        &self,
        coord: GridCoord,
        directions: impl Iterator<Item = Direction>,
    ) -> Vec<GridCoord> {
        let Some(cell) = self.get(coord) else {
            return Vec::new();
        };
        directions
            .filter(|direction| cell.outcomes.get(*direction).is_passable())
            .map(|direction| coord.offset(direction))
            .filter(|next| self.is_known(*next))
            .collect()
    }

    /// Union by coordinate. Cells already present win over `other`'s.
    /// Returns the number of cells taken from `other`.
    pub fn merge(&mut self, other: &GridMap) -> usize {
        let mut inserted = 0;
        for (key, cell) in &other.cells {
            if !self.cells.contains_key(key) {
                self.cells.insert(*key, cell.clone());
                inserted += 1;
            }
        }
        inserted
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values()
    }

    /// Cells ordered by coordinate, for reports and stable comparisons.
    pub fn sorted_cells(&self) -> Vec<&Cell> {
        let mut cells: Vec<&Cell> = self.cells.values().collect();
        cells.sort_by_key(|cell| cell.coord);
        cells
    }

    /// Smallest and largest visited coordinate on each axis.
    pub fn bounds(&self) -> Option<(GridCoord, GridCoord)> {
        let mut cells = self.cells.values();
        let first = cells.next()?.coord;
        Some(cells.fold((first, first), |(min, max), cell| {
            (
                GridCoord::new(min.x.min(cell.coord.x), min.y.min(cell.coord.y)),
                GridCoord::new(max.x.max(cell.coord.x), max.y.max(cell.coord.y)),
            )
        }))
    }
}
