//! Dense 2D world grid.
//!
//! Cells are stored row-major in a flat `Vec<Cell>`. Coordinates are signed
//! so callers can probe past the edge; any position outside
//! `[0, width) x [0, height)` is simply out of bounds.
//!
//! The grid and the organism arena reference each other: every
//! `Cell::Organism(id)` points at the organism whose stored position is that
//! cell, and vice versa. Only [`WorldGrid::place`], [`WorldGrid::clear`] and
//! [`WorldGrid::move_organism`] change organism cells, and they keep both
//! sides in step.

use crate::config::BarrierRect;
use crate::error::{Result, SimError};
use biosim_data::{Cell, OrganismId, Position};
use rand::Rng;

/// Attempts at rejection sampling before falling back to a full scan.
const PLACEMENT_ATTEMPTS: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub struct WorldGrid {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl WorldGrid {
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width: i32::from(width),
            height: i32::from(height),
            cells: vec![Cell::Empty; usize::from(width) * usize::from(height)],
        }
    }

    /// A grid with every cell of `barriers` (clipped to the grid) blocked.
    #[must_use]
    pub fn with_barriers(width: u16, height: u16, barriers: &[BarrierRect]) -> Self {
        let mut grid = Self::new(width, height);
        for rect in barriers {
            for (x, y) in rect.cells() {
                if let Some(i) = grid.index(Position::new(x, y)) {
                    grid.cells[i] = Cell::Barrier;
                }
            }
        }
        grid
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    #[must_use]
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    /// Row-major cell index, computed in `usize` so that grids with more
    /// than `i32::MAX` cells still address correctly.
    #[inline]
    fn index(&self, pos: Position) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| pos.y as usize * self.width as usize + pos.x as usize)
    }

    #[inline]
    fn position_of(&self, index: usize) -> Position {
        let width = self.width as usize;
        Position::new((index % width) as i32, (index / width) as i32)
    }

    /// Cell contents, or `None` outside the grid.
    #[inline]
    #[must_use]
    pub fn get(&self, pos: Position) -> Option<Cell> {
        self.index(pos).map(|i| self.cells[i])
    }

    #[must_use]
    pub fn is_empty(&self, pos: Position) -> bool {
        self.get(pos) == Some(Cell::Empty)
    }

    #[must_use]
    pub fn is_barrier(&self, pos: Position) -> bool {
        self.get(pos) == Some(Cell::Barrier)
    }

    #[must_use]
    pub fn is_occupied(&self, pos: Position) -> bool {
        matches!(self.get(pos), Some(Cell::Organism(_)))
    }

    #[must_use]
    pub fn organism_at(&self, pos: Position) -> Option<OrganismId> {
        match self.get(pos) {
            Some(Cell::Organism(id)) => Some(id),
            _ => None,
        }
    }

    /// Puts `id` on an empty in-bounds cell.
    pub fn place(&mut self, id: OrganismId, pos: Position) -> Result<()> {
        match self.index(pos) {
            Some(i) if self.cells[i] == Cell::Empty => {
                self.cells[i] = Cell::Organism(id);
                Ok(())
            }
            _ => Err(SimError::Placement { id, position: pos }),
        }
    }

    /// Empties an organism cell. Barriers and out-of-bounds positions are
    /// left alone.
    pub fn clear(&mut self, pos: Position) {
        if let Some(i) = self.index(pos) {
            if matches!(self.cells[i], Cell::Organism(_)) {
                self.cells[i] = Cell::Empty;
            }
        }
    }

    /// Removes every organism, keeping barriers.
    pub fn clear_organisms(&mut self) {
        for cell in &mut self.cells {
            if matches!(cell, Cell::Organism(_)) {
                *cell = Cell::Empty;
            }
        }
    }

    /// Re-labels the organism cell at `pos`. Used when the arena is compacted.
    pub(crate) fn relabel(&mut self, pos: Position, id: OrganismId) {
        if let Some(i) = self.index(pos) {
            if matches!(self.cells[i], Cell::Organism(_)) {
                self.cells[i] = Cell::Organism(id);
            }
        }
    }

    /// Moves organism `id` from `*position` by `(dx, dy)`.
    ///
    /// The move commits only when the target is in bounds and empty; then
    /// the old cell is cleared, the new one set and `*position` updated.
    /// Returns whether the move happened. A zero step targets the organism's
    /// own cell and is therefore rejected.
    pub fn move_organism(
        &mut self,
        id: OrganismId,
        position: &mut Position,
        dx: i32,
        dy: i32,
    ) -> Result<bool> {
        if self.get(*position) != Some(Cell::Organism(id)) {
            return Err(SimError::GridDesync {
                id,
                position: *position,
            });
        }
        let target = position.offset(dx, dy);
        let Some(to) = self.index(target) else {
            return Ok(false);
        };
        if self.cells[to] != Cell::Empty {
            return Ok(false);
        }
        if let Some(from) = self.index(*position) {
            self.cells[from] = Cell::Empty;
        }
        self.cells[to] = Cell::Organism(id);
        *position = target;
        Ok(true)
    }

    /// Draws a uniformly random empty cell.
    pub fn random_empty_cell<R: Rng>(&self, rng: &mut R) -> Result<Position> {
        if self.cells.is_empty() {
            return Err(SimError::GridFull);
        }
        for _ in 0..PLACEMENT_ATTEMPTS {
            let pos = Position::new(rng.gen_range(0..self.width), rng.gen_range(0..self.height));
            if self.is_empty(pos) {
                return Ok(pos);
            }
        }
        // Crowded grid: pick among the remaining empty cells directly.
        let empties: Vec<usize> = self
            .cells
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == Cell::Empty)
            .map(|(i, _)| i)
            .collect();
        if empties.is_empty() {
            return Err(SimError::GridFull);
        }
        Ok(self.position_of(empties[rng.gen_range(0..empties.len())]))
    }

    /// Every organism cell in row-major order.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (Position, OrganismId)> + '_ {
        self.cells.iter().enumerate().filter_map(move |(i, c)| match c {
            Cell::Organism(id) => Some((self.position_of(i), *id)),
            _ => None,
        })
    }

    pub fn barrier_cells(&self) -> impl Iterator<Item = Position> + '_ {
        self.cells.iter().enumerate().filter_map(move |(i, c)| {
            (*c == Cell::Barrier).then(|| self.position_of(i))
        })
    }

    #[must_use]
    pub fn population(&self) -> usize {
        self.occupied_cells().count()
    }

    #[must_use]
    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|c| **c == Cell::Empty).count()
    }
}
