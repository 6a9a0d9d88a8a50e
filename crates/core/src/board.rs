//! Board module - manages the 4x4 tile grid
//!
//! The board is a 4x4 grid where each cell is empty (`0`) or holds a power of
//! two. Uses a flat array for cache locality and zero-allocation.
//! Coordinates: `(row, col)` where row 0 is the top edge and col 0 the left edge.

use arrayvec::ArrayVec;

use crate::rng::TileRng;
use crate::types::{Grid, Position, BOARD_SIZE, CELL_COUNT, SPAWN_FOUR_PROBABILITY};

/// The game board - 4 rows x 4 columns using flat array storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    /// Flat array of cells, row-major order (row * SIZE + col)
    cells: [u32; CELL_COUNT],
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: [0; CELL_COUNT],
        }
    }

    /// Build a board from rows of tile values
    pub fn from_grid(grid: Grid) -> Self {
        let mut cells = [0; CELL_COUNT];
        for (row, values) in grid.iter().enumerate() {
            cells[row * BOARD_SIZE..(row + 1) * BOARD_SIZE].copy_from_slice(values);
        }
        Self { cells }
    }

    #[inline(always)]
    fn index(row: usize, col: usize) -> Option<usize> {
        if row >= BOARD_SIZE || col >= BOARD_SIZE {
            return None;
        }
        Some(row * BOARD_SIZE + col)
    }

    /// Get cell at `(row, col)`; `None` if out of bounds
    pub fn get(&self, row: usize, col: usize) -> Option<u32> {
        Self::index(row, col).map(|idx| self.cells[idx])
    }

    /// Set cell at `(row, col)`; returns false if out of bounds
    pub fn set(&mut self, row: usize, col: usize, value: u32) -> bool {
        match Self::index(row, col) {
            Some(idx) => {
                self.cells[idx] = value;
                true
            }
            None => false,
        }
    }

    #[inline(always)]
    pub(crate) fn at(&self, pos: Position) -> u32 {
        self.cells[pos.index()]
    }

    #[inline(always)]
    pub(crate) fn put(&mut self, pos: Position, value: u32) {
        self.cells[pos.index()] = value;
    }

    /// Raw cells in row-major order
    pub fn cells(&self) -> &[u32; CELL_COUNT] {
        &self.cells
    }

    /// Copy of the board as rows
    pub fn grid(&self) -> Grid {
        let mut out = [[0; BOARD_SIZE]; BOARD_SIZE];
        self.write_grid(&mut out);
        out
    }

    /// Write the board into an existing grid buffer
    pub fn write_grid(&self, out: &mut Grid) {
        for (row, values) in out.iter_mut().enumerate() {
            values.copy_from_slice(&self.cells[row * BOARD_SIZE..(row + 1) * BOARD_SIZE]);
        }
    }

    /// Positions of empty cells in row-major order
    pub fn empty_cells(&self) -> ArrayVec<Position, CELL_COUNT> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &v)| v == 0)
            .map(|(idx, _)| Position::from_index(idx))
            .collect()
    }

    /// Place a 2 (or, with probability 0.1, a 4) on a uniformly chosen empty cell.
    ///
    /// Returns the chosen position, or `None` without consuming randomness when
    /// the board is full.
    pub fn spawn_tile<R: TileRng + ?Sized>(&mut self, rng: &mut R) -> Option<Position> {
        let empty = self.empty_cells();
        if empty.is_empty() {
            return None;
        }
        let pos = empty[rng.next_index(empty.len())];
        let value = if rng.next_float() < SPAWN_FOUR_PROBABILITY {
            4
        } else {
            2
        };
        self.put(pos, value);
        Some(pos)
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|&v| v != 0)
    }

    /// Largest tile on the board (0 when empty)
    pub fn max_tile(&self) -> u32 {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    /// Sum of all tile values
    pub fn tile_sum(&self) -> u32 {
        self.cells.iter().sum()
    }

    /// Whether any two horizontally or vertically adjacent cells hold the same
    /// non-zero value
    pub fn has_adjacent_pair(&self) -> bool {
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE - 1 {
                let v = self.cells[row * BOARD_SIZE + col];
                if v != 0 && v == self.cells[row * BOARD_SIZE + col + 1] {
                    return true;
                }
            }
        }
        for row in 0..BOARD_SIZE - 1 {
            for col in 0..BOARD_SIZE {
                let v = self.cells[row * BOARD_SIZE + col];
                if v != 0 && v == self.cells[(row + 1) * BOARD_SIZE + col] {
                    return true;
                }
            }
        }
        false
    }

    /// No direction can change the board
    pub fn is_stuck(&self) -> bool {
        self.is_full() && !self.has_adjacent_pair()
    }

    /// Clear the entire board
    pub fn clear(&mut self) {
        self.cells = [0; CELL_COUNT];
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
