//! Move orchestrator - applies one direction to the whole board
//!
//! Every direction is the same three steps over four independent lines:
//! extract the line in traversal order, [`reduce`](crate::line::reduce) it,
//! write it back. The only per-direction knowledge is [`position`], which maps
//! `(line, index)` to a grid cell; index 0 is always the edge tiles slide toward.

use arrayvec::ArrayVec;

use crate::board::Board;
use crate::line::{local_origins, reduce, Line};
use crate::types::{Direction, Position, TileMove, BOARD_SIZE, MAX_TILE_MOVES};

/// Everything a sweep produced besides the mutated board
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sweep {
    /// Move records, line by line, each line in reducer emission order
    pub moves: ArrayVec<TileMove, MAX_TILE_MOVES>,
    /// Sum of merged values
    pub score: u32,
}

/// Grid cell of the `index`-th element of `line` when moving in `dir`
#[inline(always)]
pub fn position(dir: Direction, line: usize, index: usize) -> Position {
    let far = BOARD_SIZE - 1 - index;
    let (row, col) = match dir {
        Direction::Left => (line, index),
        Direction::Right => (line, far),
        Direction::Up => (index, line),
        Direction::Down => (far, line),
    };
    Position::new(row as u8, col as u8)
}

/// Slide every line of `board` toward `dir`, in place.
///
/// This is the raw transform: it neither spawns tiles nor rejects no-op moves.
pub fn apply_move(board: &mut Board, dir: Direction) -> Sweep {
    let mut sweep = Sweep::default();

    for line in 0..BOARD_SIZE {
        let mut cells: Line = [0; BOARD_SIZE];
        for (index, cell) in cells.iter_mut().enumerate() {
            *cell = board.at(position(dir, line, index));
        }

        let reduced = reduce(cells, local_origins());

        for (index, &value) in reduced.cells.iter().enumerate() {
            board.put(position(dir, line, index), value);
        }
        sweep.score += reduced.score;
        sweep.moves.extend(reduced.moves.iter().map(|m| TileMove {
            from: position(dir, line, m.from),
            to: position(dir, line, m.to),
            value: m.value,
            merged: m.merged,
        }));
    }

    sweep
}

/// Whether moving in `dir` would change the board
pub fn can_move(board: &Board, dir: Direction) -> bool {
    let mut scratch = *board;
    apply_move(&mut scratch, dir);
    scratch != *board
}
