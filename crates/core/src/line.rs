//! Line reducer - compaction and merging of one row or column
//!
//! A line is always reduced toward index 0. Callers extract the cells in the
//! traversal order of the move direction and write the result back with the
//! inverse mapping (see [`crate::moves`]).
//!
//! Merging is leftmost-greedy and single-pass: `[2, 2, 2, 0]` becomes
//! `[4, 2, 0, 0]`, and `[4, 4, 4, 4]` becomes `[8, 8, 0, 0]`. A merged tile is
//! never merged again in the same turn.

use arrayvec::ArrayVec;

use crate::types::BOARD_SIZE;

/// Cell values of one line, in traversal order
pub type Line = [u32; BOARD_SIZE];

/// A tile slide within one line, in line-local indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineMove {
    /// Origin index of the tile, as supplied by the caller
    pub from: usize,
    /// Destination index in the reduced line
    pub to: usize,
    /// Value before any merge
    pub value: u32,
    pub merged: bool,
}

/// Result of reducing one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReducedLine {
    pub cells: Line,
    /// Records in emission order; a tile that stays put emits nothing
    pub moves: ArrayVec<LineMove, BOARD_SIZE>,
    /// Sum of the values created by merges
    pub score: u32,
}

/// Compact and merge `line` toward index 0.
///
/// `origins[i]` is the index reported as `from` for the tile at `line[i]`, and
/// is also what the write cursor is compared against to decide whether a
/// non-merging tile moved.
pub fn reduce(line: Line, origins: [usize; BOARD_SIZE]) -> ReducedLine {
    let mut tiles = ArrayVec::<(u32, usize), BOARD_SIZE>::new();
    for (&value, &origin) in line.iter().zip(origins.iter()) {
        if value != 0 {
            tiles.push((value, origin));
        }
    }

    let mut out = ReducedLine {
        cells: [0; BOARD_SIZE],
        moves: ArrayVec::new(),
        score: 0,
    };

    let mut read = 0usize;
    let mut write = 0usize;
    while read < tiles.len() {
        let (value, origin) = tiles[read];
        match tiles.get(read + 1) {
            Some(&(next_value, next_origin)) if next_value == value => {
                let merged = value * 2;
                out.cells[write] = merged;
                out.score += merged;
                out.moves.push(LineMove {
                    from: origin,
                    to: write,
                    value,
                    merged: true,
                });
                out.moves.push(LineMove {
                    from: next_origin,
                    to: write,
                    value: next_value,
                    merged: true,
                });
                read += 2;
            }
            _ => {
                out.cells[write] = value;
                if origin != write {
                    out.moves.push(LineMove {
                        from: origin,
                        to: write,
                        value,
                        merged: false,
                    });
                }
                read += 1;
            }
        }
        write += 1;
    }

    out
}

/// Identity origins `[0, 1, 2, 3]`
pub const fn local_origins() -> [usize; BOARD_SIZE] {
    let mut out = [0usize; BOARD_SIZE];
    let mut i = 0;
    while i < BOARD_SIZE {
        out[i] = i;
        i += 1;
    }
    out
}
