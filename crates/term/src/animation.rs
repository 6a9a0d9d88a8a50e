//! Slide animation between two boards.
//!
//! Tiles travel along their recorded moves over a fixed number of frames;
//! tiles without a move record are drawn in place. Two merging tiles that land
//! on the same cell in the same frame are shown as their sum. The last frame is
//! always the real post-move board, spawned tile included.

use arrayvec::ArrayVec;

use crate::core::MoveResult;
use crate::types::{Grid, TileMove, ANIMATION_FRAMES, BOARD_SIZE, MAX_TILE_MOVES};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideAnimation {
    moves: ArrayVec<TileMove, MAX_TILE_MOVES>,
    board_before: Grid,
    board_after: Grid,
    frame: u32,
    total_frames: u32,
}

impl SlideAnimation {
    /// Animation for an accepted move; `None` for a no-op.
    pub fn from_result(result: &MoveResult) -> Option<Self> {
        Self::with_frames(result, ANIMATION_FRAMES)
    }

    pub fn with_frames(result: &MoveResult, total_frames: u32) -> Option<Self> {
        if !result.moved {
            return None;
        }
        Some(Self {
            moves: result.moves.clone(),
            board_before: result.board_before,
            board_after: result.board_after,
            frame: 0,
            total_frames: total_frames.max(1),
        })
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn total_frames(&self) -> u32 {
        self.total_frames
    }

    pub fn is_finished(&self) -> bool {
        self.frame >= self.total_frames
    }

    /// Step one frame. Returns `true` while frames remain to be shown.
    pub fn advance(&mut self) -> bool {
        if self.frame < self.total_frames {
            self.frame += 1;
        }
        !self.is_finished()
    }

    /// Board to draw for the current frame.
    pub fn grid(&self) -> Grid {
        self.frame_grid(self.frame)
    }

    /// Board to draw for `frame`.
    pub fn frame_grid(&self, frame: u32) -> Grid {
        if frame >= self.total_frames {
            return self.board_after;
        }
        let progress = frame as f64 / self.total_frames as f64;

        let mut grid = [[0u32; BOARD_SIZE]; BOARD_SIZE];

        // Tiles that do not move stay where they were.
        for (row, values) in self.board_before.iter().enumerate() {
            for (col, &value) in values.iter().enumerate() {
                let moving = self
                    .moves
                    .iter()
                    .any(|m| m.from.row as usize == row && m.from.col as usize == col);
                if value != 0 && !moving {
                    grid[row][col] = value;
                }
            }
        }

        // Cells reached by a moving tile in this frame, with the value that got there.
        let mut landed = [[0u32; BOARD_SIZE]; BOARD_SIZE];
        for m in &self.moves {
            let row = interpolate(m.from.row, m.to.row, progress);
            let col = interpolate(m.from.col, m.to.col, progress);
            if landed[row][col] == m.value {
                grid[row][col] = m.value * 2;
            } else {
                grid[row][col] = m.value;
            }
            landed[row][col] = m.value;
        }

        grid
    }
}

fn interpolate(from: u8, to: u8, progress: f64) -> usize {
    let from = from as f64;
    let to = to as f64;
    let at = (from + (to - from) * progress + 0.5).floor();
    at.clamp(0.0, (BOARD_SIZE - 1) as f64) as usize
}
