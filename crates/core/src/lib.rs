//! Core game logic module - pure, deterministic, and testable
//!
//! This module contains the 2048 rules and session state. It has **zero
//! dependencies** on UI, networking, or I/O, making it:
//!
//! - **Deterministic**: Same seed produces identical games
//! - **Testable**: Every rule is a small pure function
//! - **Portable**: Runs in the terminal front-end, the TCP server, or headless
//! - **Fast**: No allocation while applying a move
//!
//! # Module Structure
//!
//! - [`line`]: compaction and merging of one 4-cell line
//! - [`board`]: 4x4 grid with spawning and terminal checks
//! - [`moves`]: maps a direction onto four line reductions
//! - [`game_state`]: one session with score, best score and the won/over latches
//! - [`rng`]: injectable random sources for spawning
//!
//! # Game Rules
//!
//! - Tiles slide toward the chosen edge; equal neighbours merge once per turn
//! - A move that changes nothing is rejected: no score, no spawn
//! - Every accepted move spawns a 2 (90%) or a 4 (10%) on a random empty cell
//! - Reaching 2048 sets the sticky `won` flag; play continues
//! - The game is over when the board is full with no equal neighbours
//!
//! # Example
//!
//! ```
//! use tui_2048_core::{Board, GameState, SimpleRng};
//! use tui_2048_types::Direction;
//!
//! let board = Board::from_grid([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
//! let mut game = GameState::with_board(board, 0, SimpleRng::new(12345));
//!
//! let result = game.apply_move(Direction::Left).unwrap();
//! assert!(result.moved);
//! assert_eq!(game.score(), 4);
//! assert_eq!(game.board().get(0, 0), Some(4));
//! ```

pub mod board;
pub mod game_state;
pub mod latch;
pub mod line;
pub mod moves;
pub mod rng;
pub mod snapshot;

pub use tui_2048_types as types;

// Re-export commonly used types for convenience
pub use board::Board;
pub use game_state::{GameState, MoveResult};
pub use latch::Latch;
pub use line::{reduce, LineMove, ReducedLine};
pub use moves::{apply_move, can_move, Sweep};
pub use rng::{RandSource, SimpleRng, TileRng};
pub use snapshot::GameSnapshot;
