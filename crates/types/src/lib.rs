//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the application.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (core logic, terminal rendering, network protocol).
//!
//! # Board Dimensions
//!
//! The classic 2048 playfield:
//!
//! - **Size**: 4x4 cells, indexed `(row, col)` with `(0, 0)` at the top-left
//! - **Empty cell**: value `0`
//! - **Tile**: any power of two `>= 2`
//!
//! # Game Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `BOARD_SIZE` | 4 | Rows and columns |
//! | `WIN_TILE` | 2048 | Tile value that sets the win flag |
//! | `SPAWN_FOUR_PROBABILITY` | 0.1 | Chance that a spawned tile is a 4 |
//! | `INITIAL_TILES` | 2 | Tiles spawned on a fresh board |
//! | `MAX_TILE_MOVES` | 16 | Upper bound of move records per turn |
//! | `ANIMATION_FRAMES` | 3 | Frames in one slide animation |
//! | `ANIMATION_FRAME_MS` | 40 | Duration of one animation frame |
//!
//! # Examples
//!
//! ```
//! use tui_2048_types::{Direction, GameAction, Position, BOARD_SIZE};
//!
//! let action = GameAction::from_str("left").unwrap();
//! assert_eq!(action.direction(), Some(Direction::Left));
//!
//! let pos = Position::new(0, 3);
//! assert_eq!(pos.index(), 3);
//! assert_eq!(BOARD_SIZE, 4);
//! ```

/// Rows and columns of the board
pub const BOARD_SIZE: usize = 4;

/// Total number of cells on the board
pub const CELL_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

/// Reaching a tile of this value sets the win flag
pub const WIN_TILE: u32 = 2048;

/// Probability that a spawned tile is a 4 instead of a 2
pub const SPAWN_FOUR_PROBABILITY: f64 = 0.1;

/// Number of tiles spawned on a fresh board
pub const INITIAL_TILES: usize = 2;

/// Every line emits at most one record per tile, so a turn never exceeds one per cell.
pub const MAX_TILE_MOVES: usize = CELL_COUNT;

/// Number of frames in one slide animation
pub const ANIMATION_FRAMES: u32 = 3;

/// Duration of one animation frame in milliseconds
pub const ANIMATION_FRAME_MS: u32 = 40;

/// Username length bounds (inclusive)
pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 20;

/// Entries shown on the leaderboard
pub const LEADERBOARD_LIMIT: usize = 10;

/// The full board as rows of tile values (0 = empty)
pub type Grid = [[u32; BOARD_SIZE]; BOARD_SIZE];


/// The four move directions
///
/// Gravity acts toward the named edge: `Left` slides tiles toward column 0,
/// `Down` toward row 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Parse direction from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use tui_2048_types::Direction;
    ///
    /// assert_eq!(Direction::from_str("up"), Some(Direction::Up));
    /// assert_eq!(Direction::from_str("Left"), Some(Direction::Left));
    /// assert_eq!(Direction::from_str("north"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            "left" => Some(Direction::Left),
            "right" => Some(Direction::Right),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

/// A cell on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Row-major index into a flat cell array
    #[inline(always)]
    pub fn index(&self) -> usize {
        (self.row as usize) * BOARD_SIZE + (self.col as usize)
    }

    /// Inverse of [`Position::index`]
    #[inline(always)]
    pub fn from_index(idx: usize) -> Self {
        Self {
            row: (idx / BOARD_SIZE) as u8,
            col: (idx % BOARD_SIZE) as u8,
        }
    }
}

/// One tile's slide during a turn
///
/// `value` is the tile's value before any merge. When `merged` is set, the tile
/// is one of the two sources that combine at `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileMove {
    pub from: Position,
    pub to: Position,
    pub value: u32,
    pub merged: bool,
}

/// Game actions that can be applied to modify game state
///
/// These actions are used by both keyboard input and network clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameAction {
    /// Slide all tiles up
    MoveUp,
    /// Slide all tiles down
    MoveDown,
    /// Slide all tiles left
    MoveLeft,
    /// Slide all tiles right
    MoveRight,
    /// Start a fresh board (best score is kept)
    Restart,
    /// Show or hide the leaderboard (front-end only)
    Leaderboard,
}

impl GameAction {
    /// Parse action from string (for the network protocol)
    ///
    /// # Examples
    ///
    /// ```
    /// use tui_2048_types::GameAction;
    ///
    /// assert_eq!(GameAction::from_str("up"), Some(GameAction::MoveUp));
    /// assert_eq!(GameAction::from_str("restart"), Some(GameAction::Restart));
    /// assert_eq!(GameAction::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "up" => Some(GameAction::MoveUp),
            "down" => Some(GameAction::MoveDown),
            "left" => Some(GameAction::MoveLeft),
            "right" => Some(GameAction::MoveRight),
            "restart" => Some(GameAction::Restart),
            "leaderboard" => Some(GameAction::Leaderboard),
            _ => None,
        }
    }

    /// Convert to the protocol string
    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::MoveUp => "up",
            GameAction::MoveDown => "down",
            GameAction::MoveLeft => "left",
            GameAction::MoveRight => "right",
            GameAction::Restart => "restart",
            GameAction::Leaderboard => "leaderboard",
        }
    }

    /// The move direction, if this action is a move
    pub fn direction(&self) -> Option<Direction> {
        match self {
            GameAction::MoveUp => Some(Direction::Up),
            GameAction::MoveDown => Some(Direction::Down),
            GameAction::MoveLeft => Some(Direction::Left),
            GameAction::MoveRight => Some(Direction::Right),
            GameAction::Restart | GameAction::Leaderboard => None,
        }
    }
}

impl From<Direction> for GameAction {
    fn from(value: Direction) -> Self {
        match value {
            Direction::Up => GameAction::MoveUp,
            Direction::Down => GameAction::MoveDown,
            Direction::Left => GameAction::MoveLeft,
            Direction::Right => GameAction::MoveRight,
        }
    }
}
