//! Game state module - one 2048 session
//!
//! A session owns its board, scores, flags and random source. It is
//! single-owner and synchronous: hosts that run many sessions concurrently give
//! each one to exactly one task.

use arrayvec::ArrayVec;

use crate::board::Board;
use crate::latch::Latch;
use crate::moves;
use crate::rng::{SimpleRng, TileRng};
use crate::snapshot::GameSnapshot;
use crate::types::{
    Direction, GameAction, Grid, Position, TileMove, INITIAL_TILES, MAX_TILE_MOVES, WIN_TILE,
};

/// Outcome of one move request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveResult {
    pub direction: Direction,
    /// False when the direction changed nothing; then no other field changed either
    pub moved: bool,
    /// Per-tile slides in emission order (empty for a no-op)
    pub moves: ArrayVec<TileMove, MAX_TILE_MOVES>,
    /// Sum of the values created by merges this turn
    pub score: u32,
    pub board_before: Grid,
    /// Board after the slide and the spawn
    pub board_after: Grid,
    pub new_tile: Option<Position>,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState<R = SimpleRng> {
    board: Board,
    score: u32,
    best_score: u32,
    won: Latch,
    game_over: Latch,
    rng: R,
    /// Seed the random source was built from (0 when not known)
    seed: u32,
    episode_id: u32,
    turns: u32,
}

impl GameState<SimpleRng> {
    /// New session driven by a [`SimpleRng`] with the given seed
    pub fn seeded(seed: u32, best_score: u32) -> Self {
        let mut state = Self::new(best_score, SimpleRng::new(seed));
        state.seed = seed;
        state
    }
}

impl<R: TileRng> GameState<R> {
    /// New session with two spawned tiles
    pub fn new(best_score: u32, rng: R) -> Self {
        let mut state = Self::with_board(Board::new(), best_score, rng);
        state.spawn_initial();
        state
    }

    /// Session over an existing board, without spawning.
    ///
    /// Flags are derived from the board: `won` if it already holds a winning
    /// tile, `game_over` if no move is possible.
    pub fn with_board(board: Board, best_score: u32, rng: R) -> Self {
        let mut won = Latch::new();
        if board.max_tile() >= WIN_TILE {
            won.set();
        }
        let mut game_over = Latch::new();
        if board.is_stuck() {
            game_over.set();
        }
        Self {
            board,
            score: 0,
            best_score,
            won,
            game_over,
            rng,
            seed: 0,
            episode_id: 0,
            turns: 0,
        }
    }

    fn spawn_initial(&mut self) {
        for _ in 0..INITIAL_TILES {
            self.board.spawn_tile(&mut self.rng);
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    pub fn game_over(&self) -> bool {
        self.game_over.is_set()
    }

    pub fn won(&self) -> bool {
        self.won.is_set()
    }

    pub fn max_tile(&self) -> u32 {
        self.board.max_tile()
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    pub fn turns(&self) -> u32 {
        self.turns
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        self.board.write_grid(&mut out.board);
        out.score = self.score;
        out.best_score = self.best_score;
        out.max_tile = self.board.max_tile();
        out.won = self.won.is_set();
        out.game_over = self.game_over.is_set();
        out.episode_id = self.episode_id;
        out.seed = self.seed;
        out.turns = self.turns;
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }

    /// Slide all tiles toward `direction`.
    ///
    /// Returns `None` once the game is over. A direction that changes nothing
    /// yields `moved = false` and leaves the session untouched.
    pub fn apply_move(&mut self, direction: Direction) -> Option<MoveResult> {
        if self.game_over.is_set() {
            return None;
        }

        let before = self.board;
        let sweep = moves::apply_move(&mut self.board, direction);

        // Board equality decides; the records are presentation only.
        let moved = self.board != before;
        debug_assert_eq!(
            moved,
            !sweep.moves.is_empty(),
            "move records disagree with board change for {:?}",
            direction
        );

        if !moved {
            let grid = before.grid();
            return Some(MoveResult {
                direction,
                moved: false,
                moves: ArrayVec::new(),
                score: 0,
                board_before: grid,
                board_after: grid,
                new_tile: None,
            });
        }

        self.score += sweep.score;
        self.best_score = self.best_score.max(self.score);
        self.turns = self.turns.wrapping_add(1);

        if self.board.max_tile() >= WIN_TILE && self.won.set() {
            tracing::info!(score = self.score, turns = self.turns, "reached {}", WIN_TILE);
        }

        let new_tile = self.board.spawn_tile(&mut self.rng);

        if self.board.is_stuck() && self.game_over.set() {
            tracing::info!(
                score = self.score,
                max_tile = self.board.max_tile(),
                turns = self.turns,
                "game over"
            );
        }

        tracing::debug!(
            direction = direction.as_str(),
            gained = sweep.score,
            score = self.score,
            "move applied"
        );

        Some(MoveResult {
            direction,
            moved: true,
            moves: sweep.moves,
            score: sweep.score,
            board_before: before.grid(),
            board_after: self.board.grid(),
            new_tile,
        })
    }

    /// Start a fresh board: score 0, flags cleared, best score kept
    pub fn reset(&mut self) {
        self.board.clear();
        self.score = 0;
        self.won = Latch::new();
        self.game_over = Latch::new();
        self.episode_id = self.episode_id.wrapping_add(1);
        self.turns = 0;
        self.spawn_initial();
        tracing::debug!(episode = self.episode_id, best = self.best_score, "reset");
    }

    /// Apply a game action. Moves return their result; `Restart` resets and
    /// returns `None`; `Leaderboard` is a front-end action and does nothing here.
    pub fn apply_action(&mut self, action: GameAction) -> Option<MoveResult> {
        match action {
            GameAction::Restart => {
                self.reset();
                None
            }
            GameAction::Leaderboard => None,
            _ => action.direction().and_then(|dir| self.apply_move(dir)),
        }
    }
}

impl Default for GameState<SimpleRng> {
    fn default() -> Self {
        Self::seeded(1, 0)
    }
}
