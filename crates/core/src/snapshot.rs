use crate::types::{Grid, BOARD_SIZE};

/// Plain-data copy of a session, for renderers and the network adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameSnapshot {
    pub board: Grid,
    pub score: u32,
    pub best_score: u32,
    pub max_tile: u32,
    pub won: bool,
    pub game_over: bool,
    pub episode_id: u32,
    pub seed: u32,
    /// Accepted (board-changing) moves in this episode
    pub turns: u32,
}

impl GameSnapshot {
    pub fn clear(&mut self) {
        self.board = [[0; BOARD_SIZE]; BOARD_SIZE];
        self.score = 0;
        self.best_score = 0;
        self.max_tile = 0;
        self.won = false;
        self.game_over = false;
        self.episode_id = 0;
        self.seed = 0;
        self.turns = 0;
    }

    pub fn playable(&self) -> bool {
        !self.game_over
    }
}

impl Default for GameSnapshot {
    fn default() -> Self {
        Self {
            board: [[0; BOARD_SIZE]; BOARD_SIZE],
            score: 0,
            best_score: 0,
            max_tile: 0,
            won: false,
            game_over: false,
            episode_id: 0,
            seed: 0,
            turns: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_resets_to_default() {
        let mut s = GameSnapshot {
            board: [[2; BOARD_SIZE]; BOARD_SIZE],
            score: 40,
            best_score: 80,
            max_tile: 2,
            won: true,
            game_over: true,
            episode_id: 3,
            seed: 9,
            turns: 12,
        };
        assert!(!s.playable());
        s.clear();
        assert_eq!(s, GameSnapshot::default());
        assert!(s.playable());
    }

    #[test]
    fn test_won_game_stays_playable() {
        let s = GameSnapshot {
            won: true,
            ..GameSnapshot::default()
        };
        assert!(s.playable());
    }
}
