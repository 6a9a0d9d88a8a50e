//! Store module - persistent players, scores and the leaderboard (SQLite)
//!
//! Players are identified by a fingerprint of a client credential (see
//! [`fingerprint`]), never by the credential itself. Every finished game is
//! recorded; the leaderboard ranks individual games, so one player can hold
//! several rows.
//!
//! # Example
//!
//! ```
//! use tui_2048_store::{fingerprint, ScoreStore};
//!
//! let mut store = ScoreStore::in_memory().unwrap();
//! let player = store.create_player(&fingerprint("alice"), "alice").unwrap();
//! store.save_score(player.id, 1024, 128).unwrap();
//!
//! assert_eq!(store.best_score(player.id).unwrap(), 1024);
//! assert_eq!(store.leaderboard(10).unwrap()[0].username, "alice");
//! assert_eq!(store.player_rank(player.id).unwrap(), 1);
//! ```

pub mod config;
pub mod identity;
pub mod store;

pub use tui_2048_types as types;

pub use config::{StoreConfig, STORE_FILE};
pub use identity::{fingerprint, Fnv1aHasher};
pub use store::{validate_username, LeaderboardEntry, Player, ScoreRecord, ScoreStore};
