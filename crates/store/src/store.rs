//! Score store - players, finished games and the leaderboard
//!
//! Backed by SQLite. Schema:
//! - players(id INTEGER PRIMARY KEY, fingerprint TEXT UNIQUE, username TEXT, created_at INT)
//! - scores(id INTEGER PRIMARY KEY, player_id INT REFERENCES players, score INT,
//!   max_tile INT, created_at INT)
//!
//! Every mutation is a single statement, so a failed write leaves nothing
//! behind: what queries return is always what is on disk.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::types::{USERNAME_MAX_LEN, USERNAME_MIN_LEN};

/// A registered player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: u64,
    pub fingerprint: String,
    pub username: String,
    /// Milliseconds since the Unix epoch
    pub created_at: u64,
}

/// One finished game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub id: u64,
    pub player_id: u64,
    pub score: u32,
    pub max_tile: u32,
    pub created_at: u64,
}

/// A leaderboard row; ranks start at 1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub username: String,
    pub score: u32,
    pub max_tile: u32,
    pub created_at: u64,
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS players (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    fingerprint TEXT UNIQUE NOT NULL,
    username TEXT NOT NULL,
    created_at INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS scores (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    player_id INTEGER NOT NULL REFERENCES players(id),
    score INTEGER NOT NULL,
    max_tile INTEGER NOT NULL,
    created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_scores_score ON scores(score DESC);
CREATE INDEX IF NOT EXISTS idx_scores_player ON scores(player_id);
"#;

/// Check a username against the length bounds (counted in characters, after trimming)
pub fn validate_username(username: &str) -> anyhow::Result<&str> {
    let name = username.trim();
    let len = name.chars().count();
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        bail!(
            "username must be {}-{} characters, got {}",
            USERNAME_MIN_LEN,
            USERNAME_MAX_LEN,
            len
        );
    }
    Ok(name)
}

/// Persistent player and score records
#[derive(Debug)]
pub struct ScoreStore {
    path: Option<PathBuf>,
    conn: Connection,
}

impl ScoreStore {
    /// Open the database at `path`, creating it and the schema if missing
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
        let conn = Connection::open(&path)
            .with_context(|| format!("opening score store {}", path.display()))?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })
        .with_context(|| format!("opening score store {}", path.display()))?;
        let store = Self::init(conn)
            .with_context(|| format!("opening score store {}", path.display()))?;
        tracing::info!(path = %path.display(), "score store opened");
        Ok(Self {
            path: Some(path),
            ..store
        })
    }

    /// A store that is never written to disk
    pub fn in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("opening in-memory score store")?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> anyhow::Result<Self> {
        conn.pragma_update(None, "foreign_keys", true)
            .context("enabling foreign keys")?;
        conn.execute_batch(SCHEMA).context("creating schema")?;
        Ok(Self { path: None, conn })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn player(&self, player_id: u64) -> anyhow::Result<Option<Player>> {
        self.conn
            .query_row(
                "SELECT id, fingerprint, username, created_at FROM players WHERE id = ?1",
                params![player_id as i64],
                player_from_row,
            )
            .optional()
            .with_context(|| format!("loading player {}", player_id))
    }

    pub fn player_by_fingerprint(&self, fingerprint: &str) -> anyhow::Result<Option<Player>> {
        self.conn
            .query_row(
                "SELECT id, fingerprint, username, created_at FROM players
                 WHERE fingerprint = ?1",
                params![fingerprint],
                player_from_row,
            )
            .optional()
            .context("looking up player by fingerprint")
    }

    /// Register a new player. Fails on an invalid username or a fingerprint
    /// that is already registered.
    pub fn create_player(&mut self, fingerprint: &str, username: &str) -> anyhow::Result<Player> {
        let username = validate_username(username)?;
        if self.player_by_fingerprint(fingerprint)?.is_some() {
            bail!("fingerprint {} is already registered", fingerprint);
        }

        let created_at = current_timestamp_ms();
        self.conn
            .execute(
                "INSERT INTO players (fingerprint, username, created_at) VALUES (?1, ?2, ?3)",
                params![fingerprint, username, created_at as i64],
            )
            .context("inserting player")?;
        let player = Player {
            id: self.conn.last_insert_rowid() as u64,
            fingerprint: fingerprint.to_string(),
            username: username.to_string(),
            created_at,
        };

        tracing::info!(player_id = player.id, username = %player.username, "player created");
        Ok(player)
    }

    pub fn update_username(&mut self, player_id: u64, username: &str) -> anyhow::Result<()> {
        let username = validate_username(username)?;
        let updated = self
            .conn
            .execute(
                "UPDATE players SET username = ?1 WHERE id = ?2",
                params![username, player_id as i64],
            )
            .context("updating username")?;
        if updated == 0 {
            bail!("unknown player {}", player_id);
        }
        tracing::info!(player_id, "username updated");
        Ok(())
    }

    /// Highest recorded score of the player (0 when none)
    pub fn best_score(&self, player_id: u64) -> anyhow::Result<u32> {
        let best: i64 = self
            .conn
            .query_row(
                "SELECT COALESCE(MAX(score), 0) FROM scores WHERE player_id = ?1",
                params![player_id as i64],
                |row| row.get(0),
            )
            .context("loading best score")?;
        Ok(best as u32)
    }

    /// Record a finished game
    pub fn save_score(
        &mut self,
        player_id: u64,
        score: u32,
        max_tile: u32,
    ) -> anyhow::Result<ScoreRecord> {
        if self.player(player_id)?.is_none() {
            bail!("unknown player {}", player_id);
        }

        let created_at = current_timestamp_ms();
        self.conn
            .execute(
                "INSERT INTO scores (player_id, score, max_tile, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![player_id as i64, score as i64, max_tile as i64, created_at as i64],
            )
            .context("inserting score")?;
        let record = ScoreRecord {
            id: self.conn.last_insert_rowid() as u64,
            player_id,
            score,
            max_tile,
            created_at,
        };

        tracing::info!(player_id, score, max_tile, "score saved");
        Ok(record)
    }

    /// The player's games, best first
    pub fn player_scores(&self, player_id: u64, limit: usize) -> anyhow::Result<Vec<ScoreRecord>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, player_id, score, max_tile, created_at FROM scores
             WHERE player_id = ?1
             ORDER BY score DESC, id ASC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![player_id as i64, limit as i64], |row| {
            Ok(ScoreRecord {
                id: row.get::<_, i64>(0)? as u64,
                player_id: row.get::<_, i64>(1)? as u64,
                score: row.get::<_, i64>(2)? as u32,
                max_tile: row.get::<_, i64>(3)? as u32,
                created_at: row.get::<_, i64>(4)? as u64,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>()
            .context("loading player scores")
    }

    /// Top games across all players, best first
    pub fn leaderboard(&self, limit: usize) -> anyhow::Result<Vec<LeaderboardEntry>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT p.username, s.score, s.max_tile, s.created_at
             FROM scores s
             JOIN players p ON s.player_id = p.id
             ORDER BY s.score DESC, s.id ASC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)? as u32,
                row.get::<_, i64>(2)? as u32,
                row.get::<_, i64>(3)? as u64,
            ))
        })?;

        let mut entries = Vec::new();
        for (i, row) in rows.enumerate() {
            let (username, score, max_tile, created_at) = row.context("loading leaderboard")?;
            entries.push(LeaderboardEntry {
                rank: i + 1,
                username,
                score,
                max_tile,
                created_at,
            });
        }
        Ok(entries)
    }

    /// One more than the number of recorded games that beat the player's best
    pub fn player_rank(&self, player_id: u64) -> anyhow::Result<usize> {
        let rank: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) + 1 FROM scores
                 WHERE score > (SELECT COALESCE(MAX(score), 0) FROM scores WHERE player_id = ?1)",
                params![player_id as i64],
                |row| row.get(0),
            )
            .context("loading player rank")?;
        Ok(rank as usize)
    }

    pub fn player_count(&self) -> anyhow::Result<usize> {
        self.count("SELECT COUNT(*) FROM players")
    }

    pub fn score_count(&self) -> anyhow::Result<usize> {
        self.count("SELECT COUNT(*) FROM scores")
    }

    fn count(&self, sql: &str) -> anyhow::Result<usize> {
        let n: i64 = self
            .conn
            .query_row(sql, [], |row| row.get(0))
            .with_context(|| format!("running {:?}", sql))?;
        Ok(n as usize)
    }
}

fn player_from_row(row: &Row<'_>) -> rusqlite::Result<Player> {
    Ok(Player {
        id: row.get::<_, i64>(0)? as u64,
        fingerprint: row.get(1)?,
        username: row.get(2)?,
        created_at: row.get::<_, i64>(3)? as u64,
    })
}

fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn seeded() -> (ScoreStore, u64, u64) {
        let mut store = ScoreStore::in_memory().unwrap();
        let alice = store.create_player("FNV1A:a", "alice").unwrap().id;
        let bob = store.create_player("FNV1A:b", "bob").unwrap().id;
        (store, alice, bob)
    }

    #[test]
    fn test_username_bounds() {
        assert!(validate_username("ab").is_err());
        assert!(validate_username("abc").is_ok());
        assert!(validate_username(&"x".repeat(20)).is_ok());
        assert!(validate_username(&"x".repeat(21)).is_err());
        assert_eq!(validate_username("  carol ").unwrap(), "carol");
        // Characters, not bytes.
        assert!(validate_username("äöü").is_ok());
    }

    #[test]
    fn test_create_and_lookup() {
        let (store, alice, _) = seeded();
        let p = store.player_by_fingerprint("FNV1A:a").unwrap().unwrap();
        assert_eq!(p.id, alice);
        assert_eq!(p.username, "alice");
        assert!(store.player_by_fingerprint("FNV1A:zz").unwrap().is_none());
        assert_eq!(store.player(alice).unwrap(), Some(p));
    }

    #[test]
    fn test_duplicate_fingerprint_rejected() {
        let (mut store, _, _) = seeded();
        assert!(store.create_player("FNV1A:a", "alice2").is_err());
        assert_eq!(store.player_count().unwrap(), 2);
    }

    #[test]
    fn test_invalid_username_rejected() {
        let mut store = ScoreStore::in_memory().unwrap();
        assert!(store.create_player("FNV1A:x", "no").is_err());
        assert_eq!(store.player_count().unwrap(), 0);
    }

    #[test]
    fn test_update_username() {
        let (mut store, alice, _) = seeded();
        store.update_username(alice, "alicia").unwrap();
        assert_eq!(store.player(alice).unwrap().unwrap().username, "alicia");
        assert!(store.update_username(alice, "x").is_err());
        assert!(store.update_username(999, "valid").is_err());
    }

    #[test]
    fn test_best_score_defaults_to_zero() {
        let (mut store, alice, bob) = seeded();
        assert_eq!(store.best_score(alice).unwrap(), 0);
        store.save_score(alice, 120, 16).unwrap();
        store.save_score(alice, 300, 32).unwrap();
        store.save_score(alice, 80, 8).unwrap();
        assert_eq!(store.best_score(alice).unwrap(), 300);
        assert_eq!(store.best_score(bob).unwrap(), 0);
    }

    #[test]
    fn test_save_score_for_unknown_player_fails() {
        let mut store = ScoreStore::in_memory().unwrap();
        assert!(store.save_score(1, 100, 8).is_err());
        assert_eq!(store.score_count().unwrap(), 0);
    }

    #[test]
    fn test_player_scores_best_first() {
        let (mut store, alice, bob) = seeded();
        store.save_score(alice, 120, 16).unwrap();
        store.save_score(bob, 999, 64).unwrap();
        store.save_score(alice, 300, 32).unwrap();
        store.save_score(alice, 80, 8).unwrap();

        let scores: Vec<u32> = store
            .player_scores(alice, 10)
            .unwrap()
            .iter()
            .map(|s| s.score)
            .collect();
        assert_eq!(scores, vec![300, 120, 80]);
        assert_eq!(store.player_scores(alice, 2).unwrap().len(), 2);
    }

    #[test]
    fn test_leaderboard_is_global_and_ranked() {
        let (mut store, alice, bob) = seeded();
        store.save_score(alice, 500, 64).unwrap();
        store.save_score(bob, 700, 64).unwrap();
        store.save_score(alice, 600, 64).unwrap();
        store.save_score(bob, 100, 8).unwrap();

        let board = store.leaderboard(3).unwrap();
        let rows: Vec<(usize, &str, u32)> = board
            .iter()
            .map(|e| (e.rank, e.username.as_str(), e.score))
            .collect();
        assert_eq!(rows, vec![(1, "bob", 700), (2, "alice", 600), (3, "alice", 500)]);
        assert!(ScoreStore::in_memory().unwrap().leaderboard(10).unwrap().is_empty());
    }

    #[test]
    fn test_player_rank() {
        let (mut store, alice, bob) = seeded();
        store.save_score(alice, 500, 64).unwrap();
        store.save_score(bob, 700, 64).unwrap();
        store.save_score(bob, 600, 64).unwrap();
        assert_eq!(store.player_rank(bob).unwrap(), 1);
        assert_eq!(store.player_rank(alice).unwrap(), 3);

        // No scores: every recorded game beats 0.
        let carol = store.create_player("FNV1A:c", "carol").unwrap().id;
        assert_eq!(store.player_rank(carol).unwrap(), 4);
    }

    #[test]
    fn test_failed_writes_leave_no_trace() {
        let (mut store, alice, _) = seeded();
        store.save_score(alice, 100, 8).unwrap();
        store.conn.execute_batch("PRAGMA query_only = ON").unwrap();

        assert!(store.save_score(alice, 500, 64).is_err());
        assert_eq!(store.score_count().unwrap(), 1);
        assert_eq!(store.best_score(alice).unwrap(), 100);
        assert_eq!(store.leaderboard(10).unwrap().len(), 1);

        assert!(store.create_player("FNV1A:c", "carol").is_err());
        assert!(store.player_by_fingerprint("FNV1A:c").unwrap().is_none());
        assert_eq!(store.player_count().unwrap(), 2);

        assert!(store.update_username(alice, "alicia").is_err());
        assert_eq!(store.player(alice).unwrap().unwrap().username, "alice");
    }

    #[test]
    fn test_persists_across_reopen() {
        let td = tempdir().unwrap();
        let path = td.path().join("nested").join("scores.db");
        let alice = {
            let mut store = ScoreStore::open(&path).unwrap();
            let id = store.create_player("FNV1A:a", "alice").unwrap().id;
            store.save_score(id, 2048, 256).unwrap();
            id
        };
        assert!(path.exists());

        let mut store = ScoreStore::open(&path).unwrap();
        assert_eq!(store.path(), Some(path.as_path()));
        let found = store.player_by_fingerprint("FNV1A:a").unwrap().unwrap();
        assert_eq!(found.id, alice);
        assert_eq!(store.best_score(alice).unwrap(), 2048);

        // Ids keep counting after a reopen.
        let bob = store.create_player("FNV1A:b", "bob").unwrap();
        assert_ne!(bob.id, alice);
    }

    #[test]
    fn test_open_rejects_corrupt_file() {
        let td = tempdir().unwrap();
        let path = td.path().join("scores.db");
        std::fs::write(&path, vec![b'x'; 4096]).unwrap();
        let err = ScoreStore::open(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("opening score store"));
    }

    #[test]
    fn test_in_memory_has_no_path() {
        assert!(ScoreStore::in_memory().unwrap().path().is_none());
    }
}
