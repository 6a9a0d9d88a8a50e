use std::path::{Path, PathBuf};

use anyhow::Context;

/// File name of the score store inside the data directory
pub const STORE_FILE: &str = "scores.db";

/// Where persistent data lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
        }
    }
}

impl StoreConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Create from environment variables (`TWENTY48_DATA_DIR`)
    pub fn from_env() -> Self {
        let data_dir = std::env::var("TWENTY48_DATA_DIR")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./data"));
        Self { data_dir }
    }

    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(STORE_FILE)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Create the data directory if it does not exist
    pub fn ensure_dirs(&self) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.data_dir)
            .with_context(|| format!("creating data dir {}", self.data_dir.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_path_is_inside_data_dir() {
        let cfg = StoreConfig::new("/tmp/somewhere");
        assert_eq!(cfg.store_path(), PathBuf::from("/tmp/somewhere/scores.db"));
        assert_eq!(StoreConfig::default().data_dir(), Path::new("./data"));
    }

    #[test]
    fn test_ensure_dirs_creates_nested() {
        let td = tempfile::tempdir().unwrap();
        let cfg = StoreConfig::new(td.path().join("a").join("b"));
        cfg.ensure_dirs().unwrap();
        assert!(cfg.data_dir().is_dir());
        // Idempotent.
        cfg.ensure_dirs().unwrap();
    }
}
