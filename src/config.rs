//! # Configuration
//!
//! Rankings live in a single `SQLite` file in the platform data directory:
//! - Linux: `~/.local/share/reelrank/rankings.db`
//! - macOS: `~/Library/Application Support/reelrank/rankings.db`
//! - Windows: `%APPDATA%\reelrank\rankings.db`
//!
//! The command line can point elsewhere with `--db` (or `REELRANK_DB`) and
//! fix the schedule shuffle with `--seed` (or `REELRANK_SEED`).

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::ranking::TOP_N;

const APP_DIR: &str = "reelrank";
const DB_FILE: &str = "rankings.db";

/// Platform data directory for reelrank, created if missing.
///
/// # Errors
///
/// Returns an error if the system data directory cannot be determined or the
/// subdirectory cannot be created.
pub fn get_data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().ok_or_else(|| {
        anyhow::anyhow!(
            "Could not determine system data directory. Use --db to choose a database file."
        )
    })?;

    let app_dir = data_dir.join(APP_DIR);
    fs::create_dir_all(&app_dir).with_context(|| {
        format!(
            "Failed to create data directory at {}. Please check file permissions.",
            app_dir.display()
        )
    })?;

    Ok(app_dir)
}

/// Default database file path.
///
/// # Errors
///
/// See [`get_data_dir`].
pub fn get_db_path() -> Result<PathBuf> {
    Ok(get_data_dir()?.join(DB_FILE))
}

/// Settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub db_path: PathBuf,
    /// Entries shown per list and used as seeding opponents.
    pub top_n: usize,
    /// Fixed shuffle seed; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::with_db_path(get_db_path().unwrap_or_else(|_| PathBuf::from(DB_FILE)))
    }
}

impl RuntimeConfig {
    /// Configuration with the default database location.
    ///
    /// # Errors
    ///
    /// See [`get_db_path`].
    pub fn new() -> Result<Self> {
        Ok(Self::with_db_path(get_db_path()?))
    }

    #[must_use]
    pub fn with_db_path(db_path: PathBuf) -> Self {
        Self {
            db_path,
            top_n: TOP_N,
            seed: None,
        }
    }

    /// Uses `db_path` when given, the default location otherwise.
    ///
    /// # Errors
    ///
    /// See [`get_db_path`].
    pub fn resolve(db_path: Option<PathBuf>, seed: Option<u64>) -> Result<Self> {
        let mut config = match db_path {
            Some(path) => Self::with_db_path(path),
            None => Self::new()?,
        };
        config.seed = seed;
        Ok(config)
    }

    /// Random source for schedule shuffling.
    #[must_use]
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_get_db_path_structure() {
        let path = get_db_path().expect("Should get valid path");
        assert_eq!(path.file_name().unwrap(), DB_FILE);

        let parent = path.parent().expect("Should have parent directory");
        assert_eq!(parent.file_name().unwrap(), APP_DIR);
        assert!(parent.is_dir());
    }

    #[test]
    fn test_get_db_path_consistent_results() {
        assert_eq!(get_db_path().unwrap(), get_db_path().unwrap());
    }

    #[test]
    fn test_explicit_path_wins() {
        let config = RuntimeConfig::resolve(Some(PathBuf::from("/tmp/x/rankings.db")), Some(3)).unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/x/rankings.db"));
        assert_eq!(config.top_n, TOP_N);
        assert_eq!(config.seed, Some(3));
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let config = RuntimeConfig::with_db_path(PathBuf::from("r.db"));
        let seeded = RuntimeConfig { seed: Some(42), ..config };

        let a: u64 = seeded.rng().gen();
        let b: u64 = seeded.rng().gen();
        assert_eq!(a, b);
    }
}
