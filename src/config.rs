use log::{info, warn};
use std::env;
use std::path::PathBuf;

use crate::codec;
use crate::database::PatternDatabase;
use crate::error::PuzzleError;
use crate::pattern::Partition;
use crate::puzzle::State;

pub const DEFAULT_DATABASE_PATH: &str = "fifteen.pdb";
pub const DATABASE_PATH_VAR: &str = "FIFTEEN_PDB";
pub const PARALLEL_BUILD_VAR: &str = "FIFTEEN_PARALLEL_BUILD";

#[derive(Clone, Debug)]
pub struct SolverConfig {
    pub database_path: PathBuf,
    pub partition: Partition,
    pub goal: State,
    pub parallel_build: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            partition: Partition::default(),
            goal: State::goal(),
            parallel_build: true,
        }
    }
}

impl SolverConfig {
    pub fn from_env() -> Self {
        Self::default().with_overrides(|name| env::var(name).ok())
    }

    fn with_overrides<F: Fn(&str) -> Option<String>>(mut self, lookup: F) -> Self {
        if let Some(path) = lookup(DATABASE_PATH_VAR).filter(|p| !p.is_empty()) {
            self.database_path = PathBuf::from(path);
        }
        if let Some(value) = lookup(PARALLEL_BUILD_VAR) {
            self.parallel_build = !matches!(value.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off");
        }
        self
    }

    /// Loads the database at `database_path`, or builds and saves it when the
    /// file is missing, unreadable as a database, or was made for another goal
    /// or partition.
    pub fn load_or_build_database(&self) -> Result<PatternDatabase, PuzzleError> {
        if self.database_path.exists() {
            match codec::load(&self.database_path) {
                Ok(db) if db.goal() == &self.goal && db.partition() == &self.partition => return Ok(db),
                Ok(_) => warn!(
                    "{} was built for another goal or partition, rebuilding",
                    self.database_path.display()
                ),
                Err(PuzzleError::CorruptDatabase(reason)) => warn!(
                    "{} is corrupt ({}), rebuilding",
                    self.database_path.display(),
                    reason
                ),
                Err(e) => return Err(e),
            }
        } else {
            info!("No pattern database at {}", self.database_path.display());
        }

        let db = PatternDatabase::build(&self.goal, &self.partition, self.parallel_build)?;
        codec::save(&db, &self.database_path)?;
        Ok(db)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = SolverConfig::default().with_overrides(lookup(&[]));
        assert_eq!(config.database_path, PathBuf::from(DEFAULT_DATABASE_PATH));
        assert!(config.parallel_build);
        assert_eq!(config.goal, State::goal());
    }

    #[test]
    fn environment_overrides() {
        let config = SolverConfig::default().with_overrides(lookup(&[
            (DATABASE_PATH_VAR, "/tmp/other.pdb"),
            (PARALLEL_BUILD_VAR, "false"),
        ]));
        assert_eq!(config.database_path, PathBuf::from("/tmp/other.pdb"));
        assert!(!config.parallel_build);

        let config = SolverConfig::default().with_overrides(lookup(&[(PARALLEL_BUILD_VAR, "1")]));
        assert!(config.parallel_build);
    }

    #[test]
    fn builds_then_reuses_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = SolverConfig {
            database_path: dir.path().join("pairs.pdb"),
            partition: Partition::new(vec![
                vec![1, 2],
                vec![3, 4],
                vec![5, 6],
                vec![7, 8],
                vec![9, 10],
                vec![11, 12],
                vec![13, 14],
                vec![15],
            ])
            .unwrap(),
            goal: State::goal(),
            parallel_build: false,
        };
        let built = config.load_or_build_database().unwrap();
        assert!(config.database_path.exists());
        let loaded = config.load_or_build_database().unwrap();
        assert_eq!(built, loaded);
    }

    #[test]
    fn corrupt_file_is_rebuilt() {
        let dir = tempfile::tempdir().unwrap();
        let config = SolverConfig {
            database_path: dir.path().join("pairs.pdb"),
            partition: Partition::new(vec![
                vec![1, 2],
                vec![3, 4],
                vec![5, 6],
                vec![7, 8],
                vec![9, 10],
                vec![11, 12],
                vec![13, 14],
                vec![15],
            ])
            .unwrap(),
            goal: State::goal(),
            parallel_build: false,
        };
        std::fs::write(&config.database_path, b"15PD\x01 cut off mid-write").unwrap();
        let rebuilt = config.load_or_build_database().unwrap();
        assert_eq!(codec::load(&config.database_path).unwrap(), rebuilt);
    }
}
