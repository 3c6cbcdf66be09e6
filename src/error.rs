use std::io;

use crate::puzzle::Move;

#[derive(thiserror::Error, Debug)]
pub enum PuzzleError {
    #[error("malformed board: {0}")]
    MalformedBoard(String),
    #[error("illegal move {mv} with the blank at index {blank}")]
    IllegalMove { mv: Move, blank: usize },
    #[error("corrupt pattern database: {0}")]
    CorruptDatabase(String),
    #[error("pattern database has no entry for group {group} key {key}")]
    DatabaseInconsistency { group: usize, key: String },
    #[error("puzzle is not solvable")]
    Unsolvable,
    #[error("invalid tile partition: {0}")]
    InvalidPartition(String),
    #[error("group {group} produced {found} entries, expected {expected}")]
    BuildInvariant {
        group: usize,
        expected: usize,
        found: usize,
    },
    #[error("pattern database was built for a different goal board")]
    GoalMismatch,
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
