//! fifteen-puzzle: optimal 15-puzzle solving with additive pattern databases
//!
//! This crate provides:
//! - An immutable `State` board with legal-move generation (`puzzle` module)
//! - Disjoint tile groups and masked projections (`pattern` module)
//! - A reverse 0/1 BFS database builder (`database` module) and its binary file format (`codec` module)
//! - An A* solver driven by the summed group costs (`search` module)
//!
//! Quick start:
//! ```
//! use fifteen_puzzle::{Partition, PatternDatabase, Solver, State};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! // Small groups keep the build quick; `Partition::default()` is the 4/4/4/3 split.
//! let partition = Partition::new(vec![
//!     vec![1, 2], vec![3, 4], vec![5, 6], vec![7, 8],
//!     vec![9, 10], vec![11, 12], vec![13, 14], vec![15],
//! ])?;
//! let goal = State::goal();
//! let db = PatternDatabase::build(&goal, &partition, false)?;
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let initial = goal.scrambled(12, &mut rng);
//! let solution = Solver::new(&db).solve(&initial, &goal)?;
//! assert!(solution.moves.len() <= 12);
//! # Ok::<(), fifteen_puzzle::PuzzleError>(())
//! ```
pub mod codec;
pub mod config;
pub mod database;
pub mod error;
pub mod heuristic;
pub mod pattern;
pub mod puzzle;
pub mod search;

pub use config::SolverConfig;
pub use database::{PatternDatabase, PatternTable};
pub use error::PuzzleError;
pub use heuristic::HeuristicEvaluator;
pub use pattern::{MaskedKey, Partition, PatternGroup};
pub use puzzle::{Move, State};
pub use search::{find_minimum_path, Solution, Solver};
