use crate::database::PatternDatabase;
use crate::error::PuzzleError;
use crate::puzzle::{State, BLANK, CELLS, SIDE};

/// Additive disjoint pattern database heuristic.
pub struct HeuristicEvaluator<'a> {
    database: &'a PatternDatabase,
}

impl<'a> HeuristicEvaluator<'a> {
    pub fn new(database: &'a PatternDatabase) -> Self {
        Self { database }
    }

    pub fn database(&self) -> &'a PatternDatabase {
        self.database
    }

    /// Sum of every group's table cost for the projection of `state`.
    pub fn heuristic(&self, state: &State) -> Result<u32, PuzzleError> {
        let mut total = 0u32;
        for (group, table) in self.database.tables().iter().enumerate() {
            let key = table.group().project(state);
            let cost = table
                .get(&key)
                .ok_or_else(|| PuzzleError::DatabaseInconsistency {
                    group,
                    key: key.to_string(),
                })?;
            total += cost as u32;
        }
        Ok(total)
    }
}

/// Sum of every tile's taxicab distance to its cell in `goal`. Kept as a
/// baseline the pattern databases are checked against.
pub fn manhattan_distance(state: &State, goal: &State) -> u32 {
    let mut target = [0usize; CELLS];
    for (i, &v) in goal.layout().iter().enumerate() {
        target[v as usize] = i;
    }

    state
        .layout()
        .iter()
        .enumerate()
        .filter(|&(_, &v)| v != BLANK)
        .map(|(i, &v)| {
            let t = target[v as usize];
            ((i / SIDE).abs_diff(t / SIDE) + (i % SIDE).abs_diff(t % SIDE)) as u32
        })
        .sum()
}
