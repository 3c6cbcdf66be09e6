use log::{debug, info, trace};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::time::Instant;
use thousands::Separable;

use crate::database::PatternDatabase;
use crate::error::PuzzleError;
use crate::heuristic::HeuristicEvaluator;
use crate::puzzle::{Move, State};

const PROGRESS_INTERVAL: usize = 1 << 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub moves: Vec<Move>,
    pub nodes_generated: u64,
}

/// Frontier entry. The heap pops the smallest `(f, h, seq)`; `seq` is the
/// push order and makes ties deterministic.
struct Node {
    f: u32,
    h: u32,
    seq: u64,
    state: State,
    path: Vec<Move>,
}

impl Node {
    fn key(&self) -> (u32, u32, u64) {
        (self.f, self.h, self.seq)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Node {}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        other.key().cmp(&self.key())
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A* over board states guided by a pattern database.
pub struct Solver<'a> {
    evaluator: HeuristicEvaluator<'a>,
}

impl<'a> Solver<'a> {
    pub fn new(database: &'a PatternDatabase) -> Self {
        Self {
            evaluator: HeuristicEvaluator::new(database),
        }
    }

    pub fn evaluator(&self) -> &HeuristicEvaluator<'a> {
        &self.evaluator
    }

    /// Finds a minimum-length move sequence from `initial` to `goal`.
    ///
    /// `goal` has to be the board the database was built for. Pairs of
    /// opposite parity are rejected with [`PuzzleError::Unsolvable`] before
    /// any search happens.
    pub fn solve(&self, initial: &State, goal: &State) -> Result<Solution, PuzzleError> {
        if goal != self.evaluator.database().goal() {
            return Err(PuzzleError::GoalMismatch);
        }
        if !initial.is_solvable_to(goal) {
            return Err(PuzzleError::Unsolvable);
        }

        let stopwatch = Instant::now();
        let mut frontier = BinaryHeap::new();
        let mut explored: HashSet<State> = HashSet::new();
        let mut nodes_generated: u64 = 0;
        let mut seq: u64 = 0;

        let h = self.evaluator.heuristic(initial)?;
        debug!("Initial heuristic {}", h);
        frontier.push(Node {
            f: h,
            h,
            seq,
            state: *initial,
            path: Vec::new(),
        });

        while let Some(node) = frontier.pop() {
            if explored.contains(&node.state) {
                continue;
            }
            trace!("pop f={} h={} g={}", node.f, node.h, node.path.len());

            if node.state == *goal {
                info!(
                    "Solved in {} moves, {} nodes generated, {} explored, {:.2?}",
                    node.path.len(),
                    nodes_generated.separate_with_commas(),
                    explored.len().separate_with_commas(),
                    stopwatch.elapsed()
                );
                return Ok(Solution {
                    moves: node.path,
                    nodes_generated,
                });
            }

            explored.insert(node.state);
            if explored.len() % PROGRESS_INTERVAL == 0 {
                debug!(
                    "{} explored, {} in frontier, f={}",
                    explored.len().separate_with_commas(),
                    frontier.len().separate_with_commas(),
                    node.f
                );
            }

            let g = node.path.len() as u32 + 1;
            for (movement, next) in node.state.successors() {
                if explored.contains(&next) {
                    continue;
                }
                let h = self.evaluator.heuristic(&next)?;
                let mut path = node.path.clone();
                path.push(movement);
                seq += 1;
                frontier.push(Node {
                    f: g + h,
                    h,
                    seq,
                    state: next,
                    path,
                });
                nodes_generated += 1;
            }
        }

        Err(PuzzleError::Unsolvable)
    }
}

/// Solves `initial` against `goal` with `database`, returning the move list
/// and the number of generated nodes.
pub fn find_minimum_path(
    initial: &State,
    goal: &State,
    database: &PatternDatabase,
) -> Result<(Vec<Move>, u64), PuzzleError> {
    let solution = Solver::new(database).solve(initial, goal)?;
    Ok((solution.moves, solution.nodes_generated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Partition;

    fn pairs_db() -> PatternDatabase {
        let partition = Partition::new(vec![
            vec![1, 2],
            vec![3, 4],
            vec![5, 6],
            vec![7, 8],
            vec![9, 10],
            vec![11, 12],
            vec![13, 14],
            vec![15],
        ])
        .unwrap();
        PatternDatabase::build(&State::goal(), &partition, false).unwrap()
    }

    #[test]
    fn frontier_pops_lowest_f_then_h_then_seq() {
        let s = State::goal();
        let node = |f, h, seq| Node {
            f,
            h,
            seq,
            state: s,
            path: Vec::new(),
        };
        let mut heap = BinaryHeap::new();
        heap.push(node(5, 3, 0));
        heap.push(node(4, 4, 1));
        heap.push(node(4, 1, 2));
        heap.push(node(4, 1, 3));
        let order: Vec<(u32, u32, u64)> = std::iter::from_fn(|| heap.pop().map(|n| n.key())).collect();
        assert_eq!(order, vec![(4, 1, 2), (4, 1, 3), (4, 4, 1), (5, 3, 0)]);
    }

    #[test]
    fn solved_instance_needs_no_moves() {
        let db = pairs_db();
        let goal = State::goal();
        let solution = Solver::new(&db).solve(&goal, &goal).unwrap();
        assert!(solution.moves.is_empty());
        assert_eq!(solution.nodes_generated, 0);
    }

    #[test]
    fn one_move_from_goal() {
        let db = pairs_db();
        let goal = State::goal();
        let initial = goal.apply(Move::Down).unwrap();
        let solution = Solver::new(&db).solve(&initial, &goal).unwrap();
        assert_eq!(solution.moves, vec![Move::Up]);
        assert!(solution.nodes_generated >= 1);
    }

    #[test]
    fn wrong_goal_is_rejected() {
        let db = pairs_db();
        let other = State::goal().apply(Move::Left).unwrap();
        let err = Solver::new(&db).solve(&State::goal(), &other).unwrap_err();
        assert!(matches!(err, PuzzleError::GoalMismatch));
    }

    #[test]
    fn odd_parity_is_unsolvable() {
        let db = pairs_db();
        let mut layout = *State::goal().layout();
        layout.swap(1, 2);
        let initial = State::from_values(layout).unwrap();
        let err = find_minimum_path(&initial, &State::goal(), &db).unwrap_err();
        assert!(matches!(err, PuzzleError::Unsolvable));
    }
}
