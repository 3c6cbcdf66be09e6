#![allow(dead_code)]

use fifteen_puzzle::{Move, Partition, PatternDatabase, State};
use std::collections::{HashMap, VecDeque};
use std::sync::OnceLock;

pub fn pairs() -> Partition {
    Partition::new(vec![
        vec![1, 2],
        vec![3, 4],
        vec![5, 6],
        vec![7, 8],
        vec![9, 10],
        vec![11, 12],
        vec![13, 14],
        vec![15],
    ])
    .unwrap()
}

pub fn pairs_db() -> &'static PatternDatabase {
    static DB: OnceLock<PatternDatabase> = OnceLock::new();
    DB.get_or_init(|| PatternDatabase::build(&State::goal(), &pairs(), true).unwrap())
}

pub fn default_db() -> &'static PatternDatabase {
    static DB: OnceLock<PatternDatabase> = OnceLock::new();
    DB.get_or_init(|| PatternDatabase::build(&State::goal(), &Partition::default(), true).unwrap())
}

/// Exact distance to `goal` for every state within `depth` moves of it.
pub fn distances_within(goal: &State, depth: usize) -> HashMap<State, usize> {
    let mut seen = HashMap::new();
    let mut queue = VecDeque::new();
    seen.insert(*goal, 0);
    queue.push_back(*goal);
    while let Some(state) = queue.pop_front() {
        let d = seen[&state];
        if d == depth {
            continue;
        }
        for (_, next) in state.successors() {
            if !seen.contains_key(&next) {
                seen.insert(next, d + 1);
                queue.push_back(next);
            }
        }
    }
    seen
}

/// Board from sixteen hex digits in reading order, `0` for the blank.
pub fn from_hex(digits: &str) -> State {
    let mut values = [0u8; 16];
    for (cell, c) in values.iter_mut().zip(digits.chars()) {
        *cell = c.to_digit(16).unwrap() as u8;
    }
    State::from_values(values).unwrap()
}

pub fn replay(start: &State, moves: &[Move]) -> State {
    moves
        .iter()
        .fold(*start, |state, &m| state.apply(m).unwrap())
}
