use log::{debug, info};
use rayon::prelude::*;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::time::Instant;
use thousands::Separable;

use crate::error::PuzzleError;
use crate::pattern::{MaskedKey, Partition, PatternGroup, WILDCARD};
use crate::puzzle::{Move, State, SIDE};

/// Abstract distances for every placement of one group's tiles and the blank.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternTable {
    group: PatternGroup,
    costs: HashMap<MaskedKey, u8>,
}

impl PatternTable {
    pub(crate) fn new(group: PatternGroup, costs: HashMap<MaskedKey, u8>) -> Self {
        Self { group, costs }
    }

    pub fn group(&self) -> &PatternGroup {
        &self.group
    }

    pub fn get(&self, key: &MaskedKey) -> Option<u8> {
        self.costs.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.costs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MaskedKey, u8)> {
        self.costs.iter().map(|(k, &c)| (k, c))
    }

    pub fn max_cost(&self) -> u8 {
        self.costs.values().copied().max().unwrap_or(0)
    }
}

/// One table per group of a partition, all measured against the same goal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternDatabase {
    goal: State,
    partition: Partition,
    tables: Vec<PatternTable>,
}

impl PatternDatabase {
    pub(crate) fn from_tables(goal: State, partition: Partition, tables: Vec<PatternTable>) -> Self {
        Self {
            goal,
            partition,
            tables,
        }
    }

    /// Runs the reverse search for every group. With `parallel` set the groups
    /// are built on the rayon pool; the tables come back in group order either way.
    pub fn build(goal: &State, partition: &Partition, parallel: bool) -> Result<Self, PuzzleError> {
        let stopwatch = Instant::now();
        info!(
            "Building pattern database for partition {} ({})",
            partition,
            if parallel { "parallel" } else { "sequential" }
        );

        let groups = partition.groups();
        let tables = if parallel {
            groups
                .par_iter()
                .enumerate()
                .map(|(index, group)| build_group(goal, group, index))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            groups
                .iter()
                .enumerate()
                .map(|(index, group)| build_group(goal, group, index))
                .collect::<Result<Vec<_>, _>>()?
        };

        let entries: usize = tables.iter().map(PatternTable::len).sum();
        info!(
            "Built {} entries in {:.2?}",
            entries.separate_with_commas(),
            stopwatch.elapsed()
        );

        Ok(Self::from_tables(*goal, partition.clone(), tables))
    }

    pub fn goal(&self) -> &State {
        &self.goal
    }

    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    pub fn tables(&self) -> &[PatternTable] {
        &self.tables
    }
}

/// Reverse search from the goal's projection over masked keys, each holding
/// the group's tiles and the blank.
///
/// Moving the blank onto a wildcard cell is free; displacing a group tile
/// costs one. The frontier is a min-heap keyed by `(cost, insertion order)`
/// and a key is settled, with its table cost, the first time it is popped.
/// A free edge joins keys of equal cost, so one real move changes the sum
/// over all groups by at most one.
pub fn build_group(goal: &State, group: &PatternGroup, index: usize) -> Result<PatternTable, PuzzleError> {
    let mut frontier = BinaryHeap::new();
    let mut costs: HashMap<MaskedKey, u8> = HashMap::with_capacity(group.entry_count());
    let mut seq: u64 = 0;
    let mut layer = 0u8;

    frontier.push(Reverse((0u8, seq, group.project(goal), goal.blank_index() as u8)));

    while let Some(Reverse((cost, _, key, blank))) = frontier.pop() {
        if costs.contains_key(&key) {
            continue;
        }
        if cost > layer {
            debug!(
                "group {} ({}): layer {} reached, {} keys settled",
                index,
                group,
                cost,
                costs.len().separate_with_commas()
            );
            layer = cost;
        }
        costs.insert(key, cost);

        let blank = blank as usize;
        for movement in Move::ALL {
            let Some(target) = neighbour(blank, movement) else {
                continue;
            };
            let next = key.swapped(blank, target);
            if costs.contains_key(&next) {
                continue;
            }
            let step = if key.cells()[target] == WILDCARD { 0 } else { 1 };
            seq += 1;
            frontier.push(Reverse((cost + step, seq, next, target as u8)));
        }
    }

    let expected = group.entry_count();
    debug!(
        "group {} ({}): {} keys, max cost {}",
        index,
        group,
        costs.len().separate_with_commas(),
        layer
    );
    if costs.len() != expected {
        return Err(PuzzleError::BuildInvariant {
            group: index,
            expected,
            found: costs.len(),
        });
    }

    Ok(PatternTable::new(group.clone(), costs))
}

fn neighbour(blank: usize, movement: Move) -> Option<usize> {
    let (dr, dc) = movement.as_offset();
    let row = (blank / SIDE) as isize + dr;
    let col = (blank % SIDE) as isize + dc;
    if (0..SIDE as isize).contains(&row) && (0..SIDE as isize).contains(&col) {
        Some(row as usize * SIDE + col as usize)
    } else {
        None
    }
}
