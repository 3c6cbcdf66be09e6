use std::fmt;

use crate::error::PuzzleError;
use crate::puzzle::{symbol_char, State, BLANK, CELLS};

/// Placeholder for every cell outside the active group.
pub const WILDCARD: u8 = u8::MAX;

/// Every board index (the blank's included) is packed into a nibble, so a
/// group's key has to fit in a `u32`.
pub const MAX_GROUP_SIZE: usize = 7;

/// A board with every cell outside one tile group replaced by [`WILDCARD`].
/// The blank is always kept: it decides which moves are possible.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaskedKey([u8; CELLS]);

impl MaskedKey {
    pub fn cells(&self) -> &[u8; CELLS] {
        &self.0
    }

    pub fn blank_index(&self) -> Option<usize> {
        self.0.iter().position(|&v| v == BLANK)
    }

    pub(crate) fn swapped(&self, a: usize, b: usize) -> Self {
        let mut cells = self.0;
        cells.swap(a, b);
        Self(cells)
    }
}

impl fmt::Display for MaskedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: String = self
            .0
            .iter()
            .map(|&v| if v == WILDCARD { '*' } else { symbol_char(v) })
            .collect();
        write!(f, "{}", s)
    }
}

impl fmt::Debug for MaskedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MaskedKey({})", self)
    }
}

/// A set of tiles whose moves are counted together. `labels` is the blank
/// followed by the tiles in ascending order, which is also the nibble order
/// of a packed key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternGroup {
    labels: Vec<u8>,
    keep: u16,
}

impl PatternGroup {
    fn new(mut tiles: Vec<u8>) -> Self {
        tiles.sort_unstable();
        let mut labels = Vec::with_capacity(tiles.len() + 1);
        labels.push(BLANK);
        labels.extend(tiles);
        let keep = labels.iter().fold(0u16, |mask, &t| mask | 1 << t);
        Self { labels, keep }
    }

    pub fn tiles(&self) -> &[u8] {
        &self.labels[1..]
    }

    /// Number of tiles, not counting the blank.
    pub fn len(&self) -> usize {
        self.labels.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn contains(&self, symbol: u8) -> bool {
        symbol < CELLS as u8 && self.keep >> symbol & 1 == 1
    }

    pub fn project(&self, state: &State) -> MaskedKey {
        self.project_cells(state.layout())
    }

    /// Masks a raw layout; cells already holding [`WILDCARD`] stay masked.
    pub fn project_cells(&self, cells: &[u8; CELLS]) -> MaskedKey {
        let mut key = [WILDCARD; CELLS];
        for (slot, &v) in key.iter_mut().zip(cells.iter()) {
            if self.contains(v) {
                *slot = v;
            }
        }
        MaskedKey(key)
    }

    /// Number of distinct keys: placements of the k tiles and the blank,
    /// `16!/(15-k)!`.
    pub fn entry_count(&self) -> usize {
        (CELLS - self.labels.len() + 1..=CELLS).product()
    }

    /// Nibbles packed into a key: one per tile plus the blank.
    pub fn nibbles(&self) -> usize {
        self.labels.len()
    }

    /// Board index of the blank and then every tile, one nibble each, blank
    /// most significant.
    pub fn pack(&self, key: &MaskedKey) -> Option<u32> {
        let mut positions = [None; MAX_GROUP_SIZE + 1];
        for (index, &v) in key.cells().iter().enumerate() {
            if v == WILDCARD {
                continue;
            }
            let rank = self.labels.binary_search(&v).ok()?;
            positions[rank] = Some(index as u32);
        }
        let mut packed = 0u32;
        for slot in positions.iter().take(self.nibbles()) {
            packed = packed << 4 | (*slot)?;
        }
        Some(packed)
    }

    /// Inverse of [`PatternGroup::pack`]. Fails when two labels share a cell
    /// or bits above the group's nibbles are set.
    pub fn unpack(&self, packed: u32) -> Option<MaskedKey> {
        let bits = 4 * self.nibbles();
        if bits < 32 && packed >> bits != 0 {
            return None;
        }
        let mut key = [WILDCARD; CELLS];
        for (i, &label) in self.labels.iter().enumerate() {
            let shift = 4 * (self.nibbles() - 1 - i);
            let index = (packed >> shift & 0xF) as usize;
            if key[index] != WILDCARD {
                return None;
            }
            key[index] = label;
        }
        Some(MaskedKey(key))
    }
}

impl fmt::Display for PatternGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: String = self.tiles().iter().map(|&t| symbol_char(t)).collect();
        write!(f, "{}", s)
    }
}

/// Disjoint tile groups covering every non-blank tile exactly once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Partition {
    groups: Vec<PatternGroup>,
}

impl Partition {
    pub fn new(groups: Vec<Vec<u8>>) -> Result<Self, PuzzleError> {
        let mut seen = 0u16;
        for group in &groups {
            if group.is_empty() {
                return Err(PuzzleError::InvalidPartition("empty group".to_string()));
            }
            if group.len() > MAX_GROUP_SIZE {
                return Err(PuzzleError::InvalidPartition(format!(
                    "group of {} tiles exceeds {}",
                    group.len(),
                    MAX_GROUP_SIZE
                )));
            }
            for &tile in group {
                if tile == BLANK || tile as usize >= CELLS {
                    return Err(PuzzleError::InvalidPartition(format!(
                        "{} is not a tile",
                        tile
                    )));
                }
                if seen >> tile & 1 == 1 {
                    return Err(PuzzleError::InvalidPartition(format!(
                        "tile {} is in more than one group",
                        symbol_char(tile)
                    )));
                }
                seen |= 1 << tile;
            }
        }
        if seen != 0xFFFE {
            return Err(PuzzleError::InvalidPartition(format!(
                "groups cover {} of 15 tiles",
                seen.count_ones()
            )));
        }

        Ok(Self {
            groups: groups.into_iter().map(PatternGroup::new).collect(),
        })
    }

    pub fn groups(&self) -> &[PatternGroup] {
        &self.groups
    }
}

impl Default for Partition {
    /// `1234 / 5678 / 9ABC / DEF`.
    fn default() -> Self {
        Self {
            groups: vec![
                PatternGroup::new(vec![1, 2, 3, 4]),
                PatternGroup::new(vec![5, 6, 7, 8]),
                PatternGroup::new(vec![9, 10, 11, 12]),
                PatternGroup::new(vec![13, 14, 15]),
            ],
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.groups.iter().map(|g| g.to_string()).collect();
        write!(f, "{}", names.join("/"))
    }
}
