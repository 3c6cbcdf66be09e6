use rand::{seq::SliceRandom, Rng};
use std::fmt;

use crate::error::PuzzleError;

pub const SIDE: usize = 4;
pub const CELLS: usize = SIDE * SIDE;
pub const BLANK: u8 = 0;

/// A move of the blank. Up/Down shift it one row, Left moves it towards the
/// higher column index and Right towards the lower one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

impl Move {
    /// Fixed expansion order used by every search in the crate.
    pub const ALL: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];

    /// Blank displacement as `(row, column)`.
    pub fn as_offset(&self) -> (isize, isize) {
        match self {
            Move::Up => (-1, 0),
            Move::Down => (1, 0),
            Move::Left => (0, 1),
            Move::Right => (0, -1),
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Move::Up => Move::Down,
            Move::Down => Move::Up,
            Move::Left => Move::Right,
            Move::Right => Move::Left,
        }
    }

    fn index_delta(&self) -> isize {
        let (dr, dc) = self.as_offset();
        dr * SIDE as isize + dc
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            Move::Up => "Up",
            Move::Down => "Down",
            Move::Left => "Left",
            Move::Right => "Right",
        };
        write!(f, "{}", s)
    }
}

/// Renders a symbol value (0..=15) as its single-character form.
pub fn symbol_char(value: u8) -> char {
    char::from_digit(value as u32, 16)
        .map(|c| c.to_ascii_uppercase())
        .unwrap_or('?')
}

/// Accepts a single hex character (`0`-`9`, `A`-`F`, any case) or a decimal
/// number up to 15.
pub fn parse_symbol(token: &str) -> Option<u8> {
    let mut chars = token.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return c.to_digit(16).map(|d| d as u8);
    }
    token.parse::<u8>().ok().filter(|&v| (v as usize) < CELLS)
}

/// One immutable 4x4 configuration. Every constructed state holds each of the
/// sixteen symbols exactly once.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct State {
    layout: [u8; CELLS],
    blank: u8,
}

impl State {
    pub fn from_values(layout: [u8; CELLS]) -> Result<Self, PuzzleError> {
        let mut seen = [false; CELLS];
        for &value in &layout {
            let slot = seen.get_mut(value as usize).ok_or_else(|| {
                PuzzleError::MalformedBoard(format!("symbol {} is outside the alphabet", value))
            })?;
            if *slot {
                return Err(PuzzleError::MalformedBoard(format!(
                    "symbol {} appears more than once",
                    symbol_char(value)
                )));
            }
            *slot = true;
        }

        let blank = layout
            .iter()
            .position(|&v| v == BLANK)
            .ok_or_else(|| PuzzleError::MalformedBoard("no blank".to_string()))?;

        Ok(Self {
            layout,
            blank: blank as u8,
        })
    }

    pub fn from_grid(rows: &[[u8; SIDE]; SIDE]) -> Result<Self, PuzzleError> {
        let mut layout = [0; CELLS];
        for (i, row) in rows.iter().enumerate() {
            layout[i * SIDE..(i + 1) * SIDE].copy_from_slice(row);
        }
        Self::from_values(layout)
    }

    /// Reads four whitespace-separated rows of four symbols. Lines past the
    /// fourth non-empty one are ignored.
    pub fn parse(text: &str) -> Result<Self, PuzzleError> {
        let rows: Vec<&str> = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .take(SIDE)
            .collect();
        if rows.len() != SIDE {
            return Err(PuzzleError::MalformedBoard(format!(
                "expected {} rows, found {}",
                SIDE,
                rows.len()
            )));
        }

        let mut layout = [0; CELLS];
        for (i, row) in rows.iter().enumerate() {
            let tokens: Vec<&str> = row.split_whitespace().collect();
            if tokens.len() != SIDE {
                return Err(PuzzleError::MalformedBoard(format!(
                    "row {} has {} symbols",
                    i + 1,
                    tokens.len()
                )));
            }
            for (j, token) in tokens.iter().enumerate() {
                layout[i * SIDE + j] = parse_symbol(token).ok_or_else(|| {
                    PuzzleError::MalformedBoard(format!("unknown symbol {:?}", token))
                })?;
            }
        }

        Self::from_values(layout)
    }

    /// `0123 / 4567 / 89AB / CDEF`, blank in the top-left corner.
    pub fn goal() -> Self {
        let mut layout = [0; CELLS];
        for (i, cell) in layout.iter_mut().enumerate() {
            *cell = i as u8;
        }
        Self { layout, blank: 0 }
    }

    pub fn layout(&self) -> &[u8; CELLS] {
        &self.layout
    }

    pub fn blank_index(&self) -> usize {
        self.blank as usize
    }

    pub fn is_legal(&self, movement: Move) -> bool {
        let row = self.blank_index() / SIDE;
        let col = self.blank_index() % SIDE;
        match movement {
            Move::Up => row > 0,
            Move::Down => row < SIDE - 1,
            Move::Left => col < SIDE - 1,
            Move::Right => col > 0,
        }
    }

    pub fn legal_moves(&self) -> impl Iterator<Item = Move> + '_ {
        Move::ALL.into_iter().filter(move |&m| self.is_legal(m))
    }

    pub fn apply(&self, movement: Move) -> Result<Self, PuzzleError> {
        if !self.is_legal(movement) {
            return Err(PuzzleError::IllegalMove {
                mv: movement,
                blank: self.blank_index(),
            });
        }
        Ok(self.swap_blank(movement))
    }

    /// Every legal successor in `Move::ALL` order.
    pub fn successors(&self) -> impl Iterator<Item = (Move, State)> + '_ {
        self.legal_moves().map(move |m| (m, self.swap_blank(m)))
    }

    fn swap_blank(&self, movement: Move) -> Self {
        let from = self.blank_index();
        let to = (from as isize + movement.index_delta()) as usize;
        let mut layout = self.layout;
        layout.swap(from, to);
        Self {
            layout,
            blank: to as u8,
        }
    }

    /// True when `goal` can be reached: the permutation taking this layout to
    /// the goal must have the same parity as the blank's taxicab displacement.
    pub fn is_solvable_to(&self, goal: &State) -> bool {
        let mut goal_index = [0u8; CELLS];
        for (i, &v) in goal.layout.iter().enumerate() {
            goal_index[v as usize] = i as u8;
        }
        let relabeled: Vec<u8> = self.layout.iter().map(|&v| goal_index[v as usize]).collect();

        let inversions = Self::count_inversions(&relabeled);
        let (r0, c0) = (self.blank_index() / SIDE, self.blank_index() % SIDE);
        let (r1, c1) = (goal.blank_index() / SIDE, goal.blank_index() % SIDE);
        let blank_distance = r0.abs_diff(r1) + c0.abs_diff(c1);

        inversions % 2 == blank_distance % 2
    }

    fn count_inversions(flattened: &[u8]) -> usize {
        flattened
            .iter()
            .enumerate()
            .map(|(i, &val)| flattened[i + 1..].iter().filter(|&&next| next < val).count())
            .sum()
    }

    /// Random walk of `moves` legal steps that never immediately undoes the
    /// previous one. The result is always solvable back to `self`.
    pub fn scrambled<R: Rng + ?Sized>(&self, moves: usize, rng: &mut R) -> Self {
        let mut current = *self;
        let mut last: Option<Move> = None;
        for _ in 0..moves {
            let options: Vec<Move> = current
                .legal_moves()
                .filter(|m| last.map_or(true, |l| *m != l.opposite()))
                .collect();
            if let Some(&m) = options.choose(rng) {
                current = current.swap_blank(m);
                last = Some(m);
            }
        }
        current
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.layout.chunks(SIDE) {
            let line: Vec<String> = row.iter().map(|&v| symbol_char(v).to_string()).collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: String = self.layout.iter().map(|&v| symbol_char(v)).collect();
        write!(f, "State({})", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn is_permutation(state: &State) -> bool {
        let mut sorted = *state.layout();
        sorted.sort_unstable();
        sorted.iter().enumerate().all(|(i, &v)| v as usize == i)
            && state.layout()[state.blank_index()] == BLANK
    }

    #[test]
    fn rejects_duplicates_and_out_of_range() {
        let mut layout = *State::goal().layout();
        layout[5] = 4;
        assert!(matches!(
            State::from_values(layout),
            Err(PuzzleError::MalformedBoard(_))
        ));

        let mut layout = *State::goal().layout();
        layout[3] = 16;
        assert!(matches!(
            State::from_values(layout),
            Err(PuzzleError::MalformedBoard(_))
        ));
    }

    #[test]
    fn parses_hex_and_decimal_tokens() {
        let hex = State::parse("0 1 2 3\n4 5 6 7\n8 9 A B\nc d e f\n").unwrap();
        let dec = State::from_grid(&[[0, 1, 2, 3], [4, 5, 6, 7], [8, 9, 10, 11], [12, 13, 14, 15]])
            .unwrap();
        let mixed = State::parse("0 1 2 3\n4 5 6 7\n8 9 10 11\n12 13 14 15\ntrailing").unwrap();
        assert_eq!(hex, State::goal());
        assert_eq!(dec, State::goal());
        assert_eq!(mixed, State::goal());
        assert!(State::parse("0 1 2 3\n4 5 6 7\n8 9 A B").is_err());
        assert!(State::parse("0 1 2 3\n4 5 6 7\n8 9 A B\nC D E G").is_err());
    }

    #[test]
    fn legal_moves_follow_blank_edges() {
        let goal = State::goal();
        let moves: Vec<Move> = goal.legal_moves().collect();
        assert_eq!(moves, vec![Move::Down, Move::Left]);

        let corner = State::parse("1 2 3 4\n5 6 7 8\n9 A B C\nD E F 0").unwrap();
        let moves: Vec<Move> = corner.legal_moves().collect();
        assert_eq!(moves, vec![Move::Up, Move::Right]);
    }

    #[test]
    fn apply_swaps_blank_with_neighbour() {
        let goal = State::goal();
        let down = goal.apply(Move::Down).unwrap();
        assert_eq!(down.blank_index(), 4);
        assert_eq!(down.layout()[0], 4);

        let left = goal.apply(Move::Left).unwrap();
        assert_eq!(left.blank_index(), 1);
        assert_eq!(left.layout()[0], 1);

        assert!(matches!(
            goal.apply(Move::Up),
            Err(PuzzleError::IllegalMove { mv: Move::Up, blank: 0 })
        ));
    }

    #[test]
    fn moves_are_invertible_along_a_walk() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut state = State::goal();
        for _ in 0..500 {
            for m in state.legal_moves().collect::<Vec<_>>() {
                let next = state.apply(m).unwrap();
                assert!(is_permutation(&next));
                assert_eq!(next.apply(m.opposite()).unwrap(), state);
            }
            state = state.scrambled(1, &mut rng);
        }
    }

    #[test]
    fn parity_matches_reachability() {
        let mut rng = StdRng::seed_from_u64(11);
        let goal = State::goal();
        for n in 0..40 {
            let s = goal.scrambled(n, &mut rng);
            assert!(s.is_solvable_to(&goal));
            assert!(goal.is_solvable_to(&s));
        }

        let mut swapped = *goal.layout();
        swapped.swap(14, 15);
        let odd = State::from_values(swapped).unwrap();
        assert!(!odd.is_solvable_to(&goal));
    }

    #[test]
    fn display_uses_hex_symbols() {
        assert_eq!(
            State::goal().to_string(),
            "0 1 2 3\n4 5 6 7\n8 9 A B\nC D E F\n"
        );
        assert_eq!(Move::Left.to_string(), "Left");
    }
}
