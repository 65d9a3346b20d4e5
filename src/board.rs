use crate::dice::{Camel, Move};
use std::{collections::BTreeMap, fmt};

///////////
// Space //
///////////

/// A single occupied position on the track.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Space {
    /// A stack of camels. Index 0 is the bottom of the stack, the last
    /// element is on top.
    Camels(Vec<Camel>),
    /// A bump space: any camel landing here is shifted a further `delta`
    /// spaces, applied in the mover's direction of travel.
    Bump(i32),
}

impl Space {
    pub fn height(&self) -> usize {
        match self {
            Self::Camels(stack) => stack.len(),
            Self::Bump(_) => 1,
        }
    }
}

///////////
// Board //
///////////

/// The track: a sparse, index-addressed collection of spaces.
///
/// A board is mutated in place by [`Board::apply_move`]; callers replaying
/// hypothetical sequences must work on a [`Clone`] (stacks are owned, so a
/// clone shares nothing with the original). Emptied camel spaces are removed
/// from the map rather than kept around.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    spaces: BTreeMap<i32, Space>,
}

impl Board {
    /// Build a board from its spaces. Panics if two bump spaces sit on
    /// adjacent indices: resolving one bump must always land on an ordinary
    /// index, so such a track can never be consistent. Camel spaces must be
    /// non-empty.
    pub fn new(spaces: BTreeMap<i32, Space>) -> Self {
        let mut prev_bump: Option<i32> = None;
        for (&idx, space) in &spaces {
            match space {
                Space::Camels(stack) => {
                    assert!(!stack.is_empty(), "empty camel space at index {}", idx);
                }
                Space::Bump(delta) => {
                    assert!(
                        *delta == 1 || *delta == -1,
                        "bump delta must be +1 or -1, got {} at index {}",
                        delta,
                        idx
                    );
                    if let Some(prev) = prev_bump {
                        assert!(
                            idx - prev > 1,
                            "two adjacent bump spaces are not allowed: {} and {}",
                            prev,
                            idx
                        );
                    }
                    prev_bump = Some(idx);
                }
            }
        }
        Self { spaces }
    }

    /// The space index and stack position (bottom = 0) of a camel, or `None`
    /// if it is not on the board.
    fn find_camel(&self, camel: Camel) -> Option<(i32, usize)> {
        self.spaces.iter().find_map(|(&idx, space)| match space {
            Space::Camels(stack) => stack
                .iter()
                .position(|&other| other == camel)
                .map(|pos| (idx, pos)),
            Space::Bump(_) => None,
        })
    }

    /// The camels stacked above `camel` on its space, bottom-to-top. The
    /// first element (if any) sits directly on `camel`'s back.
    fn riders(&self, camel: Camel) -> &[Camel] {
        let (idx, pos) = self
            .find_camel(camel)
            .unwrap_or_else(|| panic!("no space found for {}", camel));
        match &self.spaces[&idx] {
            Space::Camels(stack) => &stack[pos + 1..],
            Space::Bump(_) => unreachable!(),
        }
    }

    /// Two rule exceptions for crazy camels:
    /// 1. If only one crazy camel is carrying racing camels on its back, that
    ///    one moves, whatever the die said.
    /// 2. If one crazy camel sits directly on top of the other (no racing
    ///    camel in between), the one on top moves. This overrides rule 1.
    fn resolve_crazy(&self, camel: Camel) -> Camel {
        let white_riders = self.riders(Camel::White);
        let black_riders = self.riders(Camel::Black);

        let mut resolved = camel;

        if !white_riders.is_empty() && black_riders.is_empty() {
            resolved = Camel::White;
        }
        if white_riders.is_empty() && !black_riders.is_empty() {
            resolved = Camel::Black;
        }

        if white_riders.first() == Some(&Camel::Black) {
            resolved = Camel::Black;
        }
        if black_riders.first() == Some(&Camel::White) {
            resolved = Camel::White;
        }

        resolved
    }

    /// Apply a single move, mutating the board.
    ///
    /// The moved camel and everything stacked above it travel together.
    /// Racing camels travel forward, crazy camels backward; a bump space at
    /// the destination shifts the landing by its delta in the direction of
    /// travel. For crazy moves, the camel named by the move is advisory: the
    /// board re-derives which crazy camel actually moves.
    ///
    /// Panics if the board is inconsistent: the camel is nowhere on the
    /// board, or bump resolution lands on another bump space.
    pub fn apply_move(&mut self, mv: Move) {
        let camel = if mv.camel.is_crazy() {
            self.resolve_crazy(mv.camel)
        } else {
            mv.camel
        };
        let dir: i32 = if camel.is_crazy() { -1 } else { 1 };

        let (src_idx, pos) = self
            .find_camel(camel)
            .unwrap_or_else(|| panic!("no camel found of color {}", camel));

        let (moved, emptied) = match self.spaces.get_mut(&src_idx) {
            Some(Space::Camels(stack)) => {
                let moved = stack.split_off(pos);
                (moved, stack.is_empty())
            }
            _ => unreachable!(),
        };
        if emptied {
            // all the camels have left this space and there's no need to
            // maintain it
            self.spaces.remove(&src_idx);
        }

        let mut dest_idx = src_idx + dir * (mv.spaces as i32);

        if let Some(&Space::Bump(delta)) = self.spaces.get(&dest_idx) {
            // adjust the destination in the direction of the bump
            dest_idx += dir * delta;
            assert!(
                !matches!(self.spaces.get(&dest_idx), Some(Space::Bump(_))),
                "two adjacent bump spaces are not allowed: landing at {}",
                dest_idx
            );
        }

        match self.spaces.get_mut(&dest_idx) {
            None => {
                // no space exists at the destination, add it
                self.spaces.insert(dest_idx, Space::Camels(moved));
            }
            Some(Space::Camels(stack)) => stack.extend(moved),
            Some(Space::Bump(_)) => panic!("unexpected bump space at index {}", dest_idx),
        }
    }

    /// The racing camels front-to-back: highest index first, top of stack
    /// first within a space. Crazy camels never appear in the order.
    pub fn race_order(&self) -> Vec<Camel> {
        self.spaces
            .iter()
            .rev()
            .filter_map(|(_, space)| match space {
                Space::Camels(stack) => {
                    Some(stack.iter().rev().copied().filter(|camel| !camel.is_crazy()))
                }
                Space::Bump(_) => None,
            })
            .flatten()
            .collect()
    }
}

impl fmt::Display for Board {
    /// Example:
    ///
    /// ```text
    ///       R  Y     P
    /// G     B  U  <  W
    /// 3  4  5  6  7  8
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.spaces.is_empty() {
            return Ok(());
        }

        let min_idx = *self.spaces.keys().next().unwrap();
        let max_idx = *self.spaces.keys().next_back().unwrap();
        let tallest = self.spaces.values().map(Space::height).max().unwrap();

        for level in (0..tallest).rev() {
            for idx in min_idx..=max_idx {
                match self.spaces.get(&idx) {
                    Some(Space::Camels(stack)) if level < stack.len() => {
                        write!(f, "{:<3}", stack[level].as_char())?
                    }
                    Some(&Space::Bump(delta)) if level == 0 => {
                        write!(f, "{:<3}", if delta < 0 { '<' } else { '>' })?
                    }
                    _ => write!(f, "   ")?,
                }
            }
            writeln!(f)?;
        }

        for idx in min_idx..=max_idx {
            write!(f, "{:<3}", idx)?;
        }

        Ok(())
    }
}

cfg_test! {
    /// Test-only strategies and fixtures, shared with the outcome tests.
    pub mod prop {
        use super::*;
        use crate::parse::Layout;
        use proptest::prelude::*;
        use std::str::FromStr;

        /// Parse a layout string straight into a board; panics on bad input,
        /// which is exactly what a test fixture should do.
        pub fn mk_board(s: &str) -> Board {
            Layout::from_str(s)
                .expect("bad test layout")
                .to_board()
                .expect("bad test board")
        }

        /// Boards with all seven camels grouped into random stacks at
        /// spread-out indices, optionally bracketed by a pair of far-apart
        /// bump spaces.
        pub fn arb_board() -> impl Strategy<Value = Board> {
            let camels = Just(Camel::all().to_vec()).prop_shuffle();
            let gaps = proptest::collection::vec(1..=3i32, 7);
            let splits = proptest::collection::vec(any::<bool>(), 6);
            let bumps = (any::<bool>(), any::<bool>(), any::<bool>());

            (camels, gaps, splits, bumps).prop_map(|(camels, gaps, splits, bumps)| {
                let mut spaces = BTreeMap::new();
                let mut idx = 1;
                let mut stack = vec![camels[0]];

                for (pos, &camel) in camels.iter().enumerate().skip(1) {
                    if splits[pos - 1] {
                        spaces.insert(idx, Space::Camels(stack));
                        idx += gaps[pos];
                        stack = Vec::new();
                    }
                    stack.push(camel);
                }
                spaces.insert(idx, Space::Camels(stack));

                let (bump_lo, bump_hi, bump_dir) = bumps;
                let delta = if bump_dir { 1 } else { -1 };
                if bump_lo {
                    spaces.insert(-3, Space::Bump(delta));
                }
                if bump_hi {
                    spaces.insert(idx + 4, Space::Bump(delta));
                }

                Board::new(spaces)
            })
        }

        /// Arbitrary move lists over the full camel set, magnitudes 1-3.
        pub fn arb_moves() -> impl Strategy<Value = Vec<Move>> {
            let mv = (proptest::sample::select(Camel::all().as_slice()), 1..=3u8)
                .prop_map(|(camel, spaces)| Move::new(camel, spaces));
            proptest::collection::vec(mv, 0..8)
        }
    }
}

///////////
// Tests //
///////////
