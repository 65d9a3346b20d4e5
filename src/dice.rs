use serde::{Deserialize, Serialize};
use std::fmt;

///////////
// Camel //
///////////

/// One of the seven camels in the game.
///
/// The first five are the racing camels; they run forward and are the only
/// camels that receive a finishing rank. `White` and `Black` are the crazy
/// camels: they run *backward*, never rank, and give rides to any racing
/// camels stacked on top of them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Camel {
    Red,
    Yellow,
    Blue,
    Green,
    Purple,
    White,
    Black,
}

impl Camel {
    pub const fn all() -> &'static [Camel; 7] {
        &[
            Self::Red,
            Self::Yellow,
            Self::Blue,
            Self::Green,
            Self::Purple,
            Self::White,
            Self::Black,
        ]
    }

    pub const fn racing() -> &'static [Camel; 5] {
        &[
            Self::Red,
            Self::Yellow,
            Self::Blue,
            Self::Green,
            Self::Purple,
        ]
    }

    #[inline]
    pub fn is_crazy(self) -> bool {
        matches!(self, Self::White | Self::Black)
    }

    /// The single-character form used in board layouts. Note the blue camel
    /// is `u`, since `b` is taken by black.
    pub fn from_char(c: char) -> Option<Self> {
        let camel = match c.to_ascii_lowercase() {
            'r' => Self::Red,
            'y' => Self::Yellow,
            'u' => Self::Blue,
            'g' => Self::Green,
            'p' => Self::Purple,
            'w' => Self::White,
            'b' => Self::Black,
            _ => return None,
        };
        Some(camel)
    }

    pub fn as_char(self) -> char {
        match self {
            Self::Red => 'R',
            Self::Yellow => 'Y',
            Self::Blue => 'U',
            Self::Green => 'G',
            Self::Purple => 'P',
            Self::White => 'W',
            Self::Black => 'B',
        }
    }

    pub fn as_human_readable(self) -> &'static str {
        match self {
            Self::Red => "Red",
            Self::Yellow => "Yellow",
            Self::Blue => "Blue",
            Self::Green => "Green",
            Self::Purple => "Purple",
            Self::White => "White",
            Self::Black => "Black",
        }
    }

    /// The label of the die a face belongs to. Both crazy camels share the
    /// single crazy die.
    pub fn die_label(self) -> &'static str {
        match self {
            Self::White | Self::Black => "Crazy",
            _ => self.as_human_readable(),
        }
    }
}

impl fmt::Display for Camel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_human_readable())
    }
}

//////////
// Move //
//////////

/// A camel and how far it travels. Racing camels move `+spaces`, crazy camels
/// move `-spaces`; the direction is a rule of the game, not part of the move.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub camel: Camel,
    pub spaces: u8,
}

impl Move {
    #[inline]
    pub const fn new(camel: Camel, spaces: u8) -> Self {
        Self { camel, spaces }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.camel.die_label(), self.spaces)
    }
}

//////////
// Side //
//////////

/// One die face outcome and the number of physical faces showing it. The
/// count is a combinatorial weight: it must be multiplied through every
/// tally, never treated as 1.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Side {
    pub mv: Move,
    pub count: u32,
}

impl Side {
    #[inline]
    pub const fn new(mv: Move, count: u32) -> Self {
        Self { mv, count }
    }
}

/////////
// Die //
/////////

/// An identified die: a weighted multiset of move outcomes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Die {
    pub id: char,
    pub sides: Vec<Side>,
}

impl Die {
    pub fn new(id: char, sides: Vec<Side>) -> Self {
        Self { id, sides }
    }

    fn racing(id: char, camel: Camel) -> Self {
        Self::new(
            id,
            (1..=3).map(|n| Side::new(Move::new(camel, n), 2)).collect(),
        )
    }

    /// The number of physical faces, i.e. the sum of all side counts.
    pub fn num_faces(&self) -> u32 {
        self.sides.iter().map(|side| side.count).sum()
    }

    pub fn label(&self) -> &'static str {
        self.sides[0].mv.camel.die_label()
    }

    /// The standard dice: one per racing camel (faces 1-3, each on two
    /// physical faces) and the crazy die (Black 1-3 and White 1-3, one face
    /// each).
    pub fn base_dice() -> Vec<Die> {
        vec![
            Self::racing('r', Camel::Red),
            Self::racing('g', Camel::Green),
            Self::racing('u', Camel::Blue),
            Self::racing('y', Camel::Yellow),
            Self::racing('p', Camel::Purple),
            Self::new(
                'c',
                vec![
                    Side::new(Move::new(Camel::Black, 1), 1),
                    Side::new(Move::new(Camel::Black, 2), 1),
                    Side::new(Move::new(Camel::Black, 3), 1),
                    Side::new(Move::new(Camel::White, 1), 1),
                    Side::new(Move::new(Camel::White, 2), 1),
                    Side::new(Move::new(Camel::White, 3), 1),
                ],
            ),
        ]
    }

    /// The standard dice minus those whose id appears in `ids`
    /// (case-insensitive).
    pub fn base_dice_without(ids: &str) -> Vec<Die> {
        Self::base_dice()
            .into_iter()
            .filter(|die| !ids_contain(ids, die.id))
            .collect()
    }

    /// The standard dice restricted to those whose id appears in `ids`
    /// (case-insensitive).
    pub fn base_dice_with_only(ids: &str) -> Vec<Die> {
        Self::base_dice()
            .into_iter()
            .filter(|die| ids_contain(ids, die.id))
            .collect()
    }

    /// Check that every character in `ids` names a standard die.
    pub fn validate_ids(ids: &str) -> Result<(), String> {
        let known = Self::base_dice();
        for c in ids.chars() {
            if !known.iter().any(|die| die.id == c.to_ascii_lowercase()) {
                return Err(format!("unrecognized die id: '{}'", c));
            }
        }
        Ok(())
    }
}

fn ids_contain(ids: &str, id: char) -> bool {
    ids.chars().any(|c| c.to_ascii_lowercase() == id)
}

impl fmt::Display for Die {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

///////////
// Tests //
///////////

#[cfg(test)]
mod test {
    use super::*;
    use claim::assert_err;

    #[test]
    fn test_camel_char_round_trip() {
        for &camel in Camel::all() {
            assert_eq!(Some(camel), Camel::from_char(camel.as_char()));
            assert_eq!(
                Some(camel),
                Camel::from_char(camel.as_char().to_ascii_lowercase())
            );
        }
        assert_eq!(None, Camel::from_char('x'));
        assert_eq!(None, Camel::from_char('<'));
    }

    #[test]
    fn test_crazy_camels() {
        assert!(Camel::White.is_crazy());
        assert!(Camel::Black.is_crazy());
        for &camel in Camel::racing() {
            assert!(!camel.is_crazy());
        }
        assert_eq!("Crazy", Camel::White.die_label());
        assert_eq!("Crazy", Camel::Black.die_label());
        assert_eq!("Red", Camel::Red.die_label());
    }

    #[test]
    fn test_base_dice() {
        let dice = Die::base_dice();
        assert_eq!(6, dice.len());

        // every standard die has six physical faces
        for die in &dice {
            assert_eq!(6, die.num_faces());
        }

        // the crazy die splits its faces evenly between the two crazy camels
        let crazy = dice.iter().find(|die| die.id == 'c').unwrap();
        assert_eq!(6, crazy.sides.len());
        assert!(crazy.sides.iter().all(|side| side.mv.camel.is_crazy()));
        assert!(crazy.sides.iter().all(|side| side.count == 1));

        // racing dice roll only their own camel
        let red = dice.iter().find(|die| die.id == 'r').unwrap();
        assert!(red.sides.iter().all(|side| side.mv.camel == Camel::Red));
        assert!(red.sides.iter().all(|side| side.count == 2));
    }

    #[test]
    fn test_base_dice_filters() {
        assert_eq!(4, Die::base_dice_without("gp").len());
        assert_eq!(4, Die::base_dice_without("GP").len());
        assert_eq!(2, Die::base_dice_with_only("rc").len());
        assert_eq!(2, Die::base_dice_with_only("Rc").len());
        assert_eq!(0, Die::base_dice_with_only("").len());
        assert_eq!(6, Die::base_dice_without("").len());

        // the two filters partition the catalogue
        let without = Die::base_dice_without("ruc");
        let with_only = Die::base_dice_with_only("ruc");
        assert_eq!(6, without.len() + with_only.len());
    }

    #[test]
    fn test_validate_ids() {
        assert_eq!(Ok(()), Die::validate_ids(""));
        assert_eq!(Ok(()), Die::validate_ids("rgc"));
        assert_eq!(Ok(()), Die::validate_ids("RGC"));
        assert_err!(Die::validate_ids("rx"));
        assert_err!(Die::validate_ids("w"));
    }
}
