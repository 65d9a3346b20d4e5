use crate::{
    board::{Board, Space},
    dice::Camel,
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, str::FromStr};

///////////////////
// parse::Layout //
///////////////////

/// A human-readable board layout: a list of `index:token` entries, where a
/// token is `<` (bump backward), `>` (bump forward), or a string of camel
/// characters listed top-to-bottom.
///
/// ```text
/// Legend
/// G: Green    P: Purple   R: Red   U: Blue   Y: Yellow
/// B: Black    W: White
/// >: Bump Forward    <: Bump Backward
/// ```
///
/// For example `[1:rg,3:<,5:w]` puts Red on Green's back at 1, a backward
/// bump at 3 and White at 5.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout(Vec<(i32, String)>);

impl Layout {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Build the board. Malformed tokens and duplicate indices are parse
    /// errors; a layout with adjacent bump spaces can never be made
    /// consistent and panics in the board constructor instead.
    pub fn to_board(&self) -> Result<Board, String> {
        let mut spaces = BTreeMap::new();

        for (idx, token) in &self.0 {
            let space = parse_space(token)?;
            if spaces.insert(*idx, space).is_some() {
                return Err(format!("duplicate space index: {}", idx));
            }
        }

        Ok(Board::new(spaces))
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_space(token: &str) -> Result<Space, String> {
    match token {
        "<" => Ok(Space::Bump(-1)),
        ">" => Ok(Space::Bump(1)),
        "" => Err("empty space token".to_string()),
        _ => {
            // camels are listed top-to-bottom; stacks are stored
            // bottom-to-top
            let mut stack = token
                .chars()
                .map(|c| {
                    Camel::from_char(c)
                        .ok_or_else(|| format!("unrecognized camel character: '{}'", c))
                })
                .collect::<Result<Vec<_>, _>>()?;
            stack.reverse();
            Ok(Space::Camels(stack))
        }
    }
}

impl FromStr for Layout {
    type Err = String;

    // [1:y,2:p,3:g,4:u,5:r,6:w,7:b,8:<,9:>]

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim_start_matches('[');
        let s = s.trim_end_matches(']');

        let splitters = &[',', ' ', '\n', '\t'];

        let mut entries = Vec::new();
        for entry_str in s.split(splitters).filter(|s| !s.is_empty()) {
            match entry_str.split_once(':') {
                Some((idx_str, token)) => {
                    let idx = idx_str.parse::<i32>().map_err(|err| {
                        format!("invalid space index: '{}', error: {}", idx_str, err)
                    })?;

                    if token.is_empty() {
                        return Err(format!("empty space token at index {}", idx));
                    }

                    entries.push((idx, token.to_string()));
                }
                None => {
                    return Err(format!(
                        "invalid space entry '{}': expected format '<index>:<stack>'",
                        entry_str
                    ))
                }
            }
        }

        Ok(Self(entries))
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use itertools::Itertools;
        let pieces = self
            .0
            .iter()
            .map(|(idx, token)| format!("{}:{}", idx, token))
            .join(",");
        write!(f, "[{}]", pieces)
    }
}

///////////
// Tests //
///////////

#[cfg(test)]
mod test {
    use super::*;
    use crate::dice::Camel::*;
    use claim::assert_err;

    #[test]
    fn test_layout_from_str() {
        assert_eq!(Layout::new(), Layout::from_str("").unwrap());
        assert_eq!(Layout::new(), Layout::from_str("[]").unwrap());

        let layout = Layout::from_str("[1:rg, 3:<,9:>]").unwrap();
        assert_eq!("[1:rg,3:<,9:>]", layout.to_string());

        assert_err!(Layout::from_str("[1]"));
        assert_err!(Layout::from_str("[1:]"));
        assert_err!(Layout::from_str("[x:r]"));
    }

    #[test]
    fn test_to_board_builds_stacks_top_down() {
        let board = Layout::from_str("[2:rgu,5:y]").unwrap().to_board().unwrap();
        // Red was listed first, so it is on top
        assert_eq!(vec![Yellow, Red, Green, Blue], board.race_order());
    }

    #[test]
    fn test_to_board_rejects_bad_input() {
        // unrecognized camel character
        assert_err!(Layout::from_str("[1:rx]").unwrap().to_board());
        // bump marker mixed into a stack reads as an unknown camel
        assert_err!(Layout::from_str("[1:r<]").unwrap().to_board());
        // duplicate index
        assert_err!(Layout::from_str("[1:r,1:g]").unwrap().to_board());
    }

    #[test]
    fn test_case_insensitive_camels() {
        let lower = Layout::from_str("[1:rg,2:w]").unwrap().to_board().unwrap();
        let upper = Layout::from_str("[1:RG,2:W]").unwrap().to_board().unwrap();
        assert_eq!(lower, upper);
    }

    #[test]
    #[should_panic(expected = "adjacent bump spaces")]
    fn test_adjacent_bumps_are_fatal() {
        let _ = Layout::from_str("[1:r,4:>,5:<]").unwrap().to_board();
    }

    #[test]
    fn test_negative_indices() {
        let board = Layout::from_str("[-2:r,0:g]").unwrap().to_board().unwrap();
        assert_eq!(vec![Green, Red], board.race_order());
    }
}
