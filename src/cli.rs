use crate::{
    board::Board,
    dice::Die,
    num_arrangements,
    outcomes::{self, RankTable},
    parse, permute, DEFAULT_IGNORED_DICE,
};
use itertools::Itertools;
use pico_args;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr, time::Instant};
use tabular::{row, Table};

///////////////////////////
// String parser helpers //
///////////////////////////

fn parse_req<T>(label: &'static str, s: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    T::from_str(s).map_err(|err| format!("invalid {label}: {err}"))
}

fn parse_opt<T>(label: &'static str, opt_s: Option<&str>) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    opt_s
        .map(T::from_str)
        .transpose()
        .map_err(|err| format!("invalid {label}: {err}"))
}

//////////////////////
// CLI Args Wrapper //
//////////////////////

pub struct Args(pico_args::Arguments);

impl Args {
    pub fn new(inner: pico_args::Arguments) -> Self {
        Self(inner)
    }

    fn subcommand(&mut self) -> Result<Option<String>, String> {
        self.0.subcommand().map_err(|err| err.to_string())
    }

    fn opt_value(&mut self, keys: impl Into<pico_args::Keys>) -> Result<Option<String>, String> {
        self.0
            .opt_value_from_fn(keys, |s| Result::<_, pico_args::Error>::Ok(s.to_owned()))
            .map_err(|err| err.to_string())
    }

    fn free_value(&mut self) -> Result<String, String> {
        self.0
            .free_from_fn(|s| Result::<_, pico_args::Error>::Ok(s.to_owned()))
            .map_err(|err| err.to_string())
    }

    fn expect_finished(self) -> Result<(), String> {
        let remaining = self.0.finish();
        if !remaining.is_empty() {
            Err(format!("unexpected arguments left: '{:?}'", remaining))
        } else {
            Ok(())
        }
    }

    fn maybe_help(&mut self, usage: &str) {
        if self.0.contains(["-h", "--help"]) {
            print!("{}", usage);
            std::process::exit(0);
        }
    }
}

/////////////
// Metrics //
/////////////

#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct Metrics(pub Vec<(String, String)>);

impl Metrics {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, label: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.0.push((label.into(), value.into()));
        self
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new("{:>}  {:<}");

        for (label, value) in &self.0 {
            table.add_row(row!(label, value));
        }

        table
    }
}

///////////////////
// Command trait //
///////////////////

pub trait Command: Sized {
    const USAGE: &'static str;

    type Output: fmt::Display;

    fn try_from_cli_args(args: Args) -> Result<Self, String>;
    fn run(self) -> Result<Self::Output, String>;
}

/////////////////////
// ListDiceCommand //
/////////////////////

#[derive(Clone, Debug)]
pub struct ListDiceCommand;

impl Command for ListDiceCommand {
    const USAGE: &'static str = "\
camelodds list-dice - list the standard dice, their ids and their faces

USAGE:
    camelodds list-dice
";

    type Output = Table;

    fn try_from_cli_args(mut args: Args) -> Result<Self, String> {
        args.maybe_help(Self::USAGE);

        args.expect_finished()?;
        Ok(Self)
    }

    fn run(self) -> Result<Self::Output, String> {
        let mut table =
            Table::new("  {:>}  {:<}  {:<}").with_row(row!("id", "die", "faces"));

        for die in Die::base_dice() {
            let faces = die
                .sides
                .iter()
                .flat_map(|side| {
                    std::iter::repeat(format!(
                        "{}{}",
                        side.mv.camel.as_char(),
                        side.mv.spaces
                    ))
                    .take(side.count as usize)
                })
                .join(" ");
            table.add_row(row!(die.id, die.label(), faces));
        }

        Ok(table)
    }
}

/////////////////
// OddsCommand //
/////////////////

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OddsCommand {
    layout: parse::Layout,
    without: Option<String>,
    only: Option<String>,
    ignore_last: usize,
}

impl OddsCommand {
    pub fn try_from_str_args(
        without: Option<&str>,
        only: Option<&str>,
        ignore_last: Option<&str>,
        layout: &str,
    ) -> Result<Self, String> {
        let cmd = Self {
            layout: parse_req("board layout", layout)?,
            without: without.map(str::to_owned),
            only: only.map(str::to_owned),
            ignore_last: parse_opt("ignore-last count", ignore_last)?
                .unwrap_or(DEFAULT_IGNORED_DICE),
        };

        if cmd.without.is_some() && cmd.only.is_some() {
            return Err("--without and --only are mutually exclusive".to_string());
        }
        if let Some(ids) = cmd.without.as_deref().or(cmd.only.as_deref()) {
            Die::validate_ids(ids)?;
        }

        Ok(cmd)
    }
}

impl Command for OddsCommand {
    const USAGE: &'static str = "\
camelodds odds - compute the exact finishing odds for a leg

USAGE:
    camelodds odds [option ...] <layout>

EXAMPLES:
    camelodds odds [1:y,2:p,3:g,4:u,5:r,6:w,7:b,8:<,9:>]
    camelodds odds -w gp [1:ry,3:gu,5:pwb]

OPTIONS:
    · --without / -w ids (default: none)
      Dice already rolled this leg, removed from the pool. For example, if
      the green and purple dice are out of the pyramid: `-w gp`

    · --only / -o ids
      Restrict the pool to exactly these dice. Mutually exclusive with -w.

    · --ignore-last / -i count (default: 1)
      How many trailing dice of each ordering are left unrolled. The
      standard leg ends with one die still in the pyramid; pass 0 to roll
      every die in the pool.
";

    type Output = OddsCommandOutput;

    fn try_from_cli_args(mut args: Args) -> Result<Self, String> {
        args.maybe_help(Self::USAGE);

        let without = args.opt_value(["-w", "--without"])?;
        let only = args.opt_value(["-o", "--only"])?;
        let ignore_last = args.opt_value(["-i", "--ignore-last"])?;
        let layout = args.free_value()?;
        args.expect_finished()?;

        Self::try_from_str_args(
            without.as_deref(),
            only.as_deref(),
            ignore_last.as_deref(),
            &layout,
        )
    }

    fn run(self) -> Result<Self::Output, String> {
        let board = self.layout.to_board()?;
        if board.race_order().is_empty() {
            return Err("the layout contains no racing camels".to_string());
        }

        let dice = match (self.without.as_deref(), self.only.as_deref()) {
            (Some(ids), None) => Die::base_dice_without(ids),
            (None, Some(ids)) => Die::base_dice_with_only(ids),
            (None, None) => Die::base_dice(),
            // rejected when the arguments were parsed
            (Some(_), Some(_)) => unreachable!(),
        };

        let ndice = dice.len();
        let num_orderings =
            num_arrangements(ndice as u32, ndice.saturating_sub(self.ignore_last) as u32);
        let num_sequences = permute::num_sequences(&dice, self.ignore_last);

        let start_time = Instant::now();
        let results = outcomes::compute(&board, &dice, self.ignore_last);
        let duration = start_time.elapsed();

        let mut metrics = Metrics::new();
        metrics.push("die orderings", num_orderings.to_string());
        metrics.push("sequences aggregated", num_sequences.to_string());
        metrics.push("total weight", results.total_weight().to_string());
        metrics.push("aggregation duration", format!("{:.2?}", duration));

        Ok(OddsCommandOutput {
            board,
            dice,
            results,
            metrics,
        })
    }
}

#[derive(Debug)]
pub struct OddsCommandOutput {
    pub board: Board,
    pub dice: Vec<Die>,
    pub results: RankTable,
    pub metrics: Metrics,
}

impl fmt::Display for OddsCommandOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dice_ids = self.dice.iter().map(|die| die.id).join(", ");
        write!(
            f,
            "\n{}\n\navailable dice: {}\n\nResults\n{}\n{}",
            self.board,
            dice_ids,
            self.results.to_table(),
            self.metrics.to_table(),
        )
    }
}

/////////////////
// ShowCommand //
/////////////////

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ShowCommand {
    layout: parse::Layout,
}

impl Command for ShowCommand {
    const USAGE: &'static str = "\
camelodds show - parse a board layout and draw it

USAGE:
    camelodds show <layout>

EXAMPLES:
    camelodds show [1:y,2:p,3:gu,8:<]
";

    type Output = ShowCommandOutput;

    fn try_from_cli_args(mut args: Args) -> Result<Self, String> {
        args.maybe_help(Self::USAGE);

        let layout = args.free_value()?;
        args.expect_finished()?;

        Ok(Self {
            layout: parse_req("board layout", &layout)?,
        })
    }

    fn run(self) -> Result<Self::Output, String> {
        let board = self.layout.to_board()?;
        Ok(ShowCommandOutput { board })
    }
}

pub struct ShowCommandOutput {
    pub board: Board,
}

impl fmt::Display for ShowCommandOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let order = self
            .board
            .race_order()
            .into_iter()
            .map(|camel| camel.as_human_readable())
            .join(", ");
        write!(f, "\n{}\n\nrace order: {}", self.board, order)
    }
}

/////////////////
// BaseCommand //
/////////////////

#[derive(Debug)]
pub enum BaseCommand {
    ListDice(ListDiceCommand),
    Odds(OddsCommand),
    Show(ShowCommand),
}

impl Command for BaseCommand {
    const USAGE: &'static str = "\
camelodds - exact finishing odds for Camel Up legs!

USAGE:
    camelodds [option ...] <subcommand>

SUBCOMMANDS:
    · camelodds odds - compute the exact finishing odds for a leg
    · camelodds list-dice - list the standard dice, their ids and their faces
    · camelodds show - parse a board layout and draw it
";

    type Output = String;

    fn try_from_cli_args(mut args: Args) -> Result<Self, String> {
        let maybe_subcommand = args.subcommand()?;

        match maybe_subcommand.as_deref() {
            Some("odds") => Ok(Self::Odds(OddsCommand::try_from_cli_args(args)?)),
            Some("list-dice") => Ok(Self::ListDice(ListDiceCommand::try_from_cli_args(args)?)),
            Some("show") => Ok(Self::Show(ShowCommand::try_from_cli_args(args)?)),
            Some(command) => Err(format!("'{}' is not a recognized command", command)),
            None => {
                args.maybe_help(Self::USAGE);
                Err("no subcommand specified".to_string())
            }
        }
    }

    fn run(self) -> Result<String, String> {
        match self {
            Self::ListDice(cmd) => cmd.run().map(|out| out.to_string()),
            Self::Odds(cmd) => cmd.run().map(|out| out.to_string()),
            Self::Show(cmd) => cmd.run().map(|out| out.to_string()),
        }
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
    fn test_odds_command_from_str_args() {
        let cmd =
            OddsCommand::try_from_str_args(Some("gp"), None, None, "[1:r,2:g]").unwrap();
        assert_eq!(DEFAULT_IGNORED_DICE, cmd.ignore_last);

        let cmd = OddsCommand::try_from_str_args(None, Some("rc"), Some("0"), "[1:r]").unwrap();
        assert_eq!(0, cmd.ignore_last);

        // -w and -o together
        assert_err!(OddsCommand::try_from_str_args(
            Some("g"),
            Some("r"),
            None,
            "[1:r]"
        ));
        // unknown die id
        assert_err!(OddsCommand::try_from_str_args(
            Some("gx"),
            None,
            None,
            "[1:r]"
        ));
        // broken layout
        assert_err!(OddsCommand::try_from_str_args(None, None, None, "[1]"));
    }

    #[test]
    fn test_odds_command_needs_racing_camels() {
        let cmd = OddsCommand::try_from_str_args(None, None, None, "[1:w,2:b]").unwrap();
        assert_err!(cmd.run());
    }

    #[test]
    fn test_odds_command_end_to_end() {
        let cmd =
            OddsCommand::try_from_str_args(None, Some("rg"), Some("0"), "[1:r,2:g]").unwrap();
        let out = cmd.run().unwrap();

        assert_eq!(72, out.results.total_weight());

        let rendered = out.to_string();
        assert!(rendered.contains("available dice: r, g"));
        assert!(rendered.contains("Results"));
        assert!(rendered.contains("sequences aggregated"));
    }

    #[test]
    fn test_list_dice_command() {
        let table = ListDiceCommand.run().unwrap().to_string();
        assert!(table.contains("Crazy"));
        assert!(table.contains("R1 R1 R2 R2 R3 R3"));
        assert!(table.contains("B1 B2 B3 W1 W2 W3"));
    }
}
