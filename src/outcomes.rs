//! Replay every enumerated sequence and tally who finishes where.

use crate::{
    board::Board,
    dice::{Camel, Die},
    permute,
};
use approx::relative_eq;
use ndarray::{Array2, Axis};
use tabular::{Row, Table};

/// Compute the exact (rank x camel) outcome table for a board and dice pool.
///
/// For every sequence the enumerator produces, the board is cloned, the
/// sequence's moves are replayed in order, and the resulting race order is
/// tallied with the sequence's combinatorial weight. `trailing_ignored` is
/// forwarded to the enumerator; pass 0 to roll every die, or 1 for the
/// standard leg where the last die stays in the pyramid.
pub fn compute(board: &Board, dice: &[Die], trailing_ignored: usize) -> RankTable {
    let camels = board.race_order();
    let nranks = camels.len();
    let mut counts = Array2::<u64>::zeros((nranks, nranks));

    permute::for_each_sequence(dice, trailing_ignored, |seq| {
        let mut replay = board.clone();
        for side in seq {
            replay.apply_move(side.mv);
        }

        let weight = permute::sequence_weight(seq);
        let order = replay.race_order();
        debug_assert_eq!(nranks, order.len());

        for (rank, camel) in order.iter().enumerate() {
            let col = camels
                .iter()
                .position(|other| other == camel)
                .expect("camel missing from the starting order");
            counts[(rank, col)] += weight;
        }
    });

    RankTable { counts, camels }
}

///////////////
// RankTable //
///////////////

/// Weighted counts of every (finishing rank, racing camel) pair, built fresh
/// per computation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RankTable {
    /// `counts[(rank, col)]` is the weighted number of ways `camels[col]`
    /// finishes in `rank` (0 = leading).
    counts: Array2<u64>,
    /// Column order: the racing camels as read off the starting board.
    camels: Vec<Camel>,
}

impl RankTable {
    #[inline]
    pub fn num_ranks(&self) -> usize {
        self.camels.len()
    }

    #[inline]
    pub fn camels(&self) -> &[Camel] {
        &self.camels
    }

    pub fn count(&self, rank: usize, camel: Camel) -> u64 {
        let col = self
            .camels
            .iter()
            .position(|&other| other == camel)
            .expect("camel not in the rank table");
        self.counts[(rank, col)]
    }

    /// The weight accumulated in one rank column. Every rank accumulates the
    /// same total (each sequence contributes its weight to every rank
    /// exactly once); a divergence means the tallies are inconsistent, which
    /// is fatal: the table must never be rendered from bad counts.
    pub fn total_weight(&self) -> u64 {
        assert!(!self.camels.is_empty(), "rank table has no racing camels");

        let totals = self.counts.sum_axis(Axis(1));
        let total = totals[0];
        assert!(
            totals.iter().all(|&t| t == total),
            "rank totals diverge: {:?}",
            totals
        );
        total
    }

    /// One rank's cells, by descending count; ties keep the starting race
    /// order so output is deterministic.
    fn ranked_column(&self, rank: usize) -> Vec<(Camel, u64)> {
        let mut cells: Vec<(Camel, u64)> = self
            .camels
            .iter()
            .enumerate()
            .map(|(col, &camel)| (camel, self.counts[(rank, col)]))
            .collect();
        cells.sort_by(|a, b| b.1.cmp(&a.1));
        cells
    }

    /// Render the table: one column per rank (1-indexed header), cells
    /// `"<camel> (<percent>%)"` to one decimal place, rows by descending
    /// count within each column.
    pub fn to_table(&self) -> Table {
        let nranks = self.num_ranks();
        let total = self.total_weight();

        let spec = vec!["{:<}"; nranks].join("  ");
        let mut table = Table::new(&spec);
        table.add_row(row_from_cells((1..=nranks).map(|rank| rank.to_string())));

        let columns: Vec<Vec<(Camel, u64)>> =
            (0..nranks).map(|rank| self.ranked_column(rank)).collect();

        for column in &columns {
            let p_sum: f64 = column
                .iter()
                .map(|&(_, count)| (count as f64) / (total as f64))
                .sum();
            debug_assert!(relative_eq!(p_sum, 1.0, epsilon = 1e-9));
        }

        for row_idx in 0..nranks {
            table.add_row(row_from_cells(columns.iter().map(|column| {
                let (camel, count) = column[row_idx];
                let pct = 100.0 * (count as f64) / (total as f64);
                format!("{} ({:.1}%)", camel, pct)
            })));
        }

        table
    }
}

pub(crate) fn row_from_cells(cells: impl Iterator<Item = String>) -> Row {
    let mut row = Row::new();
    for cell in cells {
        row.add_cell(cell);
    }
    row
}

///////////
// Tests //
///////////
