//! Exhaustive enumeration of everything the dice pyramid can do.
//!
//! A *sequence* is one fully-resolved leg: an ordering of the dice crossed
//! with one face choice per die. The enumerator visits every ordering of the
//! pool and, for each, the Cartesian product of the dice's weighted side
//! lists. No sequence is ever omitted or produced twice.
//!
//! The last `trailing_ignored` dice of each ordering contribute no moves:
//! their faces are neither applied nor weighted in, but distinct choices of
//! *which* dice trail still count as distinct orderings. Concretely, the
//! enumeration walks every arrangement of `n - trailing_ignored` dice drawn
//! from the pool of `n`.

use crate::dice::{Die, Side};
use claim::debug_assert_le;

/// Call `cb` once per sequence with the slice of weighted moves, in turn
/// order. The slice is only valid for the duration of the call.
///
/// Zero dice (or a pool that is entirely excluded) produce exactly one empty
/// sequence: the leg plays out with no moves at all.
pub fn for_each_sequence(dice: &[Die], trailing_ignored: usize, mut cb: impl FnMut(&[Side])) {
    fn rec(
        dice: &[Die],
        used: &mut [bool],
        acc: &mut Vec<Side>,
        take: usize,
        cb: &mut impl FnMut(&[Side]),
    ) {
        debug_assert_le!(acc.len(), take);

        if acc.len() == take {
            cb(acc);
            return;
        }

        for die_idx in 0..dice.len() {
            if used[die_idx] {
                continue;
            }
            used[die_idx] = true;
            for &side in &dice[die_idx].sides {
                acc.push(side);
                rec(dice, used, acc, take, cb);
                acc.pop();
            }
            used[die_idx] = false;
        }
    }

    let take = dice.len().saturating_sub(trailing_ignored);
    let mut used = vec![false; dice.len()];
    let mut acc = Vec::with_capacity(take);
    rec(dice, &mut used, &mut acc, take, &mut cb);
}

/// Collect every sequence into owned vectors. Convenient for tests and small
/// pools; prefer [`for_each_sequence`] when the pool is large, since the
/// sequence count is factorial in the number of dice.
pub fn all_sequences(dice: &[Die], trailing_ignored: usize) -> Vec<Vec<Side>> {
    let mut out = Vec::new();
    for_each_sequence(dice, trailing_ignored, |seq| out.push(seq.to_vec()));
    out
}

/// The number of sequences [`for_each_sequence`] will produce, without
/// enumerating faces.
pub fn num_sequences(dice: &[Die], trailing_ignored: usize) -> u64 {
    fn rec(dice: &[Die], used: &mut [bool], left: usize) -> u64 {
        if left == 0 {
            return 1;
        }
        let mut total = 0;
        for die_idx in 0..dice.len() {
            if used[die_idx] {
                continue;
            }
            used[die_idx] = true;
            total += (dice[die_idx].sides.len() as u64) * rec(dice, used, left - 1);
            used[die_idx] = false;
        }
        total
    }

    let take = dice.len().saturating_sub(trailing_ignored);
    rec(dice, &mut vec![false; dice.len()], take)
}

/// A sequence's combinatorial weight: the product of its side counts. Summed
/// over all sequences this equals the number of equally-likely physical
/// rolls, so tallies scaled by it need no further normalization.
#[inline]
pub fn sequence_weight(seq: &[Side]) -> u64 {
    seq.iter().map(|side| side.count as u64).product()
}

cfg_test! {
    /// Reference enumeration via itertools, for cross-checking the recursive
    /// generator. Only valid for pools with at least one included die:
    /// `multi_cartesian_product` disagrees about the nullary product.
    fn all_sequences_ref(dice: &[Die], trailing_ignored: usize) -> Vec<Vec<Side>> {
        use itertools::Itertools;

        let take = dice.len().saturating_sub(trailing_ignored);
        assert!(take > 0);

        dice.iter()
            .permutations(take)
            .flat_map(|order| {
                order
                    .into_iter()
                    .map(|die| die.sides.iter().copied())
                    .multi_cartesian_product()
            })
            .collect()
    }
}

///////////
// Tests //
///////////

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        dice::{Camel, Move},
        num_arrangements,
    };
    use std::collections::HashSet;

    fn die(id: char, sides: &[(Camel, u8, u32)]) -> Die {
        Die::new(
            id,
            sides
                .iter()
                .map(|&(camel, spaces, count)| Side::new(Move::new(camel, spaces), count))
                .collect(),
        )
    }

    #[test]
    fn test_zero_dice_yield_one_empty_sequence() {
        assert_eq!(vec![Vec::<Side>::new()], all_sequences(&[], 0));
        assert_eq!(vec![Vec::<Side>::new()], all_sequences(&[], 1));
        assert_eq!(1, num_sequences(&[], 0));
    }

    #[test]
    fn test_fully_excluded_pool_yields_one_empty_sequence() {
        let dice = Die::base_dice_with_only("r");
        assert_eq!(vec![Vec::<Side>::new()], all_sequences(&dice, 1));
        assert_eq!(vec![Vec::<Side>::new()], all_sequences(&dice, 7));
    }

    #[test]
    fn test_single_die_weights() {
        // a racing die: 3 distinct sequences, each weighing 2, summing to the
        // die's 6 physical faces
        let dice = vec![die('r', &[(Camel::Red, 1, 2), (Camel::Red, 2, 2), (Camel::Red, 3, 2)])];
        assert_eq!(6, dice[0].num_faces());

        let seqs = all_sequences(&dice, 0);
        assert_eq!(3, seqs.len());
        assert!(seqs.iter().all(|seq| seq.len() == 1));
        assert!(seqs.iter().all(|seq| sequence_weight(seq) == 2));
        assert_eq!(
            6,
            seqs.iter().map(|seq| sequence_weight(seq)).sum::<u64>()
        );
    }

    #[test]
    fn test_two_dice_orderings_and_products() {
        let dice = Die::base_dice_with_only("rc");
        let seqs = all_sequences(&dice, 0);

        // 2 orderings x 3 faces x 6 faces
        assert_eq!(2 * 3 * 6, seqs.len());
        assert_eq!(seqs.len() as u64, num_sequences(&dice, 0));

        // total weight = orderings x physical faces per die
        let total: u64 = seqs.iter().map(|seq| sequence_weight(seq)).sum();
        assert_eq!(2 * 6 * 6, total);
    }

    #[test]
    fn test_trailing_exclusion_shortens_sequences() {
        let dice = Die::base_dice_with_only("ru");
        let seqs = all_sequences(&dice, 1);

        // one die leads, the other trails silently: 2 arrangements x 3 faces
        assert_eq!(2 * 3, seqs.len());
        assert!(seqs.iter().all(|seq| seq.len() == 1));

        let total: u64 = seqs.iter().map(|seq| sequence_weight(seq)).sum();
        assert_eq!(2 * 6, total);
    }

    #[test]
    fn test_full_pool_counts() {
        let dice = Die::base_dice();
        assert_eq!(6, dice.len());

        // with one die trailing, each arrangement of 5 dice omits exactly one
        // die: 5! orderings omitting the 6-sided crazy die (3^5 face
        // products), plus 5 x 5! orderings omitting one 3-sided racing die
        // (6 * 3^4 face products each)
        let fact5 = u64::from(num_arrangements(5, 5));
        let expected = fact5 * 3u64.pow(5) + 5 * fact5 * 6 * 3u64.pow(4);
        assert_eq!(expected, num_sequences(&dice, 1));
        assert_eq!(320_760, expected);
    }

    #[test]
    fn test_no_duplicates_or_omissions() {
        let dice = Die::base_dice_with_only("ruc");

        for trailing in 0..=2 {
            let seqs = all_sequences(&dice, trailing);
            assert_eq!(seqs.len() as u64, num_sequences(&dice, trailing));

            let distinct: HashSet<Vec<(char, u8, u8)>> = seqs
                .iter()
                .map(|seq| {
                    seq.iter()
                        .map(|side| {
                            (side.mv.camel.as_char(), side.mv.spaces, side.count as u8)
                        })
                        .collect()
                })
                .collect();
            // every sequence is distinct: orderings of distinct dice never
            // collide, and within a die each side is distinct
            assert_eq!(seqs.len(), distinct.len());
        }
    }

    #[test]
    fn test_matches_reference_enumeration() {
        let dice = Die::base_dice_with_only("ryc");

        for trailing in 0..=2 {
            let ours: HashSet<Vec<(char, u8)>> = all_sequences(&dice, trailing)
                .into_iter()
                .map(|seq| {
                    seq.iter()
                        .map(|side| (side.mv.camel.as_char(), side.mv.spaces))
                        .collect()
                })
                .collect();
            let reference: HashSet<Vec<(char, u8)>> = all_sequences_ref(&dice, trailing)
                .into_iter()
                .map(|seq| {
                    seq.iter()
                        .map(|side| (side.mv.camel.as_char(), side.mv.spaces))
                        .collect()
                })
                .collect();
            assert_eq!(reference, ours);

            // same cardinality too, not just the same set
            assert_eq!(
                all_sequences_ref(&dice, trailing).len(),
                all_sequences(&dice, trailing).len()
            );
        }
    }
}
