//! Positional diff between two projections, by item identity.
//!
//! The diff uses batch-update index semantics:
//! - `Remove.index` and `Move.from` are positions in the *old* projection.
//! - `Insert.index` and `Move.to` are positions in the *new* projection.
//!
//! Items present in both projections whose relative order is unchanged are
//! left alone; the set of untouched items is a longest increasing
//! subsequence of new positions, so the number of moves is minimal.
//! There is no update operation: content changes mutate items in place and
//! keep their identity.

use super::item::ItemId;
use std::collections::HashMap;

/// One incremental change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffOp {
    Remove { index: usize },
    Insert { index: usize, id: ItemId },
    Move { from: usize, to: usize },
}

/// Set of changes turning one projection into another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diff {
    removals: Vec<usize>,
    insertions: Vec<(usize, ItemId)>,
    moves: Vec<(usize, usize)>,
}

impl Diff {
    /// Compute the diff from `old` to `new`.
    ///
    /// Both slices are expected to hold unique ids. Any two projections are
    /// diffable; identical projections produce an empty diff.
    pub fn between(old: &[ItemId], new: &[ItemId]) -> Self {
        let new_positions: HashMap<ItemId, usize> =
            new.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        let old_positions: HashMap<ItemId, usize> =
            old.iter().enumerate().map(|(i, id)| (*id, i)).collect();

        let removals: Vec<usize> = old
            .iter()
            .enumerate()
            .filter(|(_, id)| !new_positions.contains_key(id))
            .map(|(i, _)| i)
            .collect();

        let insertions: Vec<(usize, ItemId)> = new
            .iter()
            .enumerate()
            .filter(|(_, id)| !old_positions.contains_key(id))
            .map(|(i, id)| (i, *id))
            .collect();

        // Survivors in old order, tagged with their new position.
        let survivors: Vec<(usize, usize)> = old
            .iter()
            .enumerate()
            .filter_map(|(from, id)| new_positions.get(id).map(|to| (from, *to)))
            .collect();
        let targets: Vec<usize> = survivors.iter().map(|(_, to)| *to).collect();
        let mut stable = vec![false; survivors.len()];
        for i in longest_increasing_subsequence(&targets) {
            stable[i] = true;
        }
        let moves = survivors
            .iter()
            .zip(&stable)
            .filter(|(_, stays)| !**stays)
            .map(|(pair, _)| *pair)
            .collect();

        Self {
            removals,
            insertions,
            moves,
        }
    }

    /// No change at all.
    pub fn is_empty(&self) -> bool {
        self.removals.is_empty() && self.insertions.is_empty() && self.moves.is_empty()
    }

    /// Old-projection indices removed, ascending.
    pub fn removals(&self) -> &[usize] {
        &self.removals
    }

    /// New-projection indices inserted, ascending, with the inserted id.
    pub fn insertions(&self) -> &[(usize, ItemId)] {
        &self.insertions
    }

    /// `(old index, new index)` pairs of moved items.
    pub fn moves(&self) -> &[(usize, usize)] {
        &self.moves
    }

    /// All operations: removals, then moves, then insertions.
    pub fn ops(&self) -> Vec<DiffOp> {
        let removals = self.removals.iter().map(|&index| DiffOp::Remove { index });
        let moves = self.moves.iter().map(|&(from, to)| DiffOp::Move { from, to });
        let insertions = self
            .insertions
            .iter()
            .map(|&(index, id)| DiffOp::Insert { index, id });
        removals.chain(moves).chain(insertions).collect()
    }

    /// Apply this diff to `old`, producing the new projection.
    ///
    /// Inserted and moved items go to their target slots; remaining slots
    /// are filled, in order, with the untouched survivors of `old`.
    pub fn apply(&self, old: &[ItemId]) -> Vec<ItemId> {
        let new_len = old.len() + self.insertions.len() - self.removals.len();
        let mut slots: Vec<Option<ItemId>> = vec![None; new_len];
        let mut consumed = vec![false; old.len()];

        for &index in &self.removals {
            consumed[index] = true;
        }
        for &(from, to) in &self.moves {
            consumed[from] = true;
            slots[to] = Some(old[from]);
        }
        for &(index, id) in &self.insertions {
            slots[index] = Some(id);
        }

        let mut untouched = old
            .iter()
            .zip(&consumed)
            .filter(|(_, used)| !**used)
            .map(|(id, _)| *id);
        slots
            .into_iter()
            .filter_map(|slot| slot.or_else(|| untouched.next()))
            .collect()
    }
}

/// Indices (into `values`) of one longest strictly increasing subsequence.
///
/// Patience sorting, O(n log n).
fn longest_increasing_subsequence(values: &[usize]) -> Vec<usize> {
    // tails[k]: index of the smallest tail of an increasing run of length k + 1
    let mut tails: Vec<usize> = Vec::new();
    let mut predecessor: Vec<Option<usize>> = vec![None; values.len()];

    for (i, &value) in values.iter().enumerate() {
        let k = tails.partition_point(|&t| values[t] < value);
        if k > 0 {
            predecessor[i] = Some(tails[k - 1]);
        }
        if k == tails.len() {
            tails.push(i);
        } else {
            tails[k] = i;
        }
    }

    let mut sequence = Vec::with_capacity(tails.len());
    let mut cursor = tails.last().copied();
    while let Some(i) = cursor {
        sequence.push(i);
        cursor = predecessor[i];
    }
    sequence.reverse();
    sequence
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<ItemId> {
        (0..n).map(|_| ItemId::next()).collect()
    }

    #[test]
    fn identical_projections_produce_empty_diff() {
        let a = ids(4);
        let diff = Diff::between(&a, &a);
        assert!(diff.is_empty());
        assert_eq!(diff.apply(&a), a);
    }

    #[test]
    fn empty_to_empty_is_empty() {
        let diff = Diff::between(&[], &[]);
        assert!(diff.is_empty());
        assert!(diff.ops().is_empty());
    }

    #[test]
    fn pure_insertions() {
        let a = ids(3);
        let extra = ids(2);
        let b = vec![a[0], extra[0], a[1], a[2], extra[1]];

        let diff = Diff::between(&a, &b);
        assert_eq!(diff.insertions(), &[(1, extra[0]), (4, extra[1])]);
        assert!(diff.removals().is_empty());
        assert!(diff.moves().is_empty());
        assert_eq!(diff.apply(&a), b);
    }

    #[test]
    fn pure_removals() {
        let a = ids(5);
        let b = vec![a[0], a[2], a[4]];

        let diff = Diff::between(&a, &b);
        assert_eq!(diff.removals(), &[1, 3]);
        assert!(diff.insertions().is_empty());
        assert!(diff.moves().is_empty());
        assert_eq!(diff.apply(&a), b);
    }

    #[test]
    fn pure_reordering_uses_minimal_moves() {
        let a = ids(4);
        let b = vec![a[3], a[0], a[1], a[2]];

        let diff = Diff::between(&a, &b);
        assert_eq!(diff.moves(), &[(3, 0)]);
        assert_eq!(diff.apply(&a), b);
    }

    #[test]
    fn reversal_moves_all_but_one() {
        let a = ids(4);
        let b: Vec<ItemId> = a.iter().rev().copied().collect();

        let diff = Diff::between(&a, &b);
        assert_eq!(diff.moves().len(), 3);
        assert_eq!(diff.apply(&a), b);
    }

    #[test]
    fn mixed_changes_apply_cleanly() {
        let a = ids(5);
        let extra = ids(2);
        let b = vec![extra[0], a[4], a[1], extra[1], a[2]];

        let diff = Diff::between(&a, &b);
        assert_eq!(diff.removals(), &[0, 3]);
        assert_eq!(diff.apply(&a), b);
    }

    #[test]
    fn everything_replaced() {
        let a = ids(3);
        let b = ids(2);
        let diff = Diff::between(&a, &b);
        assert_eq!(diff.removals(), &[0, 1, 2]);
        assert_eq!(diff.insertions().len(), 2);
        assert_eq!(diff.apply(&a), b);
    }

    #[test]
    fn ops_lists_removals_moves_then_insertions() {
        let a = ids(3);
        let extra = ids(1);
        let b = vec![a[2], a[0], extra[0]];

        let ops = Diff::between(&a, &b).ops();
        assert_eq!(
            ops,
            vec![
                DiffOp::Remove { index: 1 },
                DiffOp::Move { from: 0, to: 1 },
                DiffOp::Insert {
                    index: 2,
                    id: extra[0]
                },
            ]
        );
    }

    #[test]
    fn lis_of_sorted_input_is_everything() {
        assert_eq!(longest_increasing_subsequence(&[0, 1, 2, 3]), vec![0, 1, 2, 3]);
    }

    #[test]
    fn lis_picks_a_longest_run() {
        let lis = longest_increasing_subsequence(&[3, 0, 1, 2]);
        assert_eq!(lis, vec![1, 2, 3]);
    }
}
