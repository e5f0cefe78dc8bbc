//! Classification of array changes by content hash.

use rbind_core::value::Value;
use serde::Serialize;

use crate::hash::{hash_snapshot, HashSnapshot};

/// An item present in both renders at different positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Move {
    pub from: usize,
    pub to: usize,
    pub hash: String,
}

/// How the new array relates to the previous one.
///
/// `removed` indices refer to the old array and are sorted descending so
/// they can be applied one by one without shifting later ones. `added` and
/// `unchanged` refer to the new array, ascending. `moved` is sorted by
/// target index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub removed: Vec<usize>,
    pub moved: Vec<Move>,
    pub added: Vec<usize>,
    pub unchanged: Vec<usize>,
}

/// One step of a patch plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum PatchOp {
    Remove { index: usize },
    Move { from: usize, to: usize },
    Insert { index: usize },
}

impl Classification {
    pub fn total_edits(&self) -> usize {
        self.removed.len() + self.moved.len() + self.added.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_edits() == 0
    }

    /// Removals first, then moves, then insertions.
    pub fn operations(&self) -> Vec<PatchOp> {
        let removes = self.removed.iter().map(|&index| PatchOp::Remove { index });
        let moves = self.moved.iter().map(|m| PatchOp::Move {
            from: m.from,
            to: m.to,
        });
        let inserts = self.added.iter().map(|&index| PatchOp::Insert { index });
        removes.chain(moves).chain(inserts).collect()
    }
}

/// Compare the previous render's hashes against `new_items`.
pub fn classify(old: &HashSnapshot, new_items: &[Value]) -> Classification {
    let new = hash_snapshot(new_items);
    let mut result = Classification::default();

    for (hash, &from) in old {
        if !new.contains_key(hash) {
            result.removed.push(from);
        }
    }
    for (hash, &to) in &new {
        match old.get(hash) {
            Some(&from) if from == to => result.unchanged.push(to),
            Some(&from) => result.moved.push(Move {
                from,
                to,
                hash: hash.clone(),
            }),
            None => result.added.push(to),
        }
    }

    result.removed.sort_unstable_by(|a, b| b.cmp(a));
    // New-side lists are built in index order already.
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_arrays() {
        let items = vec![Value::from(1), Value::from(2)];
        let c = classify(&hash_snapshot(&items), &items);
        assert!(c.is_empty());
        assert_eq!(c.unchanged, vec![0, 1]);
    }

    #[test]
    fn test_operations_order() {
        let c = Classification {
            removed: vec![4, 1],
            moved: vec![Move {
                from: 0,
                to: 2,
                hash: "x".into(),
            }],
            added: vec![3],
            unchanged: vec![],
        };
        assert_eq!(
            c.operations(),
            vec![
                PatchOp::Remove { index: 4 },
                PatchOp::Remove { index: 1 },
                PatchOp::Move { from: 0, to: 2 },
                PatchOp::Insert { index: 3 },
            ]
        );
        assert_eq!(c.total_edits(), 4);
    }
}
