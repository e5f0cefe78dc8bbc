use rbind_core::value::Value;
use rbind_reconciler::{
    can_handle_simply, classify, content_hash, hash_snapshot, stable_stringify, Classification,
    ListReconciler, Move, PatchOp, ReconcilePolicy,
};
use serde_json::json;

fn items(json: serde_json::Value) -> Vec<Value> {
    match Value::from(json) {
        Value::Array(items) => items,
        other => vec![other],
    }
}

fn classification(removed: &[usize], moves: usize, added: &[usize]) -> Classification {
    Classification {
        removed: removed.to_vec(),
        moved: (0..moves)
            .map(|i| Move {
                from: i,
                to: i + 1,
                hash: format!("h{}", i),
            })
            .collect(),
        added: added.to_vec(),
        unchanged: Vec::new(),
    }
}

// ============================================================================
// Classification
// ============================================================================

#[test]
fn test_swap_is_two_moves() {
    let old = items(json!(["A", "B", "C"]));
    let new = items(json!(["A", "C", "B"]));
    let c = classify(&hash_snapshot(&old), &new);

    assert!(c.removed.is_empty());
    assert!(c.added.is_empty());
    assert_eq!(c.unchanged, vec![0]);
    let pairs: Vec<(usize, usize)> = c.moved.iter().map(|m| (m.from, m.to)).collect();
    assert_eq!(pairs, vec![(2, 1), (1, 2)]);
    assert_eq!(c.moved[0].hash, content_hash(&Value::from("C"), 0));
}

#[test]
fn test_removals_are_descending() {
    let old = items(json!([1, 2, 3, 4, 5]));
    let new = items(json!([2, 4]));
    let c = classify(&hash_snapshot(&old), &new);
    assert_eq!(c.removed, vec![4, 2, 0]);
    let pairs: Vec<(usize, usize)> = c.moved.iter().map(|m| (m.from, m.to)).collect();
    assert_eq!(pairs, vec![(1, 0), (3, 1)]);
}

#[test]
fn test_additions_are_ascending() {
    let old = items(json!(["a"]));
    let new = items(json!(["x", "a", "y"]));
    let c = classify(&hash_snapshot(&old), &new);
    assert_eq!(c.added, vec![0, 2]);
    assert_eq!(c.moved.len(), 1);
    assert_eq!((c.moved[0].from, c.moved[0].to), (0, 1));
}

/// Helper: the content hash at each index, read back from a snapshot.
fn hashes_by_index(list: &[Value]) -> Vec<String> {
    let mut hashes = vec![String::new(); list.len()];
    for (hash, &index) in &hash_snapshot(list) {
        hashes[index] = hash.clone();
    }
    hashes
}

/// Every list of up to three items drawn from a small pool, duplicates
/// included.
fn small_lists() -> Vec<Vec<Value>> {
    let pool = items(json!(["a", "b", {"id": 1}]));
    let mut lists = vec![Vec::new()];
    let mut frontier = vec![Vec::new()];
    for _ in 0..3 {
        frontier = frontier
            .iter()
            .flat_map(|list: &Vec<Value>| {
                pool.iter().map(move |item| {
                    let mut next = list.clone();
                    next.push(item.clone());
                    next
                })
            })
            .collect();
        lists.extend(frontier.iter().cloned());
    }
    lists
}

#[test]
fn test_new_side_indices_covered_once() {
    let lists = small_lists();
    assert_eq!(lists.len(), 40);

    for old in &lists {
        for new in &lists {
            let c = classify(&hash_snapshot(old), new);
            let old_hashes = hashes_by_index(old);
            let new_hashes = hashes_by_index(new);

            let mut covered: Vec<usize> = c
                .unchanged
                .iter()
                .copied()
                .chain(c.moved.iter().map(|m| m.to))
                .chain(c.added.iter().copied())
                .collect();
            covered.sort_unstable();
            assert_eq!(covered, (0..new.len()).collect::<Vec<_>>(), "{:?} -> {:?}", old, new);

            let mut kept: Vec<usize> = c
                .moved
                .iter()
                .map(|m| m.from)
                .chain(c.unchanged.iter().copied())
                .chain(c.removed.iter().copied())
                .collect();
            kept.sort_unstable();
            assert_eq!(kept, (0..old.len()).collect::<Vec<_>>(), "{:?} -> {:?}", old, new);

            for m in &c.moved {
                assert_ne!(m.from, m.to);
                assert_eq!(old_hashes[m.from], m.hash);
                assert_eq!(new_hashes[m.to], m.hash);
            }
            for &i in &c.unchanged {
                assert_eq!(old_hashes[i], new_hashes[i]);
            }
            for &r in &c.removed {
                for &a in &c.added {
                    assert_ne!(old_hashes[r], new_hashes[a], "{:?} -> {:?}", old, new);
                }
            }
        }
    }
}

#[test]
fn test_duplicates_match_by_occurrence() {
    let old = items(json!([{"id": 1}, {"id": 2}, {"id": 3}, "x", "x"]));
    let new = items(json!(["x", {"id": 3}, {"id": 9}, {"id": 1}, "x", "x"]));
    let c = classify(&hash_snapshot(&old), &new);

    // The first two "x" in the new list pair with the old ones; the third is new.
    assert_eq!(c.added, vec![2, 5]);
    assert_eq!(c.removed, vec![1]);
    assert_eq!(c.unchanged, vec![4]);
}

#[test]
fn test_key_order_does_not_matter() {
    let old = items(json!([{"a": 1, "b": 2}]));
    let new = items(json!([{"b": 2, "a": 1}]));
    let c = classify(&hash_snapshot(&old), &new);
    assert!(c.is_empty());
    assert_eq!(c.unchanged, vec![0]);
}

#[test]
fn test_array_order_matters_inside_items() {
    let old = items(json!([[1, 2]]));
    let new = items(json!([[2, 1]]));
    let c = classify(&hash_snapshot(&old), &new);
    assert_eq!(c.removed, vec![0]);
    assert_eq!(c.added, vec![0]);
}

#[test]
fn test_stringify_is_deterministic() {
    let value = Value::from(json!({"z": [1, {"y": null, "x": "s"}], "a": true}));
    assert_eq!(
        stable_stringify(&value),
        r#"{"a":true,"z":[1,{"x":"s","y":null}]}"#
    );
}

#[test]
fn test_patch_plan_order() {
    let old = items(json!(["a", "b", "c"]));
    let new = items(json!(["c", "d"]));
    let ops = classify(&hash_snapshot(&old), &new).operations();
    assert_eq!(
        ops,
        vec![
            PatchOp::Remove { index: 1 },
            PatchOp::Remove { index: 0 },
            PatchOp::Move { from: 2, to: 0 },
            PatchOp::Insert { index: 1 },
        ]
    );
}

// ============================================================================
// Policy
// ============================================================================

#[test]
fn test_pure_addition_is_simple() {
    let policy = ReconcilePolicy::default();
    assert!(can_handle_simply(&classification(&[], 0, &[3]), &policy));
}

#[test]
fn test_over_ceiling_is_not_simple() {
    let policy = ReconcilePolicy::default();
    let added: Vec<usize> = (0..11).collect();
    assert!(!can_handle_simply(&classification(&[], 0, &added), &policy));
    assert!(!can_handle_simply(&classification(&[1, 0], 5, &[0, 1, 2, 3]), &policy));
}

#[test]
fn test_simple_shapes() {
    let policy = ReconcilePolicy::default();
    assert!(can_handle_simply(&classification(&[5, 4, 3, 2], 0, &[]), &policy));
    assert!(can_handle_simply(&classification(&[], 6, &[]), &policy));
    assert!(can_handle_simply(&classification(&[3, 2], 0, &[0, 1]), &policy));
    assert!(can_handle_simply(&classification(&[2], 1, &[0]), &policy));
    assert!(can_handle_simply(&Classification::default(), &policy));
}

#[test]
fn test_mixed_change_above_threshold_is_not_simple() {
    let policy = ReconcilePolicy::default();
    assert!(!can_handle_simply(&classification(&[3, 2], 1, &[0]), &policy));

    let relaxed = ReconcilePolicy {
        small_edit_threshold: 4,
        ..ReconcilePolicy::default()
    };
    assert!(can_handle_simply(&classification(&[3, 2], 1, &[0]), &relaxed));
}

// ============================================================================
// ListReconciler
// ============================================================================

#[test]
fn test_first_render_is_all_additions() {
    let mut reconciler = ListReconciler::default();
    let result = reconciler.reconcile("todos", &items(json!(["a", "b"])));
    assert_eq!(result.classification.added, vec![0, 1]);
    assert!(result.simple);
    assert_eq!(reconciler.snapshot("todos").map(|s| s.len()), Some(2));
}

#[test]
fn test_baseline_is_replaced_each_pass() {
    let mut reconciler = ListReconciler::default();
    reconciler.reconcile("todos", &items(json!(["a", "b"])));
    let second = reconciler.reconcile("todos", &items(json!(["b", "a"])));
    assert_eq!(second.classification.moved.len(), 2);

    let third = reconciler.reconcile("todos", &items(json!(["b", "a"])));
    assert!(third.classification.is_empty());
    assert_eq!(third.classification.unchanged, vec![0, 1]);
}

#[test]
fn test_paths_are_independent() {
    let mut reconciler = ListReconciler::default();
    reconciler.reconcile("left", &items(json!([1])));
    let right = reconciler.reconcile("right", &items(json!([1])));
    assert_eq!(right.classification.added, vec![0]);
}

#[test]
fn test_forget_resets_baseline() {
    let mut reconciler = ListReconciler::default();
    reconciler.reconcile("todos", &items(json!([1, 2])));
    assert!(reconciler.forget("todos"));
    assert!(!reconciler.forget("todos"));
    let again = reconciler.reconcile("todos", &items(json!([1, 2])));
    assert_eq!(again.classification.added, vec![0, 1]);
}

#[test]
fn test_large_change_is_flagged() {
    let mut reconciler = ListReconciler::new(ReconcilePolicy::default());
    let before: Vec<Value> = (0..20).map(Value::from).collect();
    let after: Vec<Value> = (100..120).map(Value::from).collect();
    reconciler.reconcile("rows", &before);
    let result = reconciler.reconcile("rows", &after);
    assert_eq!(result.classification.total_edits(), 40);
    assert!(!result.simple);
}
