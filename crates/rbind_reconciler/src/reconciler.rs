//! Per-path list reconciliation against the previous render.

use rbind_core::value::Value;
use rustc_hash::FxHashMap;

use crate::classify::{classify, Classification};
use crate::hash::{hash_snapshot, HashSnapshot};
use crate::policy::{can_handle_simply, ReconcilePolicy};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub classification: Classification,
    /// Whether the consumer may patch instead of re-rendering.
    pub simple: bool,
}

/// Remembers the last rendered hashes per list path.
#[derive(Debug, Default)]
pub struct ListReconciler {
    policy: ReconcilePolicy,
    snapshots: FxHashMap<String, HashSnapshot>,
}

impl ListReconciler {
    pub fn new(policy: ReconcilePolicy) -> Self {
        Self {
            policy,
            snapshots: FxHashMap::default(),
        }
    }

    pub fn policy(&self) -> &ReconcilePolicy {
        &self.policy
    }

    /// Classify `items` against the previous render of `path` and store
    /// them as the new baseline. The first render of a path is all
    /// additions.
    pub fn reconcile(&mut self, path: &str, items: &[Value]) -> Reconciliation {
        let classification = match self.snapshots.get(path) {
            Some(old) => classify(old, items),
            None => classify(&HashSnapshot::default(), items),
        };
        let simple = can_handle_simply(&classification, &self.policy);
        tracing::debug!(
            path,
            removed = classification.removed.len(),
            moved = classification.moved.len(),
            added = classification.added.len(),
            simple,
            "reconciled list"
        );
        self.snapshots.insert(path.to_string(), hash_snapshot(items));
        Reconciliation {
            classification,
            simple,
        }
    }

    pub fn snapshot(&self, path: &str) -> Option<&HashSnapshot> {
        self.snapshots.get(path)
    }

    /// Drop the baseline for `path`, e.g. when its list is unmounted.
    pub fn forget(&mut self, path: &str) -> bool {
        self.snapshots.remove(path).is_some()
    }
}
