//! Whether a classified change is small enough to patch in place.

use crate::classify::Classification;

pub const DEFAULT_SIMPLE_EDIT_CEILING: usize = 10;
pub const DEFAULT_SMALL_EDIT_THRESHOLD: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcilePolicy {
    /// More edits than this always means a full re-render.
    pub simple_edit_ceiling: usize,
    /// Any mix of edits up to this count is patched.
    pub small_edit_threshold: usize,
}

impl Default for ReconcilePolicy {
    fn default() -> Self {
        Self {
            simple_edit_ceiling: DEFAULT_SIMPLE_EDIT_CEILING,
            small_edit_threshold: DEFAULT_SMALL_EDIT_THRESHOLD,
        }
    }
}

/// True when the change is a pure addition, removal, or reorder, an
/// equal-count replacement, or a small mix, and stays under the ceiling.
pub fn can_handle_simply(c: &Classification, policy: &ReconcilePolicy) -> bool {
    let total = c.total_edits();
    if total > policy.simple_edit_ceiling {
        return false;
    }
    let (removed, moved, added) = (c.removed.len(), c.moved.len(), c.added.len());
    let pure_adds = removed == 0 && moved == 0;
    let pure_removes = added == 0 && moved == 0;
    let pure_moves = added == 0 && removed == 0;
    let replacement = moved == 0 && added == removed;

    pure_adds || pure_removes || pure_moves || replacement || total <= policy.small_edit_threshold
}
