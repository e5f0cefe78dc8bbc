//! rbind_reconciler: Content-hash list diffing.
//!
//! Classifies how an array changed between two renders into removed,
//! moved, added, and unchanged indices, so that a consumer can patch the
//! rendered list instead of rebuilding it.

mod classify;
mod hash;
mod policy;
mod reconciler;

pub use classify::{classify, Classification, Move, PatchOp};
pub use hash::{content_hash, hash_snapshot, stable_hash, stable_stringify, HashSnapshot};
pub use policy::{
    can_handle_simply, ReconcilePolicy, DEFAULT_SIMPLE_EDIT_CEILING, DEFAULT_SMALL_EDIT_THRESHOLD,
};
pub use reconciler::{ListReconciler, Reconciliation};
