//! rbind_reactive: Change-tracking data store and dependency analysis.
//!
//! [`ReactiveStore`] owns a plain data graph. Reads hand out stable
//! [`ReactiveHandle`]s for nested containers; writes and array mutations
//! notify subscribers synchronously with the path and the old and new
//! values. Derived values are declared in a [`DerivedSet`], and
//! [`compute_dependencies`] discovers which fields each one reads.

mod array;
mod deps;
mod derived;
mod error;
mod notification;
mod store;

pub use array::{ArrayMutation, ArrayOp, SortOrder};
pub use deps::{compute_dependencies, infer_array_root, DependencyMap};
pub use derived::{Derived, DerivedSet};
pub use error::ReactiveError;
pub use notification::{ArrayChange, ArrayMethod, Change, Notification};
pub use store::{
    ReactiveConfig, ReactiveHandle, ReactiveStore, Read, SubscriptionId, DEFAULT_EXCLUSION_PREFIX,
};
