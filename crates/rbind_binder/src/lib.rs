//! rbind_binder: Iteration scopes and path normalization.
//!
//! A template position inside one or more `foreach` iterations sees the
//! iteration's item and index aliases. This crate records the structural
//! hierarchy of positions ([`ScopeTree`]) and rewrites alias-relative paths
//! into absolute paths into the root data graph ([`normalize_path`]).

mod frame;
mod normalize;

pub use frame::{ForeachFrame, PositionId, ScopeTree};
pub use normalize::{normalize_path, resolved_source_path, ForeachResolver, DEFAULT_PARENT_TOKEN};
pub use rbind_evaluator::{ResolveError, ResolvedPath};
