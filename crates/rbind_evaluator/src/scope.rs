//! The seams between the evaluator and the data it reads.

use rbind_core::path::PathSegment;
use rbind_core::value::Value;
use thiserror::Error;

/// Read access to a data graph.
pub trait DataScope {
    /// The value at `segments`, or `Undefined` if any step is missing.
    fn lookup(&self, segments: &[PathSegment]) -> Value;
}

impl DataScope for Value {
    fn lookup(&self, segments: &[PathSegment]) -> Value {
        Value::lookup(self, segments)
    }
}

impl<T: DataScope + ?Sized> DataScope for &T {
    fn lookup(&self, segments: &[PathSegment]) -> Value {
        (**self).lookup(segments)
    }
}

/// The result of rewriting a local path into the root data graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedPath {
    Path(String),
    /// The path named an iteration index; its value is the number itself.
    Index(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("unknown position {0}")]
    UnknownPosition(u32),
    #[error("cannot resolve path '{0}'")]
    InvalidPath(String),
}

/// Rewrites paths written inside an iteration context (item aliases, index
/// aliases, parent climbs) into absolute paths.
pub trait ScopeResolver {
    fn resolve_scoped_path(&self, path: &str) -> Result<ResolvedPath, ResolveError>;
}
