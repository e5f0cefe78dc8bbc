//! Errors from reactive store writes and mutations.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReactiveError {
    #[error("no value at '{0}'")]
    PathNotFound(String),
    #[error("'{0}' is not an array")]
    NotAnArray(String),
    #[error("cannot set a property on '{0}': not an object or array")]
    NotAContainer(String),
    #[error("'{0}' is a derived value and cannot be written")]
    ReadOnlyDerived(String),
    #[error("'{0}' is excluded from change tracking")]
    ExcludedField(String),
    #[error("invalid path '{0}'")]
    InvalidPath(String),
}
