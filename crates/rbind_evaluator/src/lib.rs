//! rbind_evaluator: Tree-walking evaluator for binding expressions.
//!
//! Evaluation reads data through the [`DataScope`] trait and, inside
//! iteration contexts, rewrites property paths through a [`ScopeResolver`]
//! first. Missing data evaluates to `undefined`; only resolver failures and
//! the depth limit are errors.

mod evaluator;
mod methods;
pub mod ops;
mod scope;

pub use evaluator::{evaluate, EvalError, Evaluator};
pub use scope::{DataScope, ResolveError, ResolvedPath, ScopeResolver};
