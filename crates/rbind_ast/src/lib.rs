//! rbind_ast: Token kinds and expression tree definitions.
//!
//! An expression AST is built once per distinct expression string and is
//! immutable afterwards, so a single tree can be shared by every evaluation.

pub mod node;
pub mod operators;
pub mod syntax_kind;
pub mod visitor;

// Re-export key types
pub use node::*;
pub use operators::{BinaryOperator, OperatorCategory, UnaryOperator};
pub use syntax_kind::TokenKind;
