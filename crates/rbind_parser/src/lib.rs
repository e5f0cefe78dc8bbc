//! rbind_parser: Recursive descent parser for binding expressions.
//!
//! Turns the scanner's token stream into an [`Expr`](rbind_ast::Expr) tree,
//! and splits binding strings (`text: name, click: save`) into typed pairs.

mod binding;
mod error;
mod parser;

pub use binding::{parse_binding_string, BindingPair, BindingTypes, BUILTIN_BINDING_TYPES};
pub use error::ParseError;
pub use parser::{parse, parse_expression, parse_expression_with_depth, Parser, DEFAULT_MAX_DEPTH};
