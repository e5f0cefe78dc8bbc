//! rbind_scanner: Tokenizer for binding expressions.
//!
//! Produces a flat token stream from an expression string. Lexing is
//! lenient: characters that start no token are skipped. The only hard
//! failure is an unterminated string literal.

mod char_codes;
mod scanner;
mod token;

pub use scanner::{tokenize, ScanError, Scanner};
pub use token::Token;
