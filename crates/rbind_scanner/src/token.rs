//! Tokens produced by the scanner.

use rbind_ast::syntax_kind::TokenKind;
use rbind_core::text::TextSpan;

/// A scanned token. Tokens are immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text for names, operators, and punctuation; the unescaped
    /// contents for strings.
    pub value: String,
    /// Binary precedence level, set on operator tokens that can be binary.
    pub precedence: Option<u8>,
    pub span: TextSpan,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, span: TextSpan) -> Self {
        Self {
            kind,
            value: value.into(),
            precedence: None,
            span,
        }
    }

    pub fn with_precedence(mut self, precedence: Option<u8>) -> Self {
        self.precedence = precedence;
        self
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Whether this is the operator token with the given text.
    pub fn is_operator(&self, text: &str) -> bool {
        self.kind == TokenKind::Operator && self.value == text
    }

    /// A short description for error messages: `')'`, `identifier 'foo'`, ...
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => "end of expression".to_string(),
            TokenKind::String => format!("string '{}'", self.value),
            TokenKind::Number | TokenKind::Identifier | TokenKind::Keyword => {
                format!("{} '{}'", self.kind.describe(), self.value)
            }
            _ => format!("'{}'", self.value),
        }
    }
}
