//! TokenKind enum - every token the expression scanner can produce.

use serde::Serialize;

/// The kind of a scanned token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    // Literals and names
    Number,
    String,
    Identifier,
    /// `true`, `false`, `null`, `undefined`
    Keyword,
    Operator,

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Question,
    Colon,

    Eof,
}

impl TokenKind {
    /// The fixed source text of a punctuation token.
    pub fn punctuation_text(self) -> Option<&'static str> {
        match self {
            TokenKind::LParen => Some("("),
            TokenKind::RParen => Some(")"),
            TokenKind::LBrace => Some("{"),
            TokenKind::RBrace => Some("}"),
            TokenKind::LBracket => Some("["),
            TokenKind::RBracket => Some("]"),
            TokenKind::Comma => Some(","),
            TokenKind::Dot => Some("."),
            TokenKind::Question => Some("?"),
            TokenKind::Colon => Some(":"),
            _ => None,
        }
    }

    /// Human-readable description for error messages.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Identifier => "identifier",
            TokenKind::Keyword => "keyword",
            TokenKind::Operator => "operator",
            TokenKind::Eof => "end of expression",
            other => other.punctuation_text().unwrap_or("token"),
        }
    }

    /// Map a punctuation character to its token kind.
    pub fn from_punctuation(ch: char) -> Option<Self> {
        Some(match ch {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            '?' => TokenKind::Question,
            ':' => TokenKind::Colon,
            _ => return None,
        })
    }
}

/// Identifiers that scan as [`TokenKind::Keyword`].
pub const KEYWORDS: &[&str] = &["true", "false", "null", "undefined"];

pub fn is_keyword(text: &str) -> bool {
    KEYWORDS.contains(&text)
}
