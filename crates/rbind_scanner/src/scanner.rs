//! The expression scanner.
//!
//! Converts expression text into tokens the parser consumes. Positions are
//! tracked as byte offsets so spans can be rendered against the source.

use crate::char_codes::*;
use crate::token::Token;
use rbind_ast::operators::binary_precedence;
use rbind_ast::syntax_kind::{is_keyword, TokenKind};
use rbind_core::text::TextSpan;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("unterminated string literal starting with {quote}")]
    UnterminatedString { quote: char, span: TextSpan },
}

impl ScanError {
    pub fn span(&self) -> TextSpan {
        match self {
            ScanError::UnterminatedString { span, .. } => *span,
        }
    }
}

/// The scanner converts expression text into tokens.
pub struct Scanner {
    /// The source text being scanned.
    text: Vec<char>,
    /// Byte offset of each char, plus the total length at the end.
    offsets: Vec<u32>,
    /// Current position (char index).
    pos: usize,
}

impl Scanner {
    /// Create a new scanner for the given source text.
    pub fn new(text: &str) -> Self {
        let mut chars = Vec::with_capacity(text.len());
        let mut offsets = Vec::with_capacity(text.len() + 1);
        for (offset, ch) in text.char_indices() {
            chars.push(ch);
            offsets.push(offset as u32);
        }
        offsets.push(text.len() as u32);
        Self {
            text: chars,
            offsets,
            pos: 0,
        }
    }

    #[inline]
    fn current_char(&self) -> Option<char> {
        self.text.get(self.pos).copied()
    }

    #[inline]
    fn char_at(&self, ahead: usize) -> Option<char> {
        self.text.get(self.pos + ahead).copied()
    }

    fn span_from(&self, start: usize) -> TextSpan {
        TextSpan::from_bounds(self.offsets[start], self.offsets[self.pos])
    }

    fn chars_to_string(&self, start: usize, end: usize) -> String {
        self.text[start..end].iter().collect()
    }

    fn starts_with(&self, pattern: &str) -> bool {
        let mut i = self.pos;
        for expected in pattern.chars() {
            if self.text.get(i) != Some(&expected) {
                return false;
            }
            i += 1;
        }
        true
    }

    /// Scan the next token. At the end of input this keeps returning `Eof`.
    pub fn scan(&mut self) -> Result<Token, ScanError> {
        loop {
            while let Some(ch) = self.current_char() {
                if ch.is_whitespace() {
                    self.pos += 1;
                } else {
                    break;
                }
            }

            let start = self.pos;
            let ch = match self.current_char() {
                Some(ch) => ch,
                None => return Ok(Token::new(TokenKind::Eof, "", self.span_from(start))),
            };

            if ch.is_ascii_digit() || (ch == DOT && self.char_at(1).is_some_and(|c| c.is_ascii_digit())) {
                return Ok(self.scan_number());
            }
            if is_quote(ch) {
                return self.scan_string_literal(ch);
            }
            if is_identifier_start(ch) {
                return Ok(self.scan_identifier());
            }
            if let Some(token) = self.scan_operator() {
                return Ok(token);
            }
            if let Some(kind) = TokenKind::from_punctuation(ch) {
                self.pos += 1;
                return Ok(Token::new(kind, ch.to_string(), self.span_from(start)));
            }

            // Unrecognized characters are skipped.
            self.pos += 1;
        }
    }

    fn scan_digits(&mut self) {
        while self.current_char().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
    }

    fn scan_number(&mut self) -> Token {
        let start = self.pos;
        self.scan_digits();

        if self.current_char() == Some(DOT) && self.char_at(1).is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
            self.scan_digits();
        }

        // Exponent, only when digits actually follow.
        if let Some('e') | Some('E') = self.current_char() {
            let sign = matches!(self.char_at(1), Some('+') | Some('-'));
            let digit_at = if sign { 2 } else { 1 };
            if self.char_at(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                self.pos += digit_at;
                self.scan_digits();
            }
        }

        let text = self.chars_to_string(start, self.pos);
        Token::new(TokenKind::Number, text, self.span_from(start))
    }

    fn scan_string_literal(&mut self, quote: char) -> Result<Token, ScanError> {
        let start = self.pos;
        self.pos += 1; // skip opening quote
        let mut result = String::new();
        loop {
            let ch = match self.current_char() {
                Some(ch) => ch,
                None => {
                    return Err(ScanError::UnterminatedString {
                        quote,
                        span: self.span_from(start),
                    })
                }
            };
            if ch == quote {
                self.pos += 1;
                break;
            }
            if ch == BACKSLASH {
                // Only the quote character and the backslash itself escape.
                match self.char_at(1) {
                    Some(next) if next == quote || next == BACKSLASH => {
                        result.push(next);
                        self.pos += 2;
                    }
                    _ => {
                        result.push(ch);
                        self.pos += 1;
                    }
                }
                continue;
            }
            result.push(ch);
            self.pos += 1;
        }
        Ok(Token::new(TokenKind::String, result, self.span_from(start)))
    }

    fn scan_identifier(&mut self) -> Token {
        let start = self.pos;
        self.pos += 1;
        while self.current_char().is_some_and(is_identifier_part) {
            self.pos += 1;
        }
        let text = self.chars_to_string(start, self.pos);
        let kind = if is_keyword(&text) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        Token::new(kind, text, self.span_from(start))
    }

    fn scan_operator(&mut self) -> Option<Token> {
        let start = self.pos;
        let matched = THREE_CHAR_OPERATORS
            .iter()
            .chain(TWO_CHAR_OPERATORS.iter())
            .find(|op| self.starts_with(op))
            .map(|op| op.to_string())
            .or_else(|| {
                self.current_char()
                    .filter(|c| ONE_CHAR_OPERATORS.contains(c))
                    .map(|c| c.to_string())
            })?;
        self.pos += matched.chars().count();
        let precedence = binary_precedence(&matched).map(|p| p.level());
        Some(Token::new(TokenKind::Operator, matched, self.span_from(start)).with_precedence(precedence))
    }
}

/// Tokenize a whole expression. The result always ends with one `Eof` token.
pub fn tokenize(text: &str) -> Result<Vec<Token>, ScanError> {
    let mut scanner = Scanner::new(text);
    let mut tokens = Vec::new();
    loop {
        let token = scanner.scan()?;
        let done = token.is(TokenKind::Eof);
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}
