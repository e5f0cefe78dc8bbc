//! The expression parser.
//!
//! A recursive descent parser over a token vector. Binary operators use
//! precedence climbing: the right operand of an operator at level `p` is
//! parsed with a minimum of `p + 1`, which makes every binary operator
//! left-associative. Ternaries sit below all binary operators and nest to
//! the right.

use rbind_ast::node::*;
use rbind_ast::operators::{BinaryOperator, OperatorPrecedence, UnaryOperator};
use rbind_ast::syntax_kind::TokenKind;
use rbind_core::text::TextSpan;
use rbind_core::value::{number_to_string, Value};
use rbind_scanner::{tokenize, Token};

use crate::error::ParseError;

/// Maximum recursion depth to prevent stack overflow on deeply nested input.
pub const DEFAULT_MAX_DEPTH: u32 = 200;

type ParseResult<T> = Result<T, ParseError>;

/// Parser state: the token stream and a cursor into it. A parser is used for
/// exactly one expression; nothing is shared between parses.
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    depth: u32,
    max_depth: u32,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !tokens.last().is_some_and(|t| t.is(TokenKind::Eof)) {
            let end = tokens.last().map_or(0, |t| t.span.end());
            tokens.push(Token::new(TokenKind::Eof, "", TextSpan::empty(end)));
        }
        Self {
            tokens,
            position: 0,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parse the whole token stream. Returns `None` when the stream holds
    /// nothing but the end marker.
    pub fn parse(mut self) -> ParseResult<Option<Expr>> {
        if self.current().is(TokenKind::Eof) {
            return Ok(None);
        }
        let start = self.current().span;
        let expr = self.parse_ternary()?;
        if !self.current().is(TokenKind::Eof) {
            return Err(self.unexpected());
        }
        // Binary chains nest without recursing here; the evaluator still
        // descends one level per node.
        if expr.depth() > self.max_depth {
            return Err(ParseError::TooDeep { span: start });
        }
        Ok(Some(expr))
    }

    // ========================================================================
    // Token management
    // ========================================================================

    #[inline]
    fn current(&self) -> &Token {
        self.peek(0)
    }

    /// The token `offset` places ahead. Reads past the end return the final
    /// end marker.
    fn peek(&self, offset: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.position + offset).min(last)]
    }

    fn next_token(&mut self) {
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
    }

    fn expect_token(&mut self, kind: TokenKind) -> ParseResult<()> {
        if self.current().is(kind) {
            self.next_token();
            return Ok(());
        }
        let token = self.current();
        Err(ParseError::Expected {
            expected: format!("'{}'", kind.punctuation_text().unwrap_or(kind.describe())),
            found: token.describe(),
            span: token.span,
        })
    }

    fn optional_token(&mut self, kind: TokenKind) -> bool {
        if self.current().is(kind) {
            self.next_token();
            true
        } else {
            false
        }
    }

    fn unexpected(&self) -> ParseError {
        let token = self.current();
        ParseError::UnexpectedToken {
            found: token.describe(),
            span: token.span,
        }
    }

    fn enter(&mut self) -> ParseResult<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(ParseError::TooDeep {
                span: self.current().span,
            });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn parse_ternary(&mut self) -> ParseResult<Expr> {
        self.enter()?;
        let condition = self.parse_binary_expression(OperatorPrecedence::LogicalOr.level())?;
        let expr = if self.optional_token(TokenKind::Question) {
            let true_value = self.parse_ternary()?;
            self.expect_token(TokenKind::Colon)?;
            let false_value = self.parse_ternary()?;
            Expr::Ternary {
                condition: Box::new(condition),
                true_value: Box::new(true_value),
                false_value: Box::new(false_value),
            }
        } else {
            condition
        };
        self.leave();
        Ok(expr)
    }

    fn parse_binary_expression(&mut self, min_precedence: u8) -> ParseResult<Expr> {
        let mut left = self.parse_unary_expression()?;

        loop {
            let token = self.current();
            let Some(precedence) = token.precedence.filter(|_| token.is(TokenKind::Operator)) else {
                break;
            };
            if precedence < min_precedence {
                break;
            }
            let Some(operator) = BinaryOperator::from_text(&token.value) else {
                return Err(self.unexpected());
            };
            self.next_token();
            let right = self.parse_binary_expression(precedence + 1)?;
            left = Expr::binary(left, operator, right);
        }

        Ok(left)
    }

    fn parse_unary_expression(&mut self) -> ParseResult<Expr> {
        let token = self.current();
        if token.is(TokenKind::Operator) {
            if let Some(operator) = UnaryOperator::from_text(&token.value) {
                self.next_token();
                self.enter()?;
                let operand = self.parse_unary_expression()?;
                self.leave();
                return Ok(Expr::Unary {
                    operator,
                    operand: Box::new(operand),
                });
            }
        }
        let primary = self.parse_primary_expression()?;
        self.parse_postfix_chain(primary)
    }

    fn parse_primary_expression(&mut self) -> ParseResult<Expr> {
        let token = self.current();
        match token.kind {
            TokenKind::LParen => {
                self.next_token();
                let inner = self.parse_ternary()?;
                self.expect_token(TokenKind::RParen)?;
                Ok(Expr::Parentheses {
                    inner: Box::new(inner),
                })
            }
            TokenKind::LBracket => self.parse_array_literal(),
            TokenKind::LBrace => self.parse_object_literal(),
            TokenKind::Number => {
                let value = parse_number(token)?;
                self.next_token();
                Ok(Expr::literal(value))
            }
            TokenKind::String => {
                let value = token.value.clone();
                self.next_token();
                Ok(Expr::literal(value))
            }
            TokenKind::Keyword => {
                let value = keyword_value(&token.value);
                self.next_token();
                Ok(Expr::Literal { value })
            }
            TokenKind::Identifier => {
                if self.peek(1).is(TokenKind::LParen) {
                    // Free function calls are not part of the language.
                    self.next_token();
                    return Err(self.unexpected());
                }
                self.parse_property_path()
            }
            TokenKind::Eof => Err(ParseError::Expected {
                expected: "expression".to_string(),
                found: token.describe(),
                span: token.span,
            }),
            _ => Err(self.unexpected()),
        }
    }

    fn parse_array_literal(&mut self) -> ParseResult<Expr> {
        self.expect_token(TokenKind::LBracket)?;
        let mut elements = Vec::new();
        while !self.current().is(TokenKind::RBracket) {
            elements.push(self.parse_ternary()?);
            if !self.optional_token(TokenKind::Comma) {
                break;
            }
        }
        self.expect_token(TokenKind::RBracket)?;
        Ok(Expr::Array { elements })
    }

    fn parse_object_literal(&mut self) -> ParseResult<Expr> {
        self.expect_token(TokenKind::LBrace)?;
        let mut pairs = Vec::new();
        while !self.current().is(TokenKind::RBrace) {
            let token = self.current();
            let key = match token.kind {
                TokenKind::Identifier | TokenKind::Keyword | TokenKind::String => {
                    token.value.clone()
                }
                TokenKind::Number => match parse_number(token)? {
                    Value::Number(n) => number_to_string(n),
                    _ => token.value.clone(),
                },
                _ => {
                    return Err(ParseError::Expected {
                        expected: "property name".to_string(),
                        found: token.describe(),
                        span: token.span,
                    })
                }
            };
            self.next_token();
            self.expect_token(TokenKind::Colon)?;
            let value = self.parse_ternary()?;
            pairs.push(ObjectPair { key, value });
            if !self.optional_token(TokenKind::Comma) {
                break;
            }
        }
        self.expect_token(TokenKind::RBrace)?;
        Ok(Expr::Object { pairs })
    }

    /// An identifier followed by any number of `.name` and `[...]` steps,
    /// collected into one path. Stops before `.name(` so the postfix chain
    /// can build the method call.
    fn parse_property_path(&mut self) -> ParseResult<Expr> {
        let mut segments = vec![PropertySegment::Key(self.current().value.clone())];
        self.next_token();

        loop {
            match self.current().kind {
                TokenKind::Dot => {
                    let name = self.peek(1);
                    if !is_property_name(name) {
                        return Err(missing_property_name(name));
                    }
                    if self.peek(2).is(TokenKind::LParen) {
                        break;
                    }
                    segments.push(PropertySegment::Key(name.value.clone()));
                    self.next_token();
                    self.next_token();
                }
                TokenKind::LBracket => {
                    self.next_token();
                    let index = self.parse_ternary()?;
                    self.expect_token(TokenKind::RBracket)?;
                    let segment = match index.as_literal_segment() {
                        Some(rbind_core::PathSegment::Index(i)) => PropertySegment::Index(i),
                        Some(rbind_core::PathSegment::Key(k)) => PropertySegment::Key(k),
                        None => PropertySegment::Computed(Box::new(index)),
                    };
                    segments.push(segment);
                }
                _ => break,
            }
        }

        Ok(Expr::Property(PropertyPath::new(segments)))
    }

    /// Postfix steps after a primary: `[index]`, `.member`, `.method(args)`.
    fn parse_postfix_chain(&mut self, mut expr: Expr) -> ParseResult<Expr> {
        loop {
            match self.current().kind {
                TokenKind::LBracket => {
                    self.next_token();
                    let index = self.parse_ternary()?;
                    self.expect_token(TokenKind::RBracket)?;
                    expr = Expr::Index {
                        object: Box::new(expr),
                        index: Box::new(index),
                    };
                }
                TokenKind::Dot => {
                    let name = self.peek(1);
                    if !is_property_name(name) {
                        return Err(missing_property_name(name));
                    }
                    let name = name.value.clone();
                    self.next_token();
                    self.next_token();
                    if self.current().is(TokenKind::LParen) {
                        let arguments = self.parse_arguments()?;
                        expr = Expr::MethodCall {
                            object: Box::new(expr),
                            method: name,
                            arguments,
                        };
                    } else {
                        expr = Expr::Member {
                            object: Box::new(expr),
                            property: name,
                        };
                    }
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_arguments(&mut self) -> ParseResult<Vec<Expr>> {
        self.expect_token(TokenKind::LParen)?;
        let mut arguments = Vec::new();
        while !self.current().is(TokenKind::RParen) {
            arguments.push(self.parse_ternary()?);
            if !self.optional_token(TokenKind::Comma) {
                break;
            }
        }
        self.expect_token(TokenKind::RParen)?;
        Ok(arguments)
    }
}

fn is_property_name(token: &Token) -> bool {
    matches!(token.kind, TokenKind::Identifier | TokenKind::Keyword)
}

fn missing_property_name(token: &Token) -> ParseError {
    ParseError::MissingPropertyName {
        found: token.describe(),
        span: token.span,
    }
}

fn parse_number(token: &Token) -> ParseResult<Value> {
    token
        .value
        .parse::<f64>()
        .map(Value::Number)
        .map_err(|_| ParseError::UnexpectedToken {
            found: token.describe(),
            span: token.span,
        })
}

fn keyword_value(text: &str) -> Value {
    match text {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" => Value::Null,
        _ => Value::Undefined,
    }
}

/// Parse a token stream. `None` means the stream was empty.
pub fn parse(tokens: Vec<Token>) -> Result<Option<Expr>, ParseError> {
    Parser::new(tokens).parse()
}

/// Tokenize and parse `text`. Empty or whitespace-only input is an error,
/// since there is no expression to return.
pub fn parse_expression(text: &str) -> Result<Expr, ParseError> {
    parse_expression_with_depth(text, DEFAULT_MAX_DEPTH)
}

pub fn parse_expression_with_depth(text: &str, max_depth: u32) -> Result<Expr, ParseError> {
    let tokens = tokenize(text)?;
    let end = tokens.last().map_or(TextSpan::empty(0), |t| t.span);
    Parser::new(tokens)
        .with_max_depth(max_depth)
        .parse()?
        .ok_or(ParseError::Expected {
            expected: "expression".to_string(),
            found: "end of expression".to_string(),
            span: end,
        })
}
