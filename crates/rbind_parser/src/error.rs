//! Parse errors.

use miette::{Diagnostic, LabeledSpan};
use rbind_core::text::TextSpan;
use rbind_scanner::ScanError;
use std::fmt;
use thiserror::Error;

/// A malformed expression or binding string.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("expected {expected}, found {found}")]
    Expected {
        expected: String,
        found: String,
        span: TextSpan,
    },

    #[error("expected a property name after '.', found {found}")]
    MissingPropertyName { found: String, span: TextSpan },

    #[error("unexpected {found}")]
    UnexpectedToken { found: String, span: TextSpan },

    #[error("expression is nested too deeply")]
    TooDeep { span: TextSpan },

    #[error("unbalanced brackets in binding string '{text}'")]
    UnbalancedBinding { text: String },

    #[error("unterminated string in binding string '{text}'")]
    UnterminatedBindingString { text: String },

    #[error("binding '{text}' does not start with a known binding type")]
    MissingBindingType { text: String },

    #[error("binding '{binding_type}' has an empty expression")]
    EmptyBindingTarget { binding_type: String },
}

impl ParseError {
    /// The source location of the offending token, if the error has one.
    pub fn span(&self) -> Option<TextSpan> {
        match self {
            ParseError::Scan(err) => Some(err.span()),
            ParseError::Expected { span, .. }
            | ParseError::MissingPropertyName { span, .. }
            | ParseError::UnexpectedToken { span, .. }
            | ParseError::TooDeep { span } => Some(*span),
            _ => None,
        }
    }

    fn code_name(&self) -> &'static str {
        match self {
            ParseError::Scan(_) => "unterminated_string",
            ParseError::Expected { .. } => "expected_token",
            ParseError::MissingPropertyName { .. } => "missing_property_name",
            ParseError::UnexpectedToken { .. } => "unexpected_token",
            ParseError::TooDeep { .. } => "too_deep",
            ParseError::UnbalancedBinding { .. } => "unbalanced_binding",
            ParseError::UnterminatedBindingString { .. } => "unterminated_binding_string",
            ParseError::MissingBindingType { .. } => "missing_binding_type",
            ParseError::EmptyBindingTarget { .. } => "empty_binding_target",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ParseError::Scan(_) => "string starts here",
            ParseError::MissingPropertyName { .. } => "property name expected here",
            ParseError::TooDeep { .. } => "nesting limit reached here",
            _ => "here",
        }
    }
}

impl Diagnostic for ParseError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(format!("rbind::parse::{}", self.code_name())))
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.span()?;
        Some(Box::new(std::iter::once(LabeledSpan::at(
            span.to_range(),
            self.label(),
        ))))
    }
}
