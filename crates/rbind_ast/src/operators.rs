//! Operators and their precedence.

use serde::Serialize;
use std::fmt;

/// Binary operator precedence levels, lowest to highest. Gaps in the
/// numbering leave room for operators the binding language does not have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum OperatorPrecedence {
    Lowest = 0,
    LogicalOr = 1,
    LogicalAnd = 2,
    Equality = 6,
    Relational = 7,
    Additive = 8,
    Multiplicative = 9,
    Unary = 10,
}

impl OperatorPrecedence {
    #[inline]
    pub fn level(self) -> u8 {
        self as u8
    }
}

/// Which evaluation family a binary node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OperatorCategory {
    Logical,
    Comparison,
    Arithmetic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BinaryOperator {
    #[serde(rename = "||")]
    Or,
    #[serde(rename = "&&")]
    And,
    #[serde(rename = "===")]
    StrictEq,
    #[serde(rename = "!==")]
    StrictNe,
    #[serde(rename = "==")]
    LooseEq,
    #[serde(rename = "!=")]
    LooseNe,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
    #[serde(rename = "%")]
    Rem,
}

impl BinaryOperator {
    pub fn from_text(text: &str) -> Option<Self> {
        Some(match text {
            "||" => BinaryOperator::Or,
            "&&" => BinaryOperator::And,
            "===" => BinaryOperator::StrictEq,
            "!==" => BinaryOperator::StrictNe,
            "==" => BinaryOperator::LooseEq,
            "!=" => BinaryOperator::LooseNe,
            "<" => BinaryOperator::Lt,
            ">" => BinaryOperator::Gt,
            "<=" => BinaryOperator::Le,
            ">=" => BinaryOperator::Ge,
            "+" => BinaryOperator::Add,
            "-" => BinaryOperator::Sub,
            "*" => BinaryOperator::Mul,
            "/" => BinaryOperator::Div,
            "%" => BinaryOperator::Rem,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOperator::Or => "||",
            BinaryOperator::And => "&&",
            BinaryOperator::StrictEq => "===",
            BinaryOperator::StrictNe => "!==",
            BinaryOperator::LooseEq => "==",
            BinaryOperator::LooseNe => "!=",
            BinaryOperator::Lt => "<",
            BinaryOperator::Gt => ">",
            BinaryOperator::Le => "<=",
            BinaryOperator::Ge => ">=",
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Rem => "%",
        }
    }

    pub fn precedence(self) -> OperatorPrecedence {
        match self {
            BinaryOperator::Or => OperatorPrecedence::LogicalOr,
            BinaryOperator::And => OperatorPrecedence::LogicalAnd,
            BinaryOperator::StrictEq
            | BinaryOperator::StrictNe
            | BinaryOperator::LooseEq
            | BinaryOperator::LooseNe => OperatorPrecedence::Equality,
            BinaryOperator::Lt | BinaryOperator::Gt | BinaryOperator::Le | BinaryOperator::Ge => {
                OperatorPrecedence::Relational
            }
            BinaryOperator::Add | BinaryOperator::Sub => OperatorPrecedence::Additive,
            BinaryOperator::Mul | BinaryOperator::Div | BinaryOperator::Rem => {
                OperatorPrecedence::Multiplicative
            }
        }
    }

    pub fn category(self) -> OperatorCategory {
        match self {
            BinaryOperator::Or | BinaryOperator::And => OperatorCategory::Logical,
            BinaryOperator::Add
            | BinaryOperator::Sub
            | BinaryOperator::Mul
            | BinaryOperator::Div
            | BinaryOperator::Rem => OperatorCategory::Arithmetic,
            _ => OperatorCategory::Comparison,
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UnaryOperator {
    #[serde(rename = "!")]
    Not,
    #[serde(rename = "-")]
    Minus,
    #[serde(rename = "+")]
    Plus,
}

impl UnaryOperator {
    pub fn from_text(text: &str) -> Option<Self> {
        match text {
            "!" => Some(UnaryOperator::Not),
            "-" => Some(UnaryOperator::Minus),
            "+" => Some(UnaryOperator::Plus),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOperator::Not => "!",
            UnaryOperator::Minus => "-",
            UnaryOperator::Plus => "+",
        }
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Binary precedence for operator text, or `None` if the text is not a
/// binary operator (`!` for instance).
pub fn binary_precedence(text: &str) -> Option<OperatorPrecedence> {
    BinaryOperator::from_text(text).map(BinaryOperator::precedence)
}
