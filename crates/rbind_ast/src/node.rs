//! Expression AST node definitions.

use crate::operators::{BinaryOperator, OperatorCategory, UnaryOperator};
use rbind_core::path::PathSegment;
use rbind_core::value::{number_to_string, Value};
use serde::Serialize;
use std::fmt;

/// An expression node. Every child is owned by its parent, so a tree is
/// acyclic and carries no evaluation-time state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Expr {
    Literal {
        value: Value,
    },
    /// An identifier-rooted path such as `todos[0].title`, resolved against
    /// the data scope at evaluation time.
    Property(PropertyPath),
    Parentheses {
        inner: Box<Expr>,
    },
    Array {
        elements: Vec<Expr>,
    },
    Object {
        pairs: Vec<ObjectPair>,
    },
    #[serde(rename_all = "camelCase")]
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    Member {
        object: Box<Expr>,
        property: String,
    },
    MethodCall {
        object: Box<Expr>,
        method: String,
        arguments: Vec<Expr>,
    },
    #[serde(rename_all = "camelCase")]
    Ternary {
        condition: Box<Expr>,
        true_value: Box<Expr>,
        false_value: Box<Expr>,
    },
    Logical(BinaryExpr),
    Comparison(BinaryExpr),
    Arithmetic(BinaryExpr),
    Unary {
        operator: UnaryOperator,
        operand: Box<Expr>,
    },
}

/// The operands of a `logical`, `comparison`, or `arithmetic` node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinaryExpr {
    pub left: Box<Expr>,
    pub operator: BinaryOperator,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectPair {
    pub key: String,
    pub value: Expr,
}

impl Expr {
    pub fn literal(value: impl Into<Value>) -> Self {
        Expr::Literal {
            value: value.into(),
        }
    }

    /// Build the binary node for `operator`, tagged by its category.
    pub fn binary(left: Expr, operator: BinaryOperator, right: Expr) -> Self {
        let node = BinaryExpr {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        };
        match operator.category() {
            OperatorCategory::Logical => Expr::Logical(node),
            OperatorCategory::Comparison => Expr::Comparison(node),
            OperatorCategory::Arithmetic => Expr::Arithmetic(node),
        }
    }

    /// The node tag, as it appears in serialized trees.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::Literal { .. } => "literal",
            Expr::Property(_) => "property",
            Expr::Parentheses { .. } => "parentheses",
            Expr::Array { .. } => "array",
            Expr::Object { .. } => "object",
            Expr::Index { .. } => "index",
            Expr::Member { .. } => "member",
            Expr::MethodCall { .. } => "methodCall",
            Expr::Ternary { .. } => "ternary",
            Expr::Logical(_) => "logical",
            Expr::Comparison(_) => "comparison",
            Expr::Arithmetic(_) => "arithmetic",
            Expr::Unary { .. } => "unary",
        }
    }

    /// Whether this node is a string or number literal, the only bracket
    /// contents a property path keeps as a plain segment.
    pub fn as_literal_segment(&self) -> Option<PathSegment> {
        match self {
            Expr::Literal {
                value: Value::String(s),
            } => Some(PathSegment::from_text(s)),
            Expr::Literal {
                value: Value::Number(n),
            } if *n >= 0.0 && n.fract() == 0.0 => Some(PathSegment::Index(*n as usize)),
            _ => None,
        }
    }

    /// Number of nodes on the longest root-to-leaf chain, counting the
    /// bracket expressions of a property path as its children. This is the
    /// recursion depth an evaluator reaches on the tree.
    pub fn depth(&self) -> u32 {
        let mut deepest = 0;
        let mut stack = vec![(self, 1u32)];
        while let Some((expr, level)) = stack.pop() {
            deepest = deepest.max(level);
            let next = level + 1;
            match expr {
                Expr::Literal { .. } => {}
                Expr::Property(path) => {
                    for segment in &path.segments {
                        if let PropertySegment::Computed(inner) = segment {
                            stack.push((inner.as_ref(), next));
                        }
                    }
                }
                Expr::Parentheses { inner } => stack.push((inner.as_ref(), next)),
                Expr::Array { elements } => stack.extend(elements.iter().map(|e| (e, next))),
                Expr::Object { pairs } => stack.extend(pairs.iter().map(|p| (&p.value, next))),
                Expr::Index { object, index } => {
                    stack.push((object.as_ref(), next));
                    stack.push((index.as_ref(), next));
                }
                Expr::Member { object, .. } => stack.push((object.as_ref(), next)),
                Expr::MethodCall {
                    object, arguments, ..
                } => {
                    stack.push((object.as_ref(), next));
                    stack.extend(arguments.iter().map(|a| (a, next)));
                }
                Expr::Ternary {
                    condition,
                    true_value,
                    false_value,
                } => {
                    stack.push((condition.as_ref(), next));
                    stack.push((true_value.as_ref(), next));
                    stack.push((false_value.as_ref(), next));
                }
                Expr::Logical(node) | Expr::Comparison(node) | Expr::Arithmetic(node) => {
                    stack.push((node.left.as_ref(), next));
                    stack.push((node.right.as_ref(), next));
                }
                Expr::Unary { operand, .. } => stack.push((operand.as_ref(), next)),
            }
        }
        deepest
    }
}

/// One step of a property path as written in source.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertySegment {
    Index(usize),
    Key(String),
    /// A non-literal bracket expression, e.g. the `sel.id` in `rows[sel.id]`.
    Computed(Box<Expr>),
}

/// A property path with its normalized source text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyPath {
    /// Dot/bracket-normalized text, e.g. `todos[0].title`.
    pub path: String,
    #[serde(skip)]
    pub segments: Vec<PropertySegment>,
}

impl PropertyPath {
    pub fn new(segments: Vec<PropertySegment>) -> Self {
        let path = format_property_segments(&segments);
        Self { path, segments }
    }

    /// Whether every segment is known without evaluation.
    pub fn is_static(&self) -> bool {
        self.segments
            .iter()
            .all(|s| !matches!(s, PropertySegment::Computed(_)))
    }

    /// The segments as plain path segments, if the path is static.
    pub fn static_segments(&self) -> Option<Vec<PathSegment>> {
        self.segments
            .iter()
            .map(|s| match s {
                PropertySegment::Index(i) => Some(PathSegment::Index(*i)),
                PropertySegment::Key(k) => Some(PathSegment::Key(k.clone())),
                PropertySegment::Computed(_) => None,
            })
            .collect()
    }

    /// The root identifier.
    pub fn root(&self) -> Option<&str> {
        match self.segments.first() {
            Some(PropertySegment::Key(k)) => Some(k),
            _ => None,
        }
    }
}

fn format_property_segments(segments: &[PropertySegment]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            PropertySegment::Index(i) => {
                out.push('[');
                out.push_str(&i.to_string());
                out.push(']');
            }
            PropertySegment::Key(key) if is_identifier_text(key) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(key);
            }
            PropertySegment::Key(key) => {
                out.push('[');
                out.push_str(&quote_string(key));
                out.push(']');
            }
            PropertySegment::Computed(expr) => {
                out.push('[');
                out.push_str(&expr.to_string());
                out.push(']');
            }
        }
    }
    out
}

fn is_identifier_text(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

fn quote_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for ch in text.chars() {
        if ch == '\'' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('\'');
    out
}

/// Re-serializes an expression into source text that parses back to an
/// equal tree (modulo redundant parentheses).
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal { value } => match value {
                Value::String(s) => f.write_str(&quote_string(s)),
                Value::Number(n) => f.write_str(&number_to_string(*n)),
                Value::Undefined => f.write_str("undefined"),
                Value::Null => f.write_str("null"),
                Value::Bool(b) => write!(f, "{}", b),
                other => write!(f, "{}", other.to_json()),
            },
            Expr::Property(p) => f.write_str(&p.path),
            Expr::Parentheses { inner } => write!(f, "({})", inner),
            Expr::Array { elements } => {
                f.write_str("[")?;
                write_list(f, elements)?;
                f.write_str("]")
            }
            Expr::Object { pairs } => {
                f.write_str("{")?;
                for (i, pair) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    if is_identifier_text(&pair.key) {
                        write!(f, "{}: {}", pair.key, pair.value)?;
                    } else {
                        write!(f, "{}: {}", quote_string(&pair.key), pair.value)?;
                    }
                }
                f.write_str("}")
            }
            Expr::Index { object, index } => write!(f, "{}[{}]", object, index),
            Expr::Member { object, property } => write!(f, "{}.{}", object, property),
            Expr::MethodCall {
                object,
                method,
                arguments,
            } => {
                write!(f, "{}.{}(", object, method)?;
                write_list(f, arguments)?;
                f.write_str(")")
            }
            Expr::Ternary {
                condition,
                true_value,
                false_value,
            } => write!(f, "{} ? {} : {}", condition, true_value, false_value),
            Expr::Logical(b) | Expr::Comparison(b) | Expr::Arithmetic(b) => {
                write!(f, "{} {} {}", b.left, b.operator, b.right)
            }
            Expr::Unary { operator, operand } => write!(f, "{}{}", operator, operand),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Expr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(k: &str) -> PropertySegment {
        PropertySegment::Key(k.to_string())
    }

    #[test]
    fn test_property_path_text() {
        let path = PropertyPath::new(vec![key("todos"), PropertySegment::Index(0), key("title")]);
        assert_eq!(path.path, "todos[0].title");
        assert!(path.is_static());
        assert_eq!(path.root(), Some("todos"));
    }

    #[test]
    fn test_computed_segment_is_reserialized() {
        let inner = Expr::Property(PropertyPath::new(vec![key("sel"), key("id")]));
        let path = PropertyPath::new(vec![key("rows"), PropertySegment::Computed(Box::new(inner))]);
        assert_eq!(path.path, "rows[sel.id]");
        assert!(!path.is_static());
        assert!(path.static_segments().is_none());
    }

    #[test]
    fn test_binary_category_tagging() {
        let sum = Expr::binary(Expr::literal(1), BinaryOperator::Add, Expr::literal(2));
        assert_eq!(sum.kind_name(), "arithmetic");
        let cmp = Expr::binary(Expr::literal(1), BinaryOperator::LooseEq, Expr::literal("1"));
        assert_eq!(cmp.kind_name(), "comparison");
        assert_eq!(cmp.to_string(), "1 == '1'");
    }

    #[test]
    fn test_serialized_tag() {
        let expr = Expr::MethodCall {
            object: Box::new(Expr::Property(PropertyPath::new(vec![key("tags")]))),
            method: "includes".to_string(),
            arguments: vec![Expr::literal("x")],
        };
        let json = serde_json::to_value(&expr).unwrap();
        assert_eq!(json["type"], "methodCall");
        assert_eq!(json["object"]["type"], "property");
        assert_eq!(json["object"]["path"], "tags");
    }
}
