//! Expression evaluation.

use rbind_ast::node::*;
use rbind_ast::operators::BinaryOperator;
use rbind_core::path::{format_path, parse_path, PathSegment};
use rbind_core::value::{Object, Value};
use thiserror::Error;

use crate::methods::{call_array_method, ALLOWED_METHODS};
use crate::ops::{apply_binary, apply_unary, property_key};
use crate::scope::{DataScope, ResolveError, ResolvedPath, ScopeResolver};

/// Maximum evaluation depth, matching the parser's nesting limit.
const DEFAULT_MAX_DEPTH: u32 = 200;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("expression is nested too deeply to evaluate")]
    TooDeep,
}

type EvalResult = Result<Value, EvalError>;

/// Walks an expression tree against a data scope. Holds no state between
/// calls apart from the recursion counter, so one evaluator can evaluate
/// many trees.
pub struct Evaluator<'a> {
    scope: &'a dyn DataScope,
    resolver: Option<&'a dyn ScopeResolver>,
    depth: u32,
    max_depth: u32,
}

impl<'a> Evaluator<'a> {
    pub fn new(scope: &'a dyn DataScope) -> Self {
        Self {
            scope,
            resolver: None,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_resolver(mut self, resolver: Option<&'a dyn ScopeResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn evaluate(&mut self, expr: &Expr) -> EvalResult {
        self.depth += 1;
        if self.depth > self.max_depth {
            self.depth -= 1;
            return Err(EvalError::TooDeep);
        }
        let result = self.evaluate_node(expr);
        self.depth -= 1;
        result
    }

    fn evaluate_node(&mut self, expr: &Expr) -> EvalResult {
        match expr {
            Expr::Literal { value } => Ok(value.clone()),
            Expr::Property(path) => self.evaluate_property(path),
            Expr::Parentheses { inner } => self.evaluate(inner),
            Expr::Array { elements } => {
                let items = elements
                    .iter()
                    .map(|e| self.evaluate(e))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Array(items))
            }
            Expr::Object { pairs } => {
                let mut members = Object::with_capacity(pairs.len());
                for pair in pairs {
                    let value = self.evaluate(&pair.value)?;
                    members.insert(pair.key.clone(), value);
                }
                Ok(Value::Object(members))
            }
            Expr::Index { object, index } => {
                let object = self.evaluate(object)?;
                if object.is_nullish() {
                    return Ok(Value::Undefined);
                }
                let key = self.evaluate(index)?;
                Ok(object.property(&property_key(&key)))
            }
            Expr::Member { object, property } => {
                let object = self.evaluate(object)?;
                if object.is_nullish() {
                    return Ok(Value::Undefined);
                }
                Ok(object.property(&PathSegment::Key(property.clone())))
            }
            Expr::MethodCall {
                object,
                method,
                arguments,
            } => self.evaluate_method_call(object, method, arguments),
            Expr::Ternary {
                condition,
                true_value,
                false_value,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.evaluate(true_value)
                } else {
                    self.evaluate(false_value)
                }
            }
            Expr::Logical(node) => self.evaluate_logical(node),
            Expr::Comparison(node) | Expr::Arithmetic(node) => {
                let left = self.evaluate(&node.left)?;
                let right = self.evaluate(&node.right)?;
                Ok(apply_binary(node.operator, &left, &right))
            }
            Expr::Unary { operator, operand } => {
                let operand = self.evaluate(operand)?;
                Ok(apply_unary(*operator, &operand))
            }
        }
    }

    /// `&&` yields `false` for a falsy left side, `||` yields `true` for a
    /// truthy one; otherwise the right side's value. The right side is
    /// evaluated only when it decides the result.
    fn evaluate_logical(&mut self, node: &BinaryExpr) -> EvalResult {
        let left = self.evaluate(&node.left)?.is_truthy();
        match (node.operator, left) {
            (BinaryOperator::And, false) => Ok(Value::Bool(false)),
            (BinaryOperator::Or, true) => Ok(Value::Bool(true)),
            _ => self.evaluate(&node.right),
        }
    }

    fn evaluate_property(&mut self, path: &PropertyPath) -> EvalResult {
        let segments = match path.static_segments() {
            Some(segments) => segments,
            None => self.compute_segments(&path.segments)?,
        };

        let Some(resolver) = self.resolver else {
            return Ok(self.scope.lookup(&segments));
        };

        let text = if path.is_static() {
            path.path.clone()
        } else {
            format_path(&segments)
        };
        match resolver.resolve_scoped_path(&text)? {
            ResolvedPath::Index(index) => Ok(Value::Number(index as f64)),
            ResolvedPath::Path(resolved) => Ok(self.scope.lookup(&parse_path(&resolved))),
        }
    }

    /// Evaluate the bracket expressions of a path into plain segments.
    fn compute_segments(&mut self, segments: &[PropertySegment]) -> Result<Vec<PathSegment>, EvalError> {
        segments
            .iter()
            .map(|segment| match segment {
                PropertySegment::Index(i) => Ok(PathSegment::Index(*i)),
                PropertySegment::Key(k) => Ok(PathSegment::Key(k.clone())),
                PropertySegment::Computed(expr) => Ok(property_key(&self.evaluate(expr)?)),
            })
            .collect()
    }

    fn evaluate_method_call(&mut self, object: &Expr, method: &str, arguments: &[Expr]) -> EvalResult {
        let receiver = self.evaluate(object)?;
        let Value::Array(items) = &receiver else {
            tracing::warn!(
                method,
                receiver = receiver.type_name(),
                "method calls are only allowed on arrays"
            );
            return Ok(Value::Undefined);
        };
        if !ALLOWED_METHODS.contains(&method) {
            tracing::warn!(
                method,
                allowed = ?ALLOWED_METHODS,
                "unsupported array method"
            );
            return Ok(Value::Undefined);
        }
        let arguments = arguments
            .iter()
            .map(|a| self.evaluate(a))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(call_array_method(items, method, &arguments).unwrap_or(Value::Undefined))
    }
}

/// Evaluate `expr` against `scope`, remapping property paths through
/// `resolver` when one is given.
pub fn evaluate(
    expr: &Expr,
    scope: &dyn DataScope,
    resolver: Option<&dyn ScopeResolver>,
) -> Result<Value, EvalError> {
    Evaluator::new(scope).with_resolver(resolver).evaluate(expr)
}
