//! Derived (computed) values.

use indexmap::IndexMap;
use rbind_ast::node::Expr;
use rbind_core::value::Value;
use rbind_evaluator::{evaluate, DataScope};
use std::fmt;
use std::sync::Arc;

enum DerivedKind {
    Expression(Arc<Expr>),
    Closure(Box<dyn Fn(&dyn DataScope) -> Value>),
}

/// A named value computed from other fields.
pub struct Derived {
    name: String,
    kind: DerivedKind,
    dependencies: Option<Vec<String>>,
}

impl Derived {
    pub fn expression(name: impl Into<String>, expr: impl Into<Arc<Expr>>) -> Self {
        Self {
            name: name.into(),
            kind: DerivedKind::Expression(expr.into()),
            dependencies: None,
        }
    }

    pub fn closure<F>(name: impl Into<String>, compute: F) -> Self
    where
        F: Fn(&dyn DataScope) -> Value + 'static,
    {
        Self {
            name: name.into(),
            kind: DerivedKind::Closure(Box::new(compute)),
            dependencies: None,
        }
    }

    /// Declare the fields this value reads. Dependency analysis then uses
    /// this list instead of recording a call.
    pub fn with_dependencies<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dependencies(&self) -> Option<&[String]> {
        self.dependencies.as_deref()
    }

    /// Compute the value against `scope`. An evaluation error is logged and
    /// yields `Undefined`.
    pub fn compute(&self, scope: &dyn DataScope) -> Value {
        match &self.kind {
            DerivedKind::Closure(compute) => compute(scope),
            DerivedKind::Expression(expr) => match evaluate(expr, scope, None) {
                Ok(value) => value,
                Err(err) => {
                    tracing::warn!(name = %self.name, error = %err, "derived value failed to evaluate");
                    Value::Undefined
                }
            },
        }
    }
}

impl fmt::Debug for Derived {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            DerivedKind::Expression(expr) => expr.to_string(),
            DerivedKind::Closure(_) => "<closure>".to_string(),
        };
        f.debug_struct("Derived")
            .field("name", &self.name)
            .field("kind", &kind)
            .field("dependencies", &self.dependencies)
            .finish()
    }
}

/// Derived values by name, in declaration order.
#[derive(Debug, Default)]
pub struct DerivedSet {
    entries: IndexMap<String, Derived>,
}

impl DerivedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a derived value.
    pub fn insert(&mut self, derived: Derived) {
        self.entries.insert(derived.name.clone(), derived);
    }

    pub fn with(mut self, derived: Derived) -> Self {
        self.insert(derived);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Derived> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Derived> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
