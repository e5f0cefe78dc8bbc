//! Dependency discovery for derived values.
//!
//! Each derived value without declared dependencies is computed once
//! against a scope that records which top-level fields it reads. Only the
//! branches taken during that single call are seen, so a value that reads
//! a field conditionally may be missing that dependency.

use rbind_core::collections::OrderedMultiMap;
use rbind_core::path::PathSegment;
use rbind_core::value::Value;
use rbind_evaluator::DataScope;
use std::cell::RefCell;

use crate::derived::DerivedSet;

/// Source field → names of the derived values that read it.
#[derive(Debug, Clone, Default)]
pub struct DependencyMap {
    fields: OrderedMultiMap<String, String>,
}

impl DependencyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `derived` reads `field`. Duplicates are ignored.
    pub fn add(&mut self, field: impl Into<String>, derived: impl Into<String>) {
        self.fields.insert(field.into(), derived.into());
    }

    pub fn dependents_of(&self, field: &str) -> &[String] {
        self.fields.get(field).unwrap_or(&[])
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(field, _)| field.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields.iter().map(|(field, names)| (field.as_str(), names))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A read-only scope over the plain root that records top-level reads.
struct RecordingScope<'a> {
    root: &'a Value,
    derived: &'a DerivedSet,
    reads: RefCell<Vec<String>>,
    computing: RefCell<Vec<String>>,
}

impl RecordingScope<'_> {
    fn record(&self, field: &str) {
        let mut reads = self.reads.borrow_mut();
        if !reads.iter().any(|r| r == field) {
            reads.push(field.to_string());
        }
    }
}

impl DataScope for RecordingScope<'_> {
    fn lookup(&self, segments: &[PathSegment]) -> Value {
        let Some(first) = segments.first() else {
            return self.root.clone();
        };
        let field = first.as_key();
        self.record(&field);

        // A derived value reading another one sees that value computed
        // through this same recording scope.
        if let Some(other) = self.derived.get(&field) {
            if self.computing.borrow().iter().any(|n| *n == field) {
                return Value::Undefined;
            }
            self.computing.borrow_mut().push(field.to_string());
            let value = other.compute(self);
            self.computing.borrow_mut().pop();
            return value.lookup(&segments[1..]);
        }
        self.root.lookup(segments)
    }
}

/// Build the field → dependents map for every derived value.
pub fn compute_dependencies(derived: &DerivedSet, root: &Value) -> DependencyMap {
    let mut map = DependencyMap::new();
    for entry in derived.iter() {
        if let Some(fields) = entry.dependencies() {
            for field in fields {
                map.add(field.clone(), entry.name());
            }
            continue;
        }
        let scope = RecordingScope {
            root,
            derived,
            reads: RefCell::new(Vec::new()),
            computing: RefCell::new(vec![entry.name().to_string()]),
        };
        entry.compute(&scope);
        for field in scope.reads.into_inner() {
            map.add(field, entry.name());
        }
    }
    tracing::debug!(fields = map.len(), "computed derived-value dependencies");
    map
}

/// The array field presumed to back the derived list `name`: the first
/// field, in map order, that holds an array in `root` and lists `name` as a
/// dependent. Falls back to `name` itself.
pub fn infer_array_root(map: &DependencyMap, root: &Value, name: &str) -> String {
    map.iter()
        .find(|(field, dependents)| {
            dependents.iter().any(|d| d == name)
                && matches!(
                    root.get_segment(&PathSegment::Key(field.to_string())),
                    Some(Value::Array(_))
                )
        })
        .map_or_else(|| name.to_string(), |(field, _)| field.to_string())
}
