//! Per-position binding evaluation.

use rbind_core::value::Value;
use rbind_diagnostics::messages;
use rbind_diagnostics::{Diagnostic, DiagnosticCollection};
use rbind_evaluator::{DataScope, ScopeResolver};
use rbind_parser::BindingPair;

use crate::engine::Engine;

/// A binding whose value differs from the previous pass.
#[derive(Debug, Clone, PartialEq)]
pub struct BindingUpdate {
    pub pair: BindingPair,
    /// `None` on the first successful evaluation.
    pub previous: Option<Value>,
    pub value: Value,
}

#[derive(Debug, Clone)]
struct BindingEntry {
    pair: BindingPair,
    value: Option<Value>,
}

/// The bindings declared at one template position, with the last value of
/// each.
#[derive(Debug, Clone)]
pub struct BindingSet {
    source: String,
    entries: Vec<BindingEntry>,
    /// Set when the binding string itself failed to parse.
    source_error: Option<Diagnostic>,
    diagnostics: DiagnosticCollection,
}

impl BindingSet {
    /// Parse `text` through the engine's binding cache. A malformed
    /// binding string yields an empty set carrying the diagnostic.
    pub fn new(engine: &mut Engine, text: &str) -> Self {
        let mut set = Self {
            source: text.to_string(),
            entries: Vec::new(),
            source_error: None,
            diagnostics: DiagnosticCollection::new(),
        };
        match engine.parse_bindings(text) {
            Ok(pairs) => {
                set.entries = pairs
                    .iter()
                    .map(|pair| BindingEntry {
                        pair: pair.clone(),
                        value: None,
                    })
                    .collect();
            }
            Err(err) => {
                tracing::warn!(binding = text, error = %err, "invalid binding string");
                let reason = err.to_string();
                let diagnostic = Diagnostic::new(&messages::BINDING_STRING_INVALID, &[text, reason.as_str()])
                    .with_source(text, err.span());
                set.diagnostics.add(diagnostic.clone());
                set.source_error = Some(diagnostic);
            }
        }
        set
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn pairs(&self) -> impl Iterator<Item = &BindingPair> {
        self.entries.iter().map(|e| &e.pair)
    }

    /// The last value of the first binding of `binding_type`.
    pub fn value(&self, binding_type: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|e| e.pair.binding_type == binding_type)
            .and_then(|e| e.value.as_ref())
    }

    /// Diagnostics from construction and the latest [`update`](Self::update).
    pub fn diagnostics(&self) -> &DiagnosticCollection {
        &self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Evaluate every binding and return those whose value changed. A
    /// binding that fails keeps its previous value and adds a diagnostic;
    /// the others are still evaluated.
    pub fn update(
        &mut self,
        engine: &mut Engine,
        scope: &dyn DataScope,
        resolver: Option<&dyn ScopeResolver>,
    ) -> Vec<BindingUpdate> {
        self.diagnostics.clear();
        if let Some(diagnostic) = &self.source_error {
            self.diagnostics.add(diagnostic.clone());
        }

        let mut updates = Vec::new();
        for entry in &mut self.entries {
            let pair = &entry.pair;
            let expr = match engine.parse_expression(&pair.target) {
                Ok(expr) => expr,
                Err(err) => {
                    tracing::warn!(binding = %pair.binding_type, error = %err, "invalid binding expression");
                    let reason = err.to_string();
                    self.diagnostics.add(
                        Diagnostic::new(&messages::EXPRESSION_INVALID, &[pair.target.as_str(), reason.as_str()])
                            .with_source(pair.target.as_str(), err.span())
                            .with_binding(pair.binding_type.as_str()),
                    );
                    keep_value(&mut self.diagnostics, pair);
                    continue;
                }
            };
            let value = match engine.evaluate_expr(&expr, scope, resolver) {
                Ok(value) => value,
                Err(err) => {
                    tracing::warn!(binding = %pair.binding_type, error = %err, "binding evaluation failed");
                    let reason = err.to_string();
                    self.diagnostics.add(
                        Diagnostic::new(&messages::EVALUATION_FAILED, &[pair.target.as_str(), reason.as_str()])
                            .with_source(pair.target.as_str(), None)
                            .with_binding(pair.binding_type.as_str()),
                    );
                    keep_value(&mut self.diagnostics, pair);
                    continue;
                }
            };

            if entry.value.as_ref().is_some_and(|old| old.same_value(&value)) {
                continue;
            }
            let previous = entry.value.replace(value.clone());
            updates.push(BindingUpdate {
                pair: entry.pair.clone(),
                previous,
                value,
            });
        }
        updates
    }
}

fn keep_value(diagnostics: &mut DiagnosticCollection, pair: &BindingPair) {
    diagnostics.add(
        Diagnostic::new(&messages::VALUE_KEPT, &[pair.binding_type.as_str()]).with_binding(pair.binding_type.as_str()),
    );
}
