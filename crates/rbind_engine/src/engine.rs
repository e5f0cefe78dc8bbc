//! The engine: cached parsing, evaluation, and per-stage settings.

use rbind_ast::node::Expr;
use rbind_binder::{ForeachResolver, PositionId, ScopeTree};
use rbind_core::value::Value;
use rbind_evaluator::{DataScope, EvalError, Evaluator, ScopeResolver};
use rbind_options::EngineOptions;
use rbind_parser::{BindingPair, BindingTypes, ParseError};
use rbind_reactive::ReactiveConfig;
use rbind_reconciler::{ListReconciler, ReconcilePolicy};
use std::sync::Arc;
use thiserror::Error;

use crate::cache::{BindingCache, CacheStats, ExpressionCache};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Owns the parse caches and the settings every stage shares.
#[derive(Debug)]
pub struct Engine {
    options: EngineOptions,
    expressions: ExpressionCache,
    bindings: BindingCache,
}

impl Engine {
    pub fn new(options: EngineOptions) -> Self {
        let types = BindingTypes::with_extra(options.extra_binding_types.iter().cloned());
        Self {
            expressions: ExpressionCache::new(options.expression_cache_size, options.max_depth),
            bindings: BindingCache::new(options.binding_cache_size, types),
            options,
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    // ========================================================================
    // Parsing
    // ========================================================================

    pub fn parse_expression(&mut self, text: &str) -> Result<Arc<Expr>, ParseError> {
        self.expressions.get_or_parse(text)
    }

    pub fn parse_bindings(&mut self, text: &str) -> Result<Arc<[BindingPair]>, ParseError> {
        self.bindings.get_or_parse(text)
    }

    pub fn expression_stats(&self) -> CacheStats {
        self.expressions.stats()
    }

    pub fn binding_stats(&self) -> CacheStats {
        self.bindings.stats()
    }

    pub fn binding_types(&self) -> &BindingTypes {
        self.bindings.types()
    }

    // ========================================================================
    // Evaluation
    // ========================================================================

    /// Parse (through the cache) and evaluate `text`.
    pub fn evaluate(
        &mut self,
        text: &str,
        scope: &dyn DataScope,
        resolver: Option<&dyn ScopeResolver>,
    ) -> Result<Value, EngineError> {
        let expr = self.parse_expression(text)?;
        Ok(self.evaluate_expr(&expr, scope, resolver)?)
    }

    pub fn evaluate_expr(
        &self,
        expr: &Expr,
        scope: &dyn DataScope,
        resolver: Option<&dyn ScopeResolver>,
    ) -> Result<Value, EvalError> {
        Evaluator::new(scope)
            .with_resolver(resolver)
            .with_max_depth(self.options.max_depth)
            .evaluate(expr)
    }

    // ========================================================================
    // Stage settings
    // ========================================================================

    /// A resolver for `position` using the configured parent token.
    pub fn resolver<'t>(&self, tree: &'t ScopeTree, position: PositionId) -> ForeachResolver<'t> {
        ForeachResolver::new(tree, position).with_parent_token(self.options.parent_token.clone())
    }

    pub fn reactive_config(&self) -> ReactiveConfig {
        ReactiveConfig {
            exclusion_prefix: self.options.exclusion_prefix.clone(),
        }
    }

    pub fn reconcile_policy(&self) -> ReconcilePolicy {
        ReconcilePolicy {
            simple_edit_ceiling: self.options.simple_edit_ceiling,
            small_edit_threshold: self.options.small_edit_threshold,
        }
    }

    pub fn list_reconciler(&self) -> ListReconciler {
        ListReconciler::new(self.reconcile_policy())
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}
