//! Parse caches keyed by trimmed source text.

use rbind_ast::node::Expr;
use rbind_core::collections::FifoCache;
use rbind_parser::{parse_binding_string, parse_expression_with_depth, BindingPair, BindingTypes, ParseError};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

/// A FIFO cache of parse results. Failed parses are not stored.
#[derive(Debug)]
struct ParseCache<V: ?Sized> {
    name: &'static str,
    entries: FifoCache<String, Arc<V>>,
    stats: CacheStats,
}

impl<V: ?Sized> ParseCache<V> {
    fn new(name: &'static str, capacity: usize) -> Self {
        Self {
            name,
            entries: FifoCache::new(capacity),
            stats: CacheStats::default(),
        }
    }

    fn get_or_parse<F>(&mut self, text: &str, parse: F) -> Result<Arc<V>, ParseError>
    where
        F: FnOnce(&str) -> Result<Arc<V>, ParseError>,
    {
        let key = text.trim();
        if let Some(hit) = self.entries.get(key) {
            self.stats.hits += 1;
            return Ok(Arc::clone(hit));
        }
        self.stats.misses += 1;
        let parsed = parse(key)?;
        if let Some((evicted, _)) = self.entries.insert(key.to_string(), Arc::clone(&parsed)) {
            self.stats.evictions += 1;
            tracing::debug!(cache = self.name, evicted = %evicted, "evicted oldest entry");
        }
        Ok(parsed)
    }
}

/// Parsed expression trees.
#[derive(Debug)]
pub struct ExpressionCache {
    inner: ParseCache<Expr>,
    max_depth: u32,
}

impl ExpressionCache {
    pub fn new(capacity: usize, max_depth: u32) -> Self {
        Self {
            inner: ParseCache::new("expression", capacity),
            max_depth,
        }
    }

    pub fn get_or_parse(&mut self, text: &str) -> Result<Arc<Expr>, ParseError> {
        let max_depth = self.max_depth;
        self.inner
            .get_or_parse(text, |key| Ok(Arc::new(parse_expression_with_depth(key, max_depth)?)))
    }

    pub fn contains(&self, text: &str) -> bool {
        self.inner.entries.contains_key(text.trim())
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.stats
    }

    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.inner.entries.clear();
    }
}

/// Parsed binding-pair lists.
#[derive(Debug)]
pub struct BindingCache {
    inner: ParseCache<[BindingPair]>,
    types: BindingTypes,
}

impl BindingCache {
    pub fn new(capacity: usize, types: BindingTypes) -> Self {
        Self {
            inner: ParseCache::new("binding", capacity),
            types,
        }
    }

    pub fn get_or_parse(&mut self, text: &str) -> Result<Arc<[BindingPair]>, ParseError> {
        let types = &self.types;
        self.inner
            .get_or_parse(text, |key| Ok(parse_binding_string(key, types)?.into()))
    }

    pub fn types(&self) -> &BindingTypes {
        &self.types
    }

    pub fn contains(&self, text: &str) -> bool {
        self.inner.entries.contains_key(text.trim())
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.stats
    }

    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.inner.entries.clear();
    }
}
