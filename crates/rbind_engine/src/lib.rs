//! rbind_engine: The binding engine.
//!
//! Ties the pipeline together: binding strings and expressions are parsed
//! once into bounded caches, then evaluated against a data scope on every
//! pass. A failing binding is reported and keeps its previous value.

mod bindings;
mod cache;
mod engine;

pub use bindings::{BindingSet, BindingUpdate};
pub use cache::{BindingCache, CacheStats, ExpressionCache};
pub use engine::{Engine, EngineError};
