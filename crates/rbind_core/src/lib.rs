//! rbind_core: Core types for the rbind binding engine.
//!
//! Provides the dynamic value model, property paths, text spans, and
//! the bounded collections used throughout the pipeline.

pub mod collections;
pub mod path;
pub mod text;
pub mod value;

// Re-export commonly used types
pub use collections::{FifoCache, OrderedMultiMap};
pub use path::{format_path, parse_path, PathSegment};
pub use text::TextSpan;
pub use value::Value;
