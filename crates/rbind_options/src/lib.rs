//! rbind_options: Engine configuration.
//!
//! Options are read from a JSON document with camelCase keys. Every field
//! is optional and falls back to its default.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Engine options, matching the `rbind.json` schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct EngineOptions {
    // -- Caches --
    pub expression_cache_size: usize,
    pub binding_cache_size: usize,

    // -- Reactivity --
    pub exclusion_prefix: String,
    pub parent_token: String,

    // -- Reconciliation --
    pub simple_edit_ceiling: usize,
    pub small_edit_threshold: usize,

    // -- Parsing --
    pub extra_binding_types: Vec<String>,
    pub max_depth: u32,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            expression_cache_size: 1000,
            binding_cache_size: 1000,
            exclusion_prefix: "_".to_string(),
            parent_token: "$parent".to_string(),
            simple_edit_ceiling: 10,
            small_edit_threshold: 3,
            extra_binding_types: Vec::new(),
            max_depth: 200,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    #[error("cannot read options file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid options: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse options from a JSON string.
pub fn parse_options(content: &str) -> Result<EngineOptions, OptionsError> {
    Ok(serde_json::from_str(content)?)
}

/// Parse options from a file.
pub fn parse_options_file(path: impl AsRef<Path>) -> Result<EngineOptions, OptionsError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| OptionsError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_options(&content)
}
