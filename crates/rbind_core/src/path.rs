//! Property paths.
//!
//! A path is the address of a value inside a data graph, written as
//! `todos[2].done` or `user.address['zip code']`. The evaluator, the scope
//! resolver, and the reactive store all share this segment representation.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// One step of a property path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Index(usize),
    Key(String),
}

impl PathSegment {
    /// Build a segment from raw text, treating all-digit text as an index.
    pub fn from_text(text: &str) -> Self {
        if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(index) = text.parse::<usize>() {
                return PathSegment::Index(index);
            }
        }
        PathSegment::Key(text.to_string())
    }

    /// The property key this segment names (indices as decimal text).
    pub fn as_key(&self) -> Cow<'_, str> {
        match self {
            PathSegment::Index(i) => Cow::Owned(i.to_string()),
            PathSegment::Key(k) => Cow::Borrowed(k),
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathSegment::Index(i) => Some(*i),
            PathSegment::Key(_) => None,
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Index(i) => write!(f, "{}", i),
            PathSegment::Key(k) => write!(f, "{}", k),
        }
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

impl From<&str> for PathSegment {
    fn from(text: &str) -> Self {
        PathSegment::from_text(text)
    }
}

/// Split a dotted/bracketed path into segments.
///
/// Quoted bracket contents are taken verbatim; empty segments are dropped.
pub fn parse_path(path: &str) -> Vec<PathSegment> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = path.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '.' => flush(&mut current, &mut segments),
            '[' => {
                flush(&mut current, &mut segments);
                let mut inner = String::new();
                let mut quote: Option<char> = None;
                let mut quoted = false;
                for c in chars.by_ref() {
                    match quote {
                        Some(q) if c == q => quote = None,
                        Some(_) => inner.push(c),
                        None if c == ']' => break,
                        None if c == '\'' || c == '"' => {
                            quote = Some(c);
                            quoted = true;
                        }
                        None => inner.push(c),
                    }
                }
                if quoted {
                    segments.push(PathSegment::Key(inner));
                } else {
                    let trimmed = inner.trim();
                    if !trimmed.is_empty() {
                        segments.push(PathSegment::from_text(trimmed));
                    }
                }
            }
            c if c.is_whitespace() && current.is_empty() => {}
            c => current.push(c),
        }
    }
    flush(&mut current, &mut segments);
    segments
}

fn flush(current: &mut String, segments: &mut Vec<PathSegment>) {
    let text = current.trim();
    if !text.is_empty() {
        segments.push(PathSegment::from_text(text));
    }
    current.clear();
}

/// Serialize segments back into path text: keys dotted, indices bracketed.
/// Keys that are not plain identifiers are written as quoted brackets so that
/// `parse_path(format_path(s)) == s`.
pub fn format_path(segments: &[PathSegment]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            PathSegment::Index(i) => {
                out.push('[');
                out.push_str(&i.to_string());
                out.push(']');
            }
            PathSegment::Key(key) if is_plain_key(key) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(key);
            }
            PathSegment::Key(key) => {
                let quote = if key.contains('\'') { '"' } else { '\'' };
                out.push('[');
                out.push(quote);
                out.push_str(key);
                out.push(quote);
                out.push(']');
            }
        }
    }
    out
}

fn is_plain_key(key: &str) -> bool {
    !key.is_empty()
        && !key.bytes().all(|b| b.is_ascii_digit())
        && key
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Path segments as plain strings, the form carried by change notifications.
pub fn path_to_strings(segments: &[PathSegment]) -> Vec<String> {
    segments.iter().map(|s| s.as_key().into_owned()).collect()
}
