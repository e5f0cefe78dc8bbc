//! Rewriting alias-relative paths into absolute ones.

use rbind_core::path::{format_path, PathSegment};
use rbind_evaluator::{ResolveError, ResolvedPath, ScopeResolver};
use rustc_hash::FxHashMap;

use crate::frame::{ForeachFrame, PositionId, ScopeTree};

pub const DEFAULT_PARENT_TOKEN: &str = "$parent";

/// A segment of a scoped path. Unquoted bracket contents (`rows[i]`) are
/// kept as names so an index alias can replace them.
#[derive(Debug, Clone, PartialEq)]
enum ScopedSegment {
    Name(String),
    Bracketed(String),
    Literal(PathSegment),
}

fn split_scoped(path: &str) -> Result<Vec<ScopedSegment>, ResolveError> {
    let invalid = || ResolveError::InvalidPath(path.to_string());
    let mut segments = Vec::new();
    let mut rest = path.trim();
    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix('[') {
            let close = after.find(']').ok_or_else(invalid)?;
            let inner = after[..close].trim();
            let quoted = inner.len() >= 2
                && (inner.starts_with('\'') && inner.ends_with('\'')
                    || inner.starts_with('"') && inner.ends_with('"'));
            if quoted {
                let key = &inner[1..inner.len() - 1];
                segments.push(ScopedSegment::Literal(PathSegment::Key(key.to_string())));
            } else {
                match PathSegment::from_text(inner) {
                    PathSegment::Index(i) => segments.push(ScopedSegment::Literal(PathSegment::Index(i))),
                    PathSegment::Key(k) if !k.is_empty() => segments.push(ScopedSegment::Bracketed(k)),
                    PathSegment::Key(_) => return Err(invalid()),
                }
            }
            rest = &after[close + 1..];
        } else if let Some(after) = rest.strip_prefix('.') {
            rest = after;
        } else {
            let end = rest.find(['.', '[']).unwrap_or(rest.len());
            let name = rest[..end].trim();
            match PathSegment::from_text(name) {
                PathSegment::Index(i) => segments.push(ScopedSegment::Literal(PathSegment::Index(i))),
                PathSegment::Key(k) => segments.push(ScopedSegment::Name(k)),
            }
            rest = &rest[end..];
        }
    }
    Ok(segments)
}

enum Substitution {
    Path(Vec<PathSegment>),
    Index(usize),
}

/// Alias table for `frames` (innermost first). Built outermost first, so
/// each frame's source path sees only the frames outside it and inner
/// aliases shadow outer ones.
fn build_aliases(frames: &[&ForeachFrame]) -> Result<FxHashMap<String, Substitution>, ResolveError> {
    let mut aliases = FxHashMap::default();
    for frame in frames.iter().rev() {
        let source = split_scoped(&frame.source_array_path)?;
        let mut item_path = apply_aliases(source, &aliases);
        item_path.push(PathSegment::Index(frame.index));
        aliases.insert(frame.item_alias.clone(), Substitution::Path(item_path));
        if let Some(alias) = &frame.index_alias {
            aliases.insert(alias.clone(), Substitution::Index(frame.index));
        }
    }
    Ok(aliases)
}

/// Replace alias segments. The first name may be an item or index alias;
/// bracketed names may only be index aliases.
fn apply_aliases(segments: Vec<ScopedSegment>, aliases: &FxHashMap<String, Substitution>) -> Vec<PathSegment> {
    let mut resolved = Vec::with_capacity(segments.len());
    for (i, segment) in segments.into_iter().enumerate() {
        match segment {
            ScopedSegment::Name(name) if i == 0 => match aliases.get(&name) {
                Some(Substitution::Path(path)) => resolved.extend(path.iter().cloned()),
                Some(Substitution::Index(index)) => resolved.push(PathSegment::Index(*index)),
                None => resolved.push(PathSegment::Key(name)),
            },
            ScopedSegment::Bracketed(name) => match aliases.get(&name) {
                Some(Substitution::Index(index)) => resolved.push(PathSegment::Index(*index)),
                _ => resolved.push(PathSegment::Key(name)),
            },
            ScopedSegment::Name(name) => resolved.push(PathSegment::Key(name)),
            ScopedSegment::Literal(segment) => resolved.push(segment),
        }
    }
    resolved
}

/// Rewrite `path`, written at `position`, into an absolute path.
///
/// Leading `parent_token` segments each drop the innermost remaining frame.
/// Climbing past the outermost frame is clamped with a warning. A path
/// that resolves to a lone index (an index alias) is returned as a number.
pub fn normalize_path(
    path: &str,
    tree: &ScopeTree,
    position: PositionId,
    parent_token: &str,
) -> Result<ResolvedPath, ResolveError> {
    let mut segments = split_scoped(path)?;
    let climbs = segments
        .iter()
        .take_while(|s| matches!(s, ScopedSegment::Name(n) if n == parent_token))
        .count();
    segments.drain(..climbs);

    let chain = tree.foreach_chain(position)?;
    let dropped = if climbs > chain.len() {
        tracing::warn!(
            path,
            %position,
            climbs,
            available = chain.len(),
            "parent climb exceeds the enclosing iterations; clamping"
        );
        chain.len()
    } else {
        climbs
    };

    let aliases = build_aliases(&chain[dropped..])?;
    let resolved = apply_aliases(segments, &aliases);
    if let [PathSegment::Index(index)] = resolved.as_slice() {
        return Ok(ResolvedPath::Index(*index));
    }
    Ok(ResolvedPath::Path(format_path(&resolved)))
}

/// The absolute path of the array iterated by the innermost frame at
/// `position`, with outer aliases resolved. `None` outside any iteration.
pub fn resolved_source_path(tree: &ScopeTree, position: PositionId) -> Result<Option<String>, ResolveError> {
    let chain = tree.foreach_chain(position)?;
    let Some((innermost, outer)) = chain.split_first() else {
        return Ok(None);
    };
    let aliases = build_aliases(outer)?;
    let source = apply_aliases(split_scoped(&innermost.source_array_path)?, &aliases);
    Ok(Some(format_path(&source)))
}

/// A [`ScopeResolver`] bound to one template position.
pub struct ForeachResolver<'a> {
    tree: &'a ScopeTree,
    position: PositionId,
    parent_token: String,
}

impl<'a> ForeachResolver<'a> {
    pub fn new(tree: &'a ScopeTree, position: PositionId) -> Self {
        Self {
            tree,
            position,
            parent_token: DEFAULT_PARENT_TOKEN.to_string(),
        }
    }

    pub fn with_parent_token(mut self, token: impl Into<String>) -> Self {
        self.parent_token = token.into();
        self
    }
}

impl ScopeResolver for ForeachResolver<'_> {
    fn resolve_scoped_path(&self, path: &str) -> Result<ResolvedPath, ResolveError> {
        normalize_path(path, self.tree, self.position, &self.parent_token)
    }
}
