//! Binding strings: comma-separated `type: expression` pairs.
//!
//! Splitting is done on raw text, before tokenizing, because a binding's
//! expression may itself contain colons (ternaries, object literals) and
//! commas (array literals, method arguments). Only delimiters outside of
//! brackets and quotes count, and a colon separates a type only when the
//! text before it names a known binding type.

use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::error::ParseError;

/// Binding types recognized without configuration.
pub const BUILTIN_BINDING_TYPES: &[&str] = &[
    "text", "html", "value", "checked", "visible", "hidden", "if", "ifnot", "foreach", "with",
    "attr", "class", "css", "style", "enable", "disable", "click", "submit", "event", "options",
    "focus", "model", "key", "ref", "template",
    // DOM events, usable directly or with modifiers (`keyup.enter`).
    "change", "input", "blur", "keyup", "keydown", "keypress", "dblclick", "mouseover",
    "mouseout", "mouseenter", "mouseleave",
];

/// One `type: target` pair. `binding_type` keeps any dotted modifiers
/// (`click.prevent`); `target` is the untouched expression text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BindingPair {
    #[serde(rename = "type")]
    pub binding_type: String,
    pub target: String,
}

impl BindingPair {
    /// The type without modifiers.
    pub fn base_type(&self) -> &str {
        self.binding_type
            .split('.')
            .next()
            .unwrap_or(&self.binding_type)
    }

    pub fn modifiers(&self) -> impl Iterator<Item = &str> {
        self.binding_type.split('.').skip(1)
    }
}

/// The set of binding type keywords a parser accepts.
#[derive(Debug, Clone)]
pub struct BindingTypes {
    names: FxHashSet<String>,
}

impl BindingTypes {
    pub fn builtin() -> Self {
        Self {
            names: BUILTIN_BINDING_TYPES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// The built-in set plus `extra`.
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut types = Self::builtin();
        types.names.extend(extra.into_iter().map(Into::into));
        types
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

impl Default for BindingTypes {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Split `text` into binding pairs.
pub fn parse_binding_string(
    text: &str,
    types: &BindingTypes,
) -> Result<Vec<BindingPair>, ParseError> {
    let mut pairs = Vec::new();
    let mut start = 0;
    let commas = top_level_positions(text, ',')?;
    for end in commas.into_iter().chain(std::iter::once(text.len())) {
        let segment = text[start..end].trim();
        start = end + 1;
        if segment.is_empty() {
            continue;
        }
        pairs.push(split_pair(segment, types)?);
    }
    Ok(pairs)
}

fn split_pair(segment: &str, types: &BindingTypes) -> Result<BindingPair, ParseError> {
    let colon = top_level_positions(segment, ':')?.first().copied();
    let Some(colon) = colon else {
        return Err(ParseError::MissingBindingType {
            text: segment.to_string(),
        });
    };
    let head = segment[..colon].trim();
    if !is_binding_type(head, types) {
        return Err(ParseError::MissingBindingType {
            text: segment.to_string(),
        });
    }
    let target = segment[colon + 1..].trim();
    if target.is_empty() {
        return Err(ParseError::EmptyBindingTarget {
            binding_type: head.to_string(),
        });
    }
    Ok(BindingPair {
        binding_type: head.to_string(),
        target: target.to_string(),
    })
}

/// `name` or `name.modifier.modifier`, where `name` is a known type.
fn is_binding_type(head: &str, types: &BindingTypes) -> bool {
    let mut parts = head.split('.');
    let Some(base) = parts.next() else {
        return false;
    };
    types.contains(base)
        && parts.all(|m| {
            !m.is_empty() && m.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-')
        })
}

/// Byte offsets of every `delimiter` outside brackets and quotes.
fn top_level_positions(text: &str, delimiter: char) -> Result<Vec<usize>, ParseError> {
    let mut positions = Vec::new();
    let mut closers: Vec<char> = Vec::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (offset, ch) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '\'' | '"' => quote = Some(ch),
            '(' => closers.push(')'),
            '[' => closers.push(']'),
            '{' => closers.push('}'),
            ')' | ']' | '}' => {
                if closers.pop() != Some(ch) {
                    return Err(ParseError::UnbalancedBinding {
                        text: text.to_string(),
                    });
                }
            }
            c if c == delimiter && closers.is_empty() => positions.push(offset),
            _ => {}
        }
    }

    if quote.is_some() {
        return Err(ParseError::UnterminatedBindingString {
            text: text.to_string(),
        });
    }
    if !closers.is_empty() {
        return Err(ParseError::UnbalancedBinding {
            text: text.to_string(),
        });
    }
    Ok(positions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_level_positions_skip_nested() {
        let text = "a, f(b, c), [d, e], 'x,y', z";
        let positions = top_level_positions(text, ',').unwrap();
        assert_eq!(positions.len(), 4);
        assert!(positions.iter().all(|&p| &text[p..p + 1] == ","));
    }

    #[test]
    fn test_escaped_quote_does_not_close() {
        assert_eq!(top_level_positions(r"'a\',b', c", ',').unwrap(), vec![7]);
    }

    #[test]
    fn test_modifier_shape() {
        let types = BindingTypes::builtin();
        assert!(is_binding_type("click", &types));
        assert!(is_binding_type("click.prevent.stop", &types));
        assert!(!is_binding_type("click.", &types));
        assert!(!is_binding_type("a ? b", &types));
    }
}
