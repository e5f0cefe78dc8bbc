//! Order-independent serialization and hashing of array items.

use indexmap::IndexMap;
use rbind_core::value::{number_to_string, Value};
use rustc_hash::{FxBuildHasher, FxHashMap};

/// Content hash → index of the item in the array it was taken from.
pub type HashSnapshot = IndexMap<String, usize, FxBuildHasher>;

/// JSON-like serialization with object keys sorted, so that two objects
/// with the same members in a different order serialize identically.
pub fn stable_stringify(value: &Value) -> String {
    match value {
        Value::Undefined => "undefined".to_string(),
        _ => {
            let mut out = String::new();
            write_value(&mut out, value);
            out
        }
    }
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Undefined | Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) if n.is_finite() => out.push_str(&number_to_string(*n)),
        Value::Number(_) => out.push_str("null"),
        Value::String(s) => out.push_str(&serde_json::Value::String(s.clone()).to_string()),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item);
            }
            out.push(']');
        }
        Value::Object(members) => {
            let mut keys: Vec<&String> = members
                .iter()
                .filter(|(_, v)| !v.is_undefined())
                .map(|(k, _)| k)
                .collect();
            keys.sort_by(|a, b| a.encode_utf16().cmp(b.encode_utf16()));
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&serde_json::Value::String(key.clone()).to_string());
                out.push(':');
                write_value(out, &members[key.as_str()]);
            }
            out.push('}');
        }
    }
}

/// djb2 over UTF-16 code units, wrapped to 32 bits, as lowercase hex.
pub fn stable_hash(text: &str) -> String {
    let hash = text
        .encode_utf16()
        .fold(5381u32, |hash, unit| hash.wrapping_mul(33).wrapping_add(u32::from(unit)));
    format!("{:x}", hash)
}

/// Hash of an item plus its ordinal: how many identical items precede it
/// in the same array. Distinct items always have ordinal 0, so an item
/// keeps its hash when the array is reordered.
pub fn content_hash(item: &Value, ordinal: usize) -> String {
    hash_with_ordinal(&stable_stringify(item), ordinal)
}

fn hash_with_ordinal(serialized: &str, ordinal: usize) -> String {
    stable_hash(&format!("{}|{}", ordinal, serialized))
}

/// Hash every item of `items`.
pub fn hash_snapshot(items: &[Value]) -> HashSnapshot {
    let mut seen: FxHashMap<String, usize> = FxHashMap::default();
    let mut snapshot = HashSnapshot::with_capacity_and_hasher(items.len(), FxBuildHasher);
    for (index, item) in items.iter().enumerate() {
        let serialized = stable_stringify(item);
        let ordinal = seen.entry(serialized.clone()).or_insert(0);
        snapshot.insert(hash_with_ordinal(&serialized, *ordinal), index);
        *ordinal += 1;
    }
    snapshot
}
