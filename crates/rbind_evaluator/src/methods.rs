//! The array methods an expression may call.

use rbind_core::value::Value;

use crate::ops::{same_value_zero, strict_equals};

pub(crate) const ALLOWED_METHODS: &[&str] = &["includes", "indexOf", "length", "join"];

/// Call `method` on `items`. `None` if the method is not allowed.
pub(crate) fn call_array_method(items: &[Value], method: &str, arguments: &[Value]) -> Option<Value> {
    let first = arguments.first().unwrap_or(&Value::Undefined);
    let result = match method {
        "includes" => Value::Bool(items.iter().any(|item| same_value_zero(item, first))),
        "indexOf" => {
            let position = items.iter().position(|item| strict_equals(item, first));
            Value::Number(position.map_or(-1.0, |p| p as f64))
        }
        "length" => Value::Number(items.len() as f64),
        "join" => {
            let separator = match first {
                Value::Undefined => ",".to_string(),
                other => other.to_display_string(),
            };
            let parts: Vec<String> = items
                .iter()
                .map(|item| {
                    if item.is_nullish() {
                        String::new()
                    } else {
                        item.to_display_string()
                    }
                })
                .collect();
            Value::String(parts.join(&separator))
        }
        _ => return None,
    };
    Some(result)
}
