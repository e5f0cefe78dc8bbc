//! Operator semantics with script-style coercion.
//!
//! Containers are owned values here, so strict equality on them compares
//! structure rather than reference identity.

use rbind_ast::operators::{BinaryOperator, UnaryOperator};
use rbind_core::path::PathSegment;
use rbind_core::value::{number_to_string, Value};
use std::cmp::Ordering;

/// Numeric conversion (`ToNumber`).
pub fn to_number(value: &Value) -> f64 {
    match value {
        Value::Undefined => f64::NAN,
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Number(n) => *n,
        Value::String(s) => string_to_number(s),
        Value::Array(_) | Value::Object(_) => string_to_number(&value.to_display_string()),
    }
}

fn string_to_number(text: &str) -> f64 {
    let text = text.trim();
    if text.is_empty() {
        return 0.0;
    }
    let radix = match text.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return u64::from_str_radix(&text[2..], radix).map_or(f64::NAN, |n| n as f64);
    }
    match text {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    // Rust also accepts "inf" and "nan", which scripts do not.
    if !text
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'))
    {
        return f64::NAN;
    }
    text.parse::<f64>().unwrap_or(f64::NAN)
}

/// Primitive conversion: containers become their string form.
pub fn to_primitive(value: &Value) -> Value {
    if value.is_container() {
        Value::String(value.to_display_string())
    } else {
        value.clone()
    }
}

/// `===`: no coercion. `NaN` is unequal to itself and `0 === -0`.
pub fn strict_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| strict_equals(l, r))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(k, v)| y.get(k).is_some_and(|w| strict_equals(v, w)))
        }
        _ => a == b,
    }
}

/// `==`: the abstract equality comparison.
pub fn loose_equals(a: &Value, b: &Value) -> bool {
    if std::mem::discriminant(a) == std::mem::discriminant(b) {
        return strict_equals(a, b);
    }
    match (a, b) {
        (x, y) if x.is_nullish() && y.is_nullish() => true,
        (x, y) if x.is_nullish() || y.is_nullish() => false,
        (Value::Number(x), Value::String(_)) => *x == to_number(b),
        (Value::String(_), Value::Number(y)) => to_number(a) == *y,
        (Value::Bool(_), _) => loose_equals(&Value::Number(to_number(a)), b),
        (_, Value::Bool(_)) => loose_equals(a, &Value::Number(to_number(b))),
        (x, y) if x.is_container() && !y.is_container() => loose_equals(&to_primitive(x), y),
        (x, y) if !x.is_container() && y.is_container() => loose_equals(x, &to_primitive(y)),
        _ => false,
    }
}

/// `includes` matching: strict equality except that `NaN` matches `NaN`.
pub fn same_value_zero(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) if x.is_nan() && y.is_nan() => true,
        _ => strict_equals(a, b),
    }
}

/// `+`: concatenation when either primitive is a string, else addition.
pub fn add(a: &Value, b: &Value) -> Value {
    let (a, b) = (to_primitive(a), to_primitive(b));
    if matches!(a, Value::String(_)) || matches!(b, Value::String(_)) {
        let mut text = a.to_display_string();
        text.push_str(&b.to_display_string());
        Value::String(text)
    } else {
        Value::Number(to_number(&a) + to_number(&b))
    }
}

/// Relational comparison. `None` when either side converts to `NaN`.
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    let (a, b) = (to_primitive(a), to_primitive(b));
    if let (Value::String(x), Value::String(y)) = (&a, &b) {
        return Some(x.encode_utf16().cmp(y.encode_utf16()));
    }
    to_number(&a).partial_cmp(&to_number(&b))
}

/// Apply a comparison or arithmetic operator to evaluated operands.
/// Logical operators short-circuit and are handled by the evaluator.
pub fn apply_binary(operator: BinaryOperator, left: &Value, right: &Value) -> Value {
    match operator {
        BinaryOperator::StrictEq => Value::Bool(strict_equals(left, right)),
        BinaryOperator::StrictNe => Value::Bool(!strict_equals(left, right)),
        BinaryOperator::LooseEq => Value::Bool(loose_equals(left, right)),
        BinaryOperator::LooseNe => Value::Bool(!loose_equals(left, right)),
        BinaryOperator::Lt => Value::Bool(compare(left, right) == Some(Ordering::Less)),
        BinaryOperator::Gt => Value::Bool(compare(left, right) == Some(Ordering::Greater)),
        BinaryOperator::Le => Value::Bool(matches!(
            compare(left, right),
            Some(Ordering::Less | Ordering::Equal)
        )),
        BinaryOperator::Ge => Value::Bool(matches!(
            compare(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        )),
        BinaryOperator::Add => add(left, right),
        BinaryOperator::Sub => Value::Number(to_number(left) - to_number(right)),
        BinaryOperator::Mul => Value::Number(to_number(left) * to_number(right)),
        BinaryOperator::Div => Value::Number(to_number(left) / to_number(right)),
        BinaryOperator::Rem => Value::Number(to_number(left) % to_number(right)),
        BinaryOperator::And => Value::Bool(left.is_truthy() && right.is_truthy()),
        BinaryOperator::Or => Value::Bool(left.is_truthy() || right.is_truthy()),
    }
}

pub fn apply_unary(operator: UnaryOperator, operand: &Value) -> Value {
    match operator {
        UnaryOperator::Not => Value::Bool(!operand.is_truthy()),
        UnaryOperator::Minus => Value::Number(-to_number(operand)),
        UnaryOperator::Plus => Value::Number(to_number(operand)),
    }
}

/// Convert an evaluated index into a path segment (`ToPropertyKey`).
pub fn property_key(value: &Value) -> PathSegment {
    match value {
        Value::Number(n) if n.is_finite() && *n >= 0.0 && n.fract() == 0.0 => {
            PathSegment::Index(*n as usize)
        }
        Value::Number(n) => PathSegment::Key(number_to_string(*n)),
        Value::String(s) => PathSegment::from_text(s),
        other => PathSegment::Key(other.to_display_string()),
    }
}
