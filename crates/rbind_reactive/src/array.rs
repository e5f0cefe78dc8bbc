//! Array mutation operations.

use rbind_core::value::Value;
use std::cmp::Ordering;

use crate::notification::ArrayMethod;

/// Ordering for [`ArrayOp::Sort`].
#[derive(Debug, Clone, Copy)]
pub enum SortOrder {
    /// Compare string forms by UTF-16 code units.
    Default,
    Comparator(fn(&Value, &Value) -> Ordering),
}

/// An in-place array mutation.
#[derive(Debug, Clone)]
pub enum ArrayOp {
    Push(Vec<Value>),
    Pop,
    Shift,
    Unshift(Vec<Value>),
    /// `start` counts from the end when negative. A missing `delete_count`
    /// removes everything from `start` on.
    Splice {
        start: i64,
        delete_count: Option<usize>,
        items: Vec<Value>,
    },
    Sort(SortOrder),
    Reverse,
}

impl ArrayOp {
    pub fn method(&self) -> ArrayMethod {
        match self {
            ArrayOp::Push(_) => ArrayMethod::Push,
            ArrayOp::Pop => ArrayMethod::Pop,
            ArrayOp::Shift => ArrayMethod::Shift,
            ArrayOp::Unshift(_) => ArrayMethod::Unshift,
            ArrayOp::Splice { .. } => ArrayMethod::Splice,
            ArrayOp::Sort(_) => ArrayMethod::Sort,
            ArrayOp::Reverse => ArrayMethod::Reverse,
        }
    }
}

/// The outcome of a mutation: the elements taken out and the new length.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayMutation {
    pub removed: Vec<Value>,
    pub length: usize,
}

pub(crate) fn apply(items: &mut Vec<Value>, op: ArrayOp) -> Vec<Value> {
    match op {
        ArrayOp::Push(values) => {
            items.extend(values);
            Vec::new()
        }
        ArrayOp::Pop => items.pop().into_iter().collect(),
        ArrayOp::Shift => {
            if items.is_empty() {
                Vec::new()
            } else {
                vec![items.remove(0)]
            }
        }
        ArrayOp::Unshift(values) => {
            items.splice(0..0, values);
            Vec::new()
        }
        ArrayOp::Splice {
            start,
            delete_count,
            items: inserted,
        } => {
            let len = items.len();
            let start = clamp_start(start, len);
            let count = delete_count.map_or(len - start, |d| d.min(len - start));
            items.splice(start..start + count, inserted).collect()
        }
        ArrayOp::Sort(order) => {
            sort(items, order);
            Vec::new()
        }
        ArrayOp::Reverse => {
            items.reverse();
            Vec::new()
        }
    }
}

fn clamp_start(start: i64, len: usize) -> usize {
    if start < 0 {
        len.saturating_sub(start.unsigned_abs() as usize)
    } else {
        (start as usize).min(len)
    }
}

/// Stable sort with `Undefined` elements always placed last.
fn sort(items: &mut [Value], order: SortOrder) {
    items.sort_by(|a, b| match (a.is_undefined(), b.is_undefined()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => match order {
            SortOrder::Default => a
                .to_display_string()
                .encode_utf16()
                .cmp(b.to_display_string().encode_utf16()),
            SortOrder::Comparator(compare) => compare(a, b),
        },
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nums(values: &[i32]) -> Vec<Value> {
        values.iter().map(|&n| Value::from(n)).collect()
    }

    #[test]
    fn test_splice_negative_start() {
        let mut items = nums(&[1, 2, 3, 4]);
        let removed = apply(
            &mut items,
            ArrayOp::Splice {
                start: -2,
                delete_count: Some(1),
                items: nums(&[9]),
            },
        );
        assert_eq!(removed, nums(&[3]));
        assert_eq!(items, nums(&[1, 2, 9, 4]));
    }

    #[test]
    fn test_splice_clamps() {
        let mut items = nums(&[1, 2]);
        let removed = apply(
            &mut items,
            ArrayOp::Splice {
                start: 5,
                delete_count: Some(3),
                items: nums(&[7]),
            },
        );
        assert!(removed.is_empty());
        assert_eq!(items, nums(&[1, 2, 7]));

        let removed = apply(
            &mut items,
            ArrayOp::Splice {
                start: -10,
                delete_count: None,
                items: Vec::new(),
            },
        );
        assert_eq!(removed, nums(&[1, 2, 7]));
        assert!(items.is_empty());
    }

    #[test]
    fn test_default_sort_is_string_order() {
        let mut items = vec![Value::from(10), Value::Undefined, Value::from(9), Value::from(1)];
        sort(&mut items, SortOrder::Default);
        assert_eq!(items, vec![Value::from(1), Value::from(10), Value::from(9), Value::Undefined]);
    }

    #[test]
    fn test_comparator_sort() {
        let mut items = nums(&[10, 9, 1]);
        sort(
            &mut items,
            SortOrder::Comparator(|a, b| {
                a.as_f64()
                    .partial_cmp(&b.as_f64())
                    .unwrap_or(Ordering::Equal)
            }),
        );
        assert_eq!(items, nums(&[1, 9, 10]));
    }

    #[test]
    fn test_shift_and_pop_on_empty() {
        let mut items = Vec::new();
        assert!(apply(&mut items, ArrayOp::Shift).is_empty());
        assert!(apply(&mut items, ArrayOp::Pop).is_empty());
    }
}
