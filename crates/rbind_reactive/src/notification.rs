//! Change notifications.

use rbind_core::value::Value;
use std::fmt;

/// An accepted write: `path` now holds `new_value` instead of `old_value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub path: Vec<String>,
    pub old_value: Value,
    pub new_value: Value,
}

/// An array mutation, with the whole array before and after.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayChange {
    pub path: Vec<String>,
    pub old_value: Value,
    pub new_value: Value,
    pub method: ArrayMethod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrayMethod {
    Push,
    Pop,
    Shift,
    Unshift,
    Splice,
    Sort,
    Reverse,
}

impl ArrayMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            ArrayMethod::Push => "push",
            ArrayMethod::Pop => "pop",
            ArrayMethod::Shift => "shift",
            ArrayMethod::Unshift => "unshift",
            ArrayMethod::Splice => "splice",
            ArrayMethod::Sort => "sort",
            ArrayMethod::Reverse => "reverse",
        }
    }
}

impl fmt::Display for ArrayMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What subscribers receive. An array mutation produces an `Array`
/// notification followed by a `Change` for the same path.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Change(Change),
    Array(ArrayChange),
}

impl Notification {
    pub fn path(&self) -> &[String] {
        match self {
            Notification::Change(c) => &c.path,
            Notification::Array(a) => &a.path,
        }
    }

    /// The top-level field the notification is about.
    pub fn field(&self) -> Option<&str> {
        self.path().first().map(String::as_str)
    }
}
