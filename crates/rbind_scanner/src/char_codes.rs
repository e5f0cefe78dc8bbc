//! Character classes used by the scanner.

use unicode_xid::UnicodeXID;

pub const SINGLE_QUOTE: char = '\'';
pub const DOUBLE_QUOTE: char = '"';
pub const BACKSLASH: char = '\\';
pub const DOT: char = '.';
pub const DOLLAR_SIGN: char = '$';
pub const UNDERSCORE: char = '_';

/// Operators matched before any single-character operator.
pub const THREE_CHAR_OPERATORS: &[&str] = &["===", "!=="];
pub const TWO_CHAR_OPERATORS: &[&str] = &["==", "!=", ">=", "<=", "&&", "||"];
pub const ONE_CHAR_OPERATORS: &[char] = &['+', '-', '*', '/', '%', '<', '>', '!'];

#[inline]
pub fn is_quote(ch: char) -> bool {
    ch == SINGLE_QUOTE || ch == DOUBLE_QUOTE
}

#[inline]
pub fn is_identifier_start(ch: char) -> bool {
    ch == DOLLAR_SIGN || ch == UNDERSCORE || ch.is_ascii_alphabetic() || UnicodeXID::is_xid_start(ch)
}

#[inline]
pub fn is_identifier_part(ch: char) -> bool {
    ch == DOLLAR_SIGN || ch == UNDERSCORE || ch.is_ascii_alphanumeric() || UnicodeXID::is_xid_continue(ch)
}
