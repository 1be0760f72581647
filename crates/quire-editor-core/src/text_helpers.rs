//! Char-offset string helpers.
//!
//! Text element offsets are in chars (Unicode scalar values), NOT bytes.
//! These helpers do the char → byte translation for in-place edits.

use std::ops::Range;

use crate::config::PLACEHOLDER;

/// Number of chars in `s`.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte index of the char at `char_offset`, or `s.len()` past the end.
pub fn byte_index(s: &str, char_offset: usize) -> usize {
    s.char_indices()
        .nth(char_offset)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Insert `text` at a char offset.
pub fn insert_at(s: &mut String, char_offset: usize, text: &str) {
    let at = byte_index(s, char_offset);
    s.insert_str(at, text);
}

/// Remove a char range, returning the removed text.
pub fn remove_range(s: &mut String, range: Range<usize>) -> String {
    let start = byte_index(s, range.start);
    let end = byte_index(s, range.end.max(range.start));
    s.drain(start..end).collect()
}

/// Split at a char offset, leaving the head in `s` and returning the tail.
pub fn split_off(s: &mut String, char_offset: usize) -> String {
    let at = byte_index(s, char_offset);
    s.split_off(at)
}

/// True for a non-empty string made only of placeholders.
pub fn is_placeholder_only(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c == PLACEHOLDER)
}

/// Convert a char offset to a UTF-16 offset (native selection offsets).
pub fn char_to_utf16(s: &str, char_offset: usize) -> usize {
    s.chars().take(char_offset).map(char::len_utf16).sum()
}

/// Convert a UTF-16 offset to a char offset, rounding down inside a
/// surrogate pair.
pub fn utf16_to_char(s: &str, utf16_offset: usize) -> usize {
    let mut units = 0;
    for (i, c) in s.chars().enumerate() {
        let next = units + c.len_utf16();
        if next > utf16_offset {
            return i;
        }
        units = next;
    }
    char_len(s)
}
