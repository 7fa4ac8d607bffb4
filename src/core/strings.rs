//! Small string helpers shared by the DBC grammar and the record model.

use std::hash::{DefaultHasher, Hash, Hasher};

/// Stable hash of a column/signal name.
///
/// Signals cache this at construction and records store it next to every
/// field, so lookups compare a `u64` before touching the string.
pub fn name_hash(name: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    name.hash(&mut hasher);
    hasher.finish()
}

/// Returns the content of the first quoted segment (`"..."`), trimmed.
///
/// An opening quote without its closing partner yields `None`.
pub(crate) fn first_quoted(s: &str) -> Option<&str> {
    let open: usize = s.find('"')?;
    let rest: &str = &s[open + 1..];
    let close: usize = rest.find('"')?;
    Some(rest[..close].trim())
}

/// Splits `s` at the first occurrence of `delim`, requiring a non-empty head.
///
/// Mirrors the grammar's "delimiter must exist and must not be the first
/// character" rule; the head is returned trimmed, the tail untouched.
pub(crate) fn split_required(s: &str, delim: char) -> Option<(&str, &str)> {
    match s.find(delim) {
        Some(idx) if idx > 0 => Some((s[..idx].trim(), &s[idx + delim.len_utf8()..])),
        _ => None,
    }
}
