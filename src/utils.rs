//! Small helpers shared across the bridge: hashing, string cleanup, and
//! log truncation.

use sha2::{Digest, Sha256};

/// Sha-256 digest of a string as lowercase hex.
///
/// Used to derive the stable article `uid` from its title, so the same
/// review keeps the same cache key across runs even if its URL changes.
pub fn sha256_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

/// Remove every newline character from a string.
///
/// Feed readers render the content fragment as a single HTML blob; embedded
/// newlines only add noise to the serialized feed.
pub fn strip_newlines(s: &str) -> String {
    s.replace('\n', "")
}

/// Capitalize the first character of a string.
pub fn upcase(s: &str) -> String {
    let mut c = s.chars();
    match c.next() {
        None => String::new(),
        Some(f) => f.to_uppercase().collect::<String>() + c.as_str(),
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` characters with an ellipsis and
/// byte count indicator appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((idx, _)) => format!("{}…(+{} bytes)", &s[..idx], s.len() - idx),
    }
}
