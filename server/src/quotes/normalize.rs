//! Text Normalization
//!
//! Chat clients substitute "smart" punctuation as people type, so the same
//! quote arrives with different code points depending on the client. Mapping
//! those variants to ASCII before hashing makes the content id a pure
//! function of what the quote looks like.

use sha2::{Digest, Sha256};

/// Normalize quote text: trim surrounding whitespace and replace
/// platform-specific punctuation variants with ASCII equivalents.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.trim().chars() {
        match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => out.push('\''),
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => out.push('"'),
            '\u{2013}' | '\u{2014}' => out.push('-'),
            '\u{2026}' => out.push_str("..."),
            '\u{00A0}' => out.push(' '),
            _ => out.push(c),
        }
    }
    out
}

/// Content id of a normalized quote: SHA-256 hex digest.
pub fn quote_id(normalized: &str) -> String {
    hex::encode(Sha256::digest(normalized.as_bytes()))
}
