//! Byte-string quoting for mtree tokens.
//!
//! An mtree line is a sequence of space-separated tokens, so any byte that
//! could be mistaken for a separator or for line syntax must be quoted.
//! Unsafe bytes are replaced by a `\ooo` three-digit octal escape; the
//! mapping is injective, so a reader can reconstruct the original bytes
//! exactly.

/// Returns whether a byte may appear unescaped in a token.
///
/// `#`, `=` and `\` are always quoted, as are space, control bytes and
/// everything outside printable ASCII.
fn is_safe(c: u8) -> bool {
    if c.is_ascii_alphanumeric() {
        return true;
    }
    if c == b'#' || c == b'=' || c == b'\\' {
        return false;
    }
    matches!(c, 33..=47 | 58..=64 | 91..=96 | 123..=126)
}

/// Append the quoted form of `raw` to `out`.
///
/// Safe runs are copied through unchanged; every other byte becomes a
/// 4-byte `\ooo` escape.
pub fn escape_into(out: &mut Vec<u8>, raw: &[u8]) {
    let mut start = 0;
    for (i, &c) in raw.iter().enumerate() {
        if is_safe(c) {
            continue;
        }
        out.extend_from_slice(&raw[start..i]);
        out.extend_from_slice(&[
            b'\\',
            (c / 64) + b'0',
            (c / 8 % 8) + b'0',
            (c % 8) + b'0',
        ]);
        start = i + 1;
    }
    out.extend_from_slice(&raw[start..]);
}

/// Quote `raw` into a freshly allocated token.
pub fn escape(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    escape_into(&mut out, raw);
    out
}
