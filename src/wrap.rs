//! Column-aware buffering and wrapping of logical mtree lines.
//!
//! Each entry is assembled into one logical line (name token followed by
//! ` key=value` tokens) in a pending buffer, then re-flowed into physical
//! lines at most [`MAX_LINE_LEN`] columns wide. Wrapping happens in two
//! stages: candidate breakpoints (the literal space separators past the
//! name column) are collected first, then a greedy pass packs segments and
//! emits ` \`-continuations. Breaks never fall inside a quoted token
//! because quoting removes every space from token bodies.

/// Width of the left-aligned name column.
pub(crate) const INDENT_NAME_LEN: usize = 15;
/// Maximum width of a physical line, including the ` \` continuation.
pub(crate) const MAX_LINE_LEN: usize = 80;

const CONTINUATION: &[u8] = b" \\\n";

/// The pending logical line for the entry currently being encoded.
#[derive(Debug, Default)]
pub(crate) struct LineBuffer {
    pub(crate) buf: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    pub fn push_str(&mut self, s: &str) {
        self.buf.extend_from_slice(s.as_bytes());
    }

    /// Align the buffer to the name column while the leading name token is
    /// still being built.
    ///
    /// A name longer than the column is flushed to `out` as a continued
    /// line and the attributes start on a fresh, fully indented line;
    /// otherwise the name is padded out to the column width in place.
    pub fn pad_to_name_column(&mut self, out: &mut Vec<u8>) {
        if self.buf.len() > INDENT_NAME_LEN {
            out.extend_from_slice(&self.buf);
            out.extend_from_slice(CONTINUATION);
            self.buf.clear();
        }
        self.buf.resize(INDENT_NAME_LEN, b' ');
    }

    /// Re-flow the completed logical line into `out` and clear the buffer.
    pub fn flush_wrapped(&mut self, out: &mut Vec<u8>) {
        reflow(&self.buf, out);
        self.buf.clear();
    }
}

/// Candidate cut positions: space separators past the name column.
///
/// Spaces inside the name column are padding, never separators.
fn breakpoints(line: &[u8]) -> Vec<usize> {
    if line.len() <= INDENT_NAME_LEN {
        return Vec::new();
    }
    line[INDENT_NAME_LEN + 1..]
        .iter()
        .enumerate()
        .filter(|&(_, &b)| b == b' ')
        .map(|(i, _)| i + INDENT_NAME_LEN + 1)
        .collect()
}

/// Greedy packing of `line` into physical lines within the width budget.
///
/// The budget leaves room for the ` \` marker. Cuts happen at the last
/// breakpoint that fits; if none fits the next breakpoint is used anyway so
/// an oversized token cannot stall the scan. Every emitted line but the
/// last gets the continuation marker and the next segment starts indented
/// one column past the name field.
fn reflow(line: &[u8], out: &mut Vec<u8>) {
    const BUDGET: usize = MAX_LINE_LEN - 3;

    let breaks = breakpoints(line);
    let mut start = 0;
    let mut fitting: Option<usize> = None;
    let mut i = 0;

    while i < breaks.len() {
        let candidate = breaks[i];
        if candidate - start <= BUDGET {
            fitting = Some(candidate);
            i += 1;
        } else {
            let cut = match fitting.take() {
                Some(pos) => pos,
                None => {
                    // Forced progress: this breakpoint is already past the
                    // budget and will not be revisited.
                    i += 1;
                    candidate
                }
            };
            emit_continued(out, &line[start..cut]);
            start = cut + 1;
        }
    }

    // One trailing cut if a fitting breakpoint went unused and the
    // remainder (trailing newline included) is still over budget.
    if let Some(pos) = fitting {
        if line.len() - start > BUDGET {
            emit_continued(out, &line[start..pos]);
            start = pos + 1;
        }
    }

    out.extend_from_slice(&line[start..]);
}

fn emit_continued(out: &mut Vec<u8>, segment: &[u8]) {
    out.extend_from_slice(segment);
    out.extend_from_slice(CONTINUATION);
    out.resize(out.len() + INDENT_NAME_LEN + 1, b' ');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(logical: &str) -> String {
        let mut line = LineBuffer::new();
        line.push_str(logical);
        let mut out = Vec::new();
        line.flush_wrapped(&mut out);
        String::from_utf8(out).unwrap()
    }

    fn attrs(n: usize) -> String {
        (0..n).map(|i| format!(" key{:02}=value", i)).collect()
    }

    #[test]
    fn test_short_line_is_unchanged() {
        let logical = format!("{:15} type=dir\n", "somedir");
        assert_eq!(wrap(&logical), logical);
    }

    #[test]
    fn test_pad_to_name_column_short_name() {
        let mut line = LineBuffer::new();
        let mut out = Vec::new();
        line.push_str("name");
        line.pad_to_name_column(&mut out);
        assert!(out.is_empty());
        assert_eq!(line.buf, format!("{:15}", "name").as_bytes());
    }

    #[test]
    fn test_pad_to_name_column_long_name() {
        let mut line = LineBuffer::new();
        let mut out = Vec::new();
        line.push_str("a-rather-long-entry-name");
        line.pad_to_name_column(&mut out);
        assert_eq!(out, b"a-rather-long-entry-name \\\n");
        assert_eq!(line.buf, [b' '; 15]);
    }

    #[test]
    fn test_wrap_breaks_at_separators_only() {
        let logical = format!("{:15}{}\n", "name", attrs(10));
        let wrapped = wrap(&logical);
        for physical in wrapped.split_inclusive('\n') {
            let body = physical
                .trim_end_matches('\n')
                .trim_end_matches(" \\")
                .trim_start_matches(' ');
            // No token is ever split: each piece is a full key=value.
            for token in body.split(' ').filter(|t| !t.is_empty()) {
                assert!(token == "name" || token.starts_with("key"), "{token:?}");
                assert!(token.len() == 4 || token.ends_with("=value"), "{token:?}");
            }
        }
    }

    #[test]
    fn test_continuation_layout() {
        let logical = format!("{:15}{}\n", "name", attrs(10));
        let wrapped = wrap(&logical);
        let lines: Vec<&str> = wrapped.split('\n').collect();
        assert!(lines.len() > 2);
        for physical in &lines[..lines.len() - 2] {
            assert!(physical.ends_with(" \\"));
        }
        for physical in &lines[1..lines.len() - 1] {
            assert!(physical.starts_with(&" ".repeat(INDENT_NAME_LEN + 1)));
        }
        // Rejoining the wrapped form reproduces the logical line.
        let rejoined = wrapped.replace(
            &format!(" \\\n{}", " ".repeat(INDENT_NAME_LEN + 1)),
            " ",
        );
        assert_eq!(rejoined, logical);
    }

    #[test]
    fn test_first_line_fits_within_maximum() {
        let logical = format!("{:15}{}\n", "name", attrs(20));
        let wrapped = wrap(&logical);
        let first = wrapped.split('\n').next().unwrap();
        assert!(first.len() <= MAX_LINE_LEN, "{}", first.len());
    }

    #[test]
    fn test_oversized_token_forces_progress() {
        let huge = "x".repeat(120);
        let logical = format!("{:15} first={} second=ok\n", "name", huge);
        let wrapped = wrap(&logical);
        // The oversized token is emitted whole on its own continued line.
        assert!(wrapped.contains(&huge));
        assert!(wrapped.contains(" \\\n"));
        let rejoined = wrapped.replace(
            &format!(" \\\n{}", " ".repeat(INDENT_NAME_LEN + 1)),
            " ",
        );
        assert_eq!(rejoined, logical);
    }

    #[test]
    fn test_name_column_space_is_not_a_breakpoint() {
        // The separator at index 15 must survive wrapping untouched.
        let logical = format!("{:15}{}\n", "name", attrs(10));
        let wrapped = wrap(&logical);
        assert!(wrapped.starts_with(&format!("{:15} key00=value", "name")));
    }
}
