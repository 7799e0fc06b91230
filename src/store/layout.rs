//! Line-level view of the primary file.
//!
//! A file is a block of header lines (empty, `#` comments, `HDR:` markers)
//! followed by data lines. Data lines are either records or malformed legacy
//! lines, which are carried through rewrites untouched.

use crate::models::Record;

/// Prefix of the format marker line.
pub const HDR_PREFIX: &str = "HDR:";

/// What a single line holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// Empty, comment or format marker. Never addressable.
    Header,
    /// A parseable record.
    Record(Record),
    /// A data line with fewer than 12 fields.
    Malformed,
}

/// Whether a line is empty, a `#` comment or an `HDR:` marker.
#[must_use]
pub fn is_header_line(line: &[u8]) -> bool {
    let t = line.trim_ascii();
    t.is_empty() || t.starts_with(b"#") || t.starts_with(HDR_PREFIX.as_bytes())
}

/// Bytes that are not valid UTF-8 are decoded lossily for parsing only.
#[must_use]
pub fn classify(line: &[u8]) -> LineKind {
    if is_header_line(line) {
        return LineKind::Header;
    }
    match Record::parse_line(&String::from_utf8_lossy(line)) {
        Some(rec) => LineKind::Record(rec),
        None => LineKind::Malformed,
    }
}

/// Split raw file content into lines on `\n`.
///
/// A trailing newline does not produce an extra empty line, and `\r` is kept
/// so untouched lines are rewritten byte for byte.
#[must_use]
pub fn split_lines(content: &[u8]) -> Vec<&[u8]> {
    if content.is_empty() {
        return Vec::new();
    }
    let body = content.strip_suffix(b"\n").unwrap_or(content);
    body.split(|&b| b == b'\n').collect()
}

/// Join lines back into file content, newline-terminated.
#[must_use]
pub fn join_lines<L: AsRef<[u8]>>(lines: &[L]) -> Vec<u8> {
    let mut out = Vec::new();
    for line in lines {
        out.extend_from_slice(line.as_ref());
        out.push(b'\n');
    }
    out
}

/// Number of leading header lines.
#[must_use]
pub fn header_count<L: AsRef<[u8]>>(lines: &[L]) -> usize {
    lines
        .iter()
        .take_while(|l| is_header_line(l.as_ref()))
        .count()
}

/// Absolute index at which a line inserted "after line `after`" lands.
///
/// The data-relative splice point `after - headers + 1` is clamped to the
/// data block, so an insert never lands inside the header block or past the end.
#[must_use]
pub fn insertion_index<L: AsRef<[u8]>>(lines: &[L], after: usize) -> usize {
    let headers = header_count(lines);
    let data_len = lines.len() - headers;
    let offset = (after + 1).saturating_sub(headers).min(data_len);
    headers + offset
}
