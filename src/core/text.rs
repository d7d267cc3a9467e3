//! Line-indexed text content for one side of a compare.

use std::borrow::Cow;

/// Bytes scanned for NUL when sniffing binary content (git's heuristic).
const BINARY_SNIFF_LEN: usize = 8000;

/// Text split into lines, with CRLF folded to LF.
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    bytes: Vec<u8>,
    /// Start offset of every line, plus a final end marker.
    line_starts: Vec<usize>,
    is_binary: bool,
}

impl TextBuffer {
    /// Build a buffer from raw bytes.
    pub fn new(input: &[u8]) -> Self {
        let is_binary = input[..input.len().min(BINARY_SNIFF_LEN)].contains(&0);
        let bytes = normalize_crlf(input);
        let line_starts = compute_line_starts(&bytes);
        Self {
            bytes,
            line_starts,
            is_binary,
        }
    }

    /// Whether content contains a NUL byte near the start.
    pub fn is_binary(&self) -> bool {
        self.is_binary
    }

    /// Number of lines. Empty content has none; a missing trailing newline still counts.
    pub fn line_count(&self) -> usize {
        self.line_starts.len().saturating_sub(1)
    }

    /// A line without its newline, or `None` past the end.
    pub fn line(&self, line_num: usize) -> Option<&[u8]> {
        let start = *self.line_starts.get(line_num)?;
        let end = *self.line_starts.get(line_num + 1)?;
        let end = if end > start && self.bytes[end - 1] == b'\n' {
            end - 1
        } else {
            end
        };
        Some(&self.bytes[start..end])
    }

    /// All lines, with invalid UTF-8 replaced by U+FFFD.
    pub fn lines(&self) -> Vec<Cow<'_, str>> {
        (0..self.line_count())
            .filter_map(|i| self.line(i).map(String::from_utf8_lossy))
            .collect()
    }

    /// Whether the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn normalize_crlf(input: &[u8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(input.len());
    let mut iter = input.iter().peekable();
    while let Some(&b) = iter.next() {
        if b == b'\r' && iter.peek() == Some(&&b'\n') {
            continue;
        }
        output.push(b);
    }
    output
}

fn compute_line_starts(bytes: &[u8]) -> Vec<usize> {
    if bytes.is_empty() {
        return Vec::new();
    }
    let mut starts = vec![0];
    starts.extend(
        bytes
            .iter()
            .enumerate()
            .filter(|(_, b)| **b == b'\n')
            .map(|(i, _)| i + 1),
    );
    if bytes.last() != Some(&b'\n') {
        starts.push(bytes.len());
    }
    starts
}
