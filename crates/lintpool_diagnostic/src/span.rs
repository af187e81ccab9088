//! Byte spans and line/column lookup.

use serde::{Deserialize, Serialize};

/// A span representing a range in source text.
///
/// Uses byte offsets (0-indexed) for efficient slicing.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[cfg_attr(
    feature = "rkyv",
    derive(rkyv::Archive, rkyv::Serialize, rkyv::Deserialize)
)]
pub struct Span {
    /// Start byte offset (0-indexed, inclusive).
    pub start: u32,
    /// End byte offset (0-indexed, exclusive).
    pub end: u32,
}

impl Span {
    /// Creates a new span.
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Creates an empty span at `offset`.
    #[inline]
    pub const fn empty(offset: u32) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Returns the length of the span in bytes.
    #[inline]
    pub const fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Returns true if the span is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns true if the two spans share at least one byte, or if one is an
    /// insertion point strictly inside the other.
    #[inline]
    pub const fn overlaps(&self, other: &Span) -> bool {
        !(self.end <= other.start || other.end <= self.start)
    }
}

/// Maps byte offsets to 1-based line and column numbers.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<u32>,
    len: u32,
}

impl LineIndex {
    /// Builds the index for `text`.
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (offset, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(offset as u32 + 1);
            }
        }
        Self {
            line_starts,
            len: text.len() as u32,
        }
    }

    /// Number of lines in the text. An empty text has one line.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte offset at which the 1-based `line` starts.
    pub fn line_start(&self, line: u32) -> Option<u32> {
        let index = line.checked_sub(1)? as usize;
        self.line_starts.get(index).copied()
    }

    /// Converts a byte offset into a 1-based `(line, column)` pair.
    ///
    /// Offsets past the end clamp to the end of the text.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        let offset = offset.min(self.len);
        let line_index = match self.line_starts.binary_search(&offset) {
            Ok(index) => index,
            Err(index) => index - 1,
        };
        let column = offset - self.line_starts[line_index];
        (line_index as u32 + 1, column + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span() {
        let span = Span::new(10, 20);
        assert_eq!(span.len(), 10);
        assert!(!span.is_empty());
    }

    #[test]
    fn test_empty_span() {
        let span = Span::empty(5);
        assert!(span.is_empty());
        assert_eq!(span.len(), 0);
    }

    #[test]
    fn test_span_overlaps() {
        assert!(Span::new(0, 5).overlaps(&Span::new(3, 8)));
        assert!(!Span::new(0, 5).overlaps(&Span::new(5, 8)));
        assert!(!Span::new(5, 8).overlaps(&Span::new(0, 5)));
    }

    #[test]
    fn test_span_serialization() {
        let span = Span::new(1, 4);
        let json = serde_json::to_string(&span).unwrap();
        assert_eq!(json, r#"{"start":1,"end":4}"#);
    }

    #[test]
    fn test_line_index_first_line() {
        let index = LineIndex::new("var a = 1\nvar b = 2\n");
        assert_eq!(index.line_col(0), (1, 1));
        assert_eq!(index.line_col(9), (1, 10));
    }

    #[test]
    fn test_line_index_second_line() {
        let index = LineIndex::new("var a = 1\nvar b = 2\n");
        assert_eq!(index.line_col(10), (2, 1));
        assert_eq!(index.line_col(14), (2, 5));
        assert_eq!(index.line_count(), 3);
    }

    #[test]
    fn test_line_index_clamps_past_end() {
        let index = LineIndex::new("ab");
        assert_eq!(index.line_col(100), (1, 3));
    }

    #[test]
    fn test_line_start() {
        let index = LineIndex::new("a\nbc\n");
        assert_eq!(index.line_start(1), Some(0));
        assert_eq!(index.line_start(2), Some(2));
        assert_eq!(index.line_start(0), None);
        assert_eq!(index.line_start(9), None);
    }
}
