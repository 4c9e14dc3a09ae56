//! Line/column positions, derived from byte offsets on demand.
//!
//! The core works in byte offsets (`Span`); positions are only needed
//! when reporting a `ParseError` to a human.

use crate::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Position {
    /// 1-indexed line number.
    pub line: u32,
    /// 1-indexed column (byte-based; good enough for ASCII-heavy TS source).
    pub column: u32,
}

impl Position {
    #[must_use]
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

/// Maps byte offsets to 1-indexed (line, column), built once per source.
pub struct LineMap {
    /// Byte offset of the start of each line.
    line_starts: Vec<u32>,
}

impl LineMap {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0u32];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i as u32 + 1);
            }
        }
        LineMap { line_starts }
    }

    pub fn position(&self, offset: u32) -> Position {
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        };
        let line_start = self.line_starts[line_idx];
        Position::new(line_idx as u32 + 1, offset.saturating_sub(line_start) + 1)
    }

    pub fn range(&self, span: Span) -> Range {
        Range { start: self.position(span.start), end: self.position(span.end) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_line_first_column() {
        let map = LineMap::new("abc\ndef\n");
        assert_eq!(map.position(0), Position::new(1, 1));
    }

    #[test]
    fn second_line_resets_column() {
        let map = LineMap::new("abc\ndef\n");
        assert_eq!(map.position(4), Position::new(2, 1));
        assert_eq!(map.position(6), Position::new(2, 3));
    }
}
