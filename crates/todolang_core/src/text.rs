//! Source location types.
//!
//! Every token, AST node and diagnostic carries two views of where it came
//! from: a 1-based [`Location`] for humans and a byte-offset [`TextSpan`] for
//! tools that slice the source text (snippet rendering, editors).

use serde::Serialize;
use std::fmt;
use std::ops::Range;

/// A position in source text, measured as a byte offset from the start.
pub type TextPos = u32;

/// A 1-based line/column pair.
///
/// Columns count characters, not bytes, so a tab or a multi-byte character
/// each advance the column by one.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

impl Location {
    #[inline]
    pub fn new(line: u32, column: u32) -> Self {
        debug_assert!(line >= 1 && column >= 1);
        Self { line, column }
    }

    /// The location of the first character of a file.
    #[inline]
    pub fn start() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A span in source text, defined by a start offset and a length in bytes.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Serialize)]
pub struct TextSpan {
    /// The byte offset where this span starts.
    pub start: TextPos,
    /// The length of this span in bytes.
    pub length: TextPos,
}

impl TextSpan {
    /// Create a new text span.
    #[inline]
    pub fn new(start: TextPos, length: TextPos) -> Self {
        Self { start, length }
    }

    /// Create a span from start and end positions.
    #[inline]
    pub fn from_bounds(start: TextPos, end: TextPos) -> Self {
        debug_assert!(end >= start);
        Self {
            start,
            length: end - start,
        }
    }

    /// Create an empty span at a position.
    #[inline]
    pub fn empty(pos: TextPos) -> Self {
        Self {
            start: pos,
            length: 0,
        }
    }

    /// The end position of this span (exclusive).
    #[inline]
    pub fn end(&self) -> TextPos {
        self.start + self.length
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Whether this span contains the given position.
    #[inline]
    pub fn contains(&self, pos: TextPos) -> bool {
        pos >= self.start && pos < self.end()
    }

    /// Convert to a byte range, suitable for slicing the source text.
    #[inline]
    pub fn to_range(&self) -> Range<usize> {
        self.start as usize..self.end() as usize
    }

    /// Return a new span covering both this span and the other.
    pub fn union(&self, other: &TextSpan) -> TextSpan {
        let start = self.start.min(other.start);
        let end = self.end().max(other.end());
        TextSpan::from_bounds(start, end)
    }
}

impl fmt::Debug for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end())
    }
}

impl fmt::Display for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end())
    }
}

impl From<TextSpan> for miette::SourceSpan {
    fn from(span: TextSpan) -> Self {
        miette::SourceSpan::new((span.start as usize).into(), span.length as usize)
    }
}
