//! Span - Source location tracking for declarations and diagnostics
//!
//! A `Span` represents a range of source code by byte offsets; a `Pos` pairs
//! a span with the file it came from. They are used for:
//! - Tracking the location of resolved type nodes
//! - Pointing to error locations in diagnostics
//!
//! Spans are small (8 bytes) and cheap to copy. Positions clone an `Arc`.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A span of source code, represented as a byte range.
///
/// Spans use half-open intervals: `[start, end)`.
/// An empty span has `start == end`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (inclusive)
    pub start: u32,
    /// End byte offset (exclusive)
    pub end: u32,
}

impl Span {
    /// Create a new span from start and end offsets.
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }

    /// Create an empty span at the given position.
    #[inline]
    pub const fn at(pos: u32) -> Self {
        Span {
            start: pos,
            end: pos,
        }
    }

    /// Create a span from start position and length.
    #[inline]
    pub const fn from_len(start: u32, len: u32) -> Self {
        Span {
            start,
            end: start + len,
        }
    }

    /// Create a dummy/invalid span (used for synthetic nodes).
    #[inline]
    pub const fn dummy() -> Self {
        Span {
            start: u32::MAX,
            end: u32::MAX,
        }
    }

    /// Check if this is a dummy/invalid span.
    #[inline]
    pub const fn is_dummy(&self) -> bool {
        self.start == u32::MAX && self.end == u32::MAX
    }

    /// Get the length of this span in bytes.
    #[inline]
    pub const fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Check if this span is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Merge two spans to create a span covering both.
    #[inline]
    pub const fn merge(&self, other: Span) -> Span {
        let start = if self.start < other.start {
            self.start
        } else {
            other.start
        };
        let end = if self.end > other.end {
            self.end
        } else {
            other.end
        };
        Span { start, end }
    }

    /// Extract the slice of text covered by this span.
    #[inline]
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        let start = self.start as usize;
        let end = self.end as usize;
        text.get(start..end).unwrap_or("")
    }
}

impl From<(u32, u32)> for Span {
    fn from((start, end): (u32, u32)) -> Self {
        Span::new(start, end)
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

// =============================================================================
// Pos - a span inside a named file
// =============================================================================

/// A source position: a file plus a span within it.
///
/// Declarations can reference types from other files (a parent class, a
/// typedef body), so every reason frame and diagnostic carries its own `Pos`
/// rather than assuming a per-invocation current file.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Pos {
    file: Arc<str>,
    span: Span,
}

impl Pos {
    pub fn new(file: impl Into<Arc<str>>, span: Span) -> Self {
        Pos {
            file: file.into(),
            span,
        }
    }

    /// A position for synthetic nodes with no source (prelude declarations,
    /// checker-constructed stacks).
    pub fn none() -> Self {
        Pos {
            file: Arc::from(""),
            span: Span::dummy(),
        }
    }

    pub fn is_none(&self) -> bool {
        self.file.is_empty() && self.span.is_dummy()
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn span(&self) -> Span {
        self.span
    }
}

impl std::fmt::Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_none() {
            write!(f, "<no position>")
        } else {
            write!(f, "{}:{}", self.file, self.span)
        }
    }
}

#[cfg(test)]
#[path = "tests/span.rs"]
mod tests;
