//! Source location tracking for syntax tree nodes and diagnostics.
//!
//! A [`Span`] is a 1-based (line, column) pair identifying where a token or
//! node begins. Unlike a byte-range span, the tlc pipeline only ever needs
//! the *start* location of a construct for diagnostics (per spec, every
//! token carries a line/column, not a byte range), so `Span` stores exactly
//! that pair and nothing more.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 1-based source location: line and column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Span {
    pub line: u32,
    pub column: u32,
}

impl Span {
    #[inline]
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Span { line, column }
    }

    /// A location used for synthetic nodes that have no source origin.
    #[inline]
    #[must_use]
    pub const fn synthetic() -> Self {
        Span { line: 0, column: 0 }
    }

    #[inline]
    #[must_use]
    pub const fn is_synthetic(&self) -> bool {
        self.line == 0 && self.column == 0
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A trait for types that carry a source [`Span`].
pub trait Spanned {
    fn span(&self) -> Span;
}

impl Spanned for Span {
    fn span(&self) -> Span {
        *self
    }
}
