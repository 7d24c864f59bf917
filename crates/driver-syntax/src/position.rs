//! Source positions as they appear in portable trees and error messages.
//!
//! Tree-sitter points are zero-based. Everything this crate reports is
//! one-based, matching what editors and compilers print.

use serde::{Deserialize, Serialize};

/// A location in the parsed source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortablePosition {
    offset: usize,
    line: u32,
    col: u32,
}

impl PortablePosition {
    /// Builds a position from a byte offset and a Tree-sitter point.
    #[must_use]
    pub(crate) fn new(offset: usize, point: tree_sitter::Point) -> Self {
        let (line, col) = point_to_one_based(point);
        Self { offset, line, col }
    }

    /// Zero-based byte offset into the source.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// One-based line number.
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.line
    }

    /// One-based byte column.
    #[must_use]
    pub const fn col(&self) -> u32 {
        self.col
    }
}

/// Converts a Tree-sitter point to one-based `(line, column)`.
pub(crate) fn point_to_one_based(pos: tree_sitter::Point) -> (u32, u32) {
    // Line/column numbers will realistically never exceed u32::MAX.
    let line = u32::try_from(pos.row.saturating_add(1)).unwrap_or(u32::MAX);
    let column = u32::try_from(pos.column.saturating_add(1)).unwrap_or(u32::MAX);
    (line, column)
}
