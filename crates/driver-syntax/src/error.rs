//! Error types for parsing and tree conversion.

use thiserror::Error;

/// Errors raised while parsing Java source.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SyntaxError {
    /// Failed to initialise the Tree-sitter parser with the Java grammar.
    #[error("failed to initialise Java parser: {message}")]
    ParserInitError {
        /// Description of the failure.
        message: String,
    },

    /// Tree-sitter did not produce a tree at all.
    #[error("failed to parse Java: {message}")]
    ParseError {
        /// Description of the failure.
        message: String,
    },

    /// The source parsed into a tree that contains syntax errors.
    #[error("{message} at line {line}, column {column} near '{context}'")]
    Syntax {
        /// One-based line of the first error.
        line: u32,
        /// One-based column of the first error.
        column: u32,
        /// Description of the first error.
        message: String,
        /// Source snippet around the first error.
        context: String,
    },
}

impl SyntaxError {
    /// Creates a parser initialisation error.
    #[must_use]
    pub fn parser_init(message: impl Into<String>) -> Self {
        Self::ParserInitError {
            message: message.into(),
        }
    }

    /// Creates a parse error.
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::ParseError {
            message: message.into(),
        }
    }
}

/// Errors raised while converting a native tree into a portable tree.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// A node's byte range does not address valid text in the source.
    #[error("{kind} node spans bytes {start}..{end}, which is not valid text in the source")]
    InvalidRange {
        /// Kind of the offending node.
        kind: String,
        /// Start byte offset.
        start: usize,
        /// End byte offset.
        end: usize,
    },

    /// The tree nests deeper than the permitted limit.
    #[error("tree nesting exceeds the maximum depth of {limit}")]
    DepthExceeded {
        /// Configured maximum depth.
        limit: usize,
    },
}
