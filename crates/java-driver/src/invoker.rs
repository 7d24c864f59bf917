//! The parsing collaborator seam and its single-shot invocation.

use std::fmt;

use driver_syntax::{ConversionError, JavaParser, ParseResult, PortableNode, SyntaxError};
use serde::Serialize;

use crate::error::SessionFault;

/// A language parser plus the conversion of its trees into portable trees.
///
/// The protocol loop treats both operations as black boxes: each either
/// succeeds or reports an error, and neither is retried.
pub trait ParsingCollaborator {
    /// Native syntax tree produced by [`ParsingCollaborator::parse`].
    type Tree;
    /// Portable tree placed in the response.
    type Portable: Serialize;
    /// Error raised when source text cannot be parsed.
    type ParseError: fmt::Display;
    /// Error raised when a native tree cannot be converted.
    type ConvertError: fmt::Display;

    /// Parses source text into a native tree.
    ///
    /// # Errors
    ///
    /// Returns an error if no acceptable tree can be built.
    fn parse(&mut self, source: &str) -> Result<Self::Tree, Self::ParseError>;

    /// Converts a native tree into its portable form.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree cannot be represented portably.
    fn to_portable_tree(&self, tree: &Self::Tree) -> Result<Self::Portable, Self::ConvertError>;
}

/// Runs the collaborator once over `source`.
///
/// Parse failures become [`SessionFault::Parse`]; conversion failures become
/// [`SessionFault::Encode`], since they stop the tree from reaching the wire.
///
/// # Errors
///
/// Returns the tagged fault raised by the collaborator.
pub fn invoke<P: ParsingCollaborator>(
    collaborator: &mut P,
    source: &str,
) -> Result<P::Portable, SessionFault> {
    let tree = collaborator
        .parse(source)
        .map_err(|error| SessionFault::parse(&error))?;
    collaborator
        .to_portable_tree(&tree)
        .map_err(|error| SessionFault::encode(&error))
}

/// Tree-sitter Java collaborator used by the driver binary.
pub struct JavaCollaborator {
    parser: JavaParser,
    max_tree_depth: usize,
}

impl JavaCollaborator {
    /// Creates a collaborator with a fresh parser.
    ///
    /// # Errors
    ///
    /// Returns an error if the Java grammar cannot be loaded.
    pub fn new(max_tree_depth: usize) -> Result<Self, SyntaxError> {
        Ok(Self {
            parser: JavaParser::new()?,
            max_tree_depth,
        })
    }
}

impl ParsingCollaborator for JavaCollaborator {
    type Tree = ParseResult;
    type Portable = PortableNode;
    type ParseError = SyntaxError;
    type ConvertError = ConversionError;

    fn parse(&mut self, source: &str) -> Result<ParseResult, SyntaxError> {
        self.parser.parse_strict(source)
    }

    fn to_portable_tree(&self, tree: &ParseResult) -> Result<PortableNode, ConversionError> {
        driver_syntax::to_portable_tree(tree, self.max_tree_depth)
    }
}
