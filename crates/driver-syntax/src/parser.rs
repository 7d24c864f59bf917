//! Tree-sitter parsing wrapper with error recovery.
//!
//! Tree-sitter never refuses input: malformed source still yields a tree in
//! which the unparseable regions are ERROR or MISSING nodes. [`JavaParser`]
//! exposes that tolerant behaviour through [`JavaParser::parse`] and a strict
//! variant that turns the first such node into a [`SyntaxError`].

use std::ops::Range;

use crate::error::SyntaxError;
use crate::language::java_language;
use crate::position::point_to_one_based;

const CONTEXT_LIMIT: usize = 50;

/// Result of parsing Java source.
///
/// Owns both the Tree-sitter tree and the source text it was built from, so
/// node text can be recovered later without the caller keeping the input
/// alive.
#[derive(Debug)]
pub struct ParseResult {
    tree: tree_sitter::Tree,
    source: String,
}

impl ParseResult {
    /// Returns the parsed syntax tree.
    #[must_use]
    pub const fn tree(&self) -> &tree_sitter::Tree {
        &self.tree
    }

    /// Returns the source code that was parsed.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the root node of the syntax tree.
    #[must_use]
    pub fn root_node(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }

    /// Returns whether the tree contains ERROR or MISSING nodes.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    /// Collects every ERROR and MISSING node in document order.
    #[must_use]
    pub fn errors(&self) -> Vec<SyntaxErrorInfo> {
        let mut errors = Vec::new();
        let mut cursor = self.tree.walk();
        loop {
            let node = cursor.node();
            if node.is_error() || node.is_missing() {
                errors.push(SyntaxErrorInfo::from_node(node, &self.source));
            }
            // Only subtrees flagged by Tree-sitter can contain error nodes.
            if node.has_error() && cursor.goto_first_child() {
                continue;
            }
            loop {
                if cursor.goto_next_sibling() {
                    break;
                }
                if !cursor.goto_parent() {
                    return errors;
                }
            }
        }
    }
}

/// Information about a syntax error found during parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxErrorInfo {
    /// Byte range of the error in the source.
    pub byte_range: Range<usize>,
    /// Line number (one-based) where the error starts.
    pub line: u32,
    /// Column number (one-based) where the error starts.
    pub column: u32,
    /// A snippet of the problematic source text.
    pub context: String,
    /// Human-readable description of the error.
    pub message: String,
}

impl SyntaxErrorInfo {
    fn from_node(node: tree_sitter::Node<'_>, source: &str) -> Self {
        let byte_range = node.byte_range();

        let context = source
            .get(byte_range.clone())
            .map(|s| {
                if s.len() > CONTEXT_LIMIT {
                    let truncated: String = s.chars().take(CONTEXT_LIMIT - 3).collect();
                    format!("{truncated}...")
                } else {
                    s.to_owned()
                }
            })
            .unwrap_or_default();

        let message = if node.is_missing() {
            format!("missing {}", node.kind())
        } else {
            "syntax error".to_owned()
        };

        let (line, column) = point_to_one_based(node.start_position());

        Self {
            byte_range,
            line,
            column,
            context,
            message,
        }
    }
}

impl From<SyntaxErrorInfo> for SyntaxError {
    fn from(info: SyntaxErrorInfo) -> Self {
        Self::Syntax {
            line: info.line,
            column: info.column,
            message: info.message,
            context: info.context,
        }
    }
}

/// Tree-sitter parser loaded with the Java grammar.
///
/// A parser carries incremental state between calls; the driver creates a
/// fresh one for every session.
pub struct JavaParser {
    inner: tree_sitter::Parser,
}

impl JavaParser {
    /// Creates a new Java parser.
    ///
    /// # Errors
    ///
    /// Returns an error if the grammar is incompatible with the linked
    /// Tree-sitter runtime.
    pub fn new() -> Result<Self, SyntaxError> {
        let mut inner = tree_sitter::Parser::new();
        inner
            .set_language(&java_language())
            .map_err(|e| SyntaxError::parser_init(e.to_string()))?;

        Ok(Self { inner })
    }

    /// Parses source code, tolerating syntax errors.
    ///
    /// Use [`ParseResult::has_errors`] to check whether recovery happened.
    ///
    /// # Errors
    ///
    /// Returns an error if the parser fails to produce a syntax tree. This
    /// is rare and typically indicates a parser configuration issue.
    pub fn parse(&mut self, source: &str) -> Result<ParseResult, SyntaxError> {
        let tree = self
            .inner
            .parse(source, None)
            .ok_or_else(|| SyntaxError::parse("parser produced no tree"))?;

        Ok(ParseResult {
            tree,
            source: source.to_owned(),
        })
    }

    /// Parses source code and rejects trees that needed error recovery.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::Syntax`] describing the first ERROR or MISSING
    /// node, or the errors of [`JavaParser::parse`].
    pub fn parse_strict(&mut self, source: &str) -> Result<ParseResult, SyntaxError> {
        let result = self.parse(source)?;
        if !result.has_errors() {
            return Ok(result);
        }
        match result.errors().into_iter().next() {
            Some(first) => Err(first.into()),
            None => Err(SyntaxError::parse("tree reports errors but none were located")),
        }
    }
}
