//! Conversion of native Tree-sitter trees into portable trees.
//!
//! A portable tree keeps only named nodes. Each node records its grammar
//! kind, the field through which its parent reaches it, its span, and, when
//! it has no named children, the source text it covers. Conversion is a pure
//! function of the parse result, so identical input always yields an
//! identical tree.

use serde::{Deserialize, Serialize};

use crate::error::ConversionError;
use crate::parser::ParseResult;
use crate::position::PortablePosition;

/// A language-neutral syntax tree node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortableNode {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    start: PortablePosition,
    end: PortablePosition,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<Self>,
}

impl PortableNode {
    /// Grammar kind of the node, e.g. `class_declaration`.
    #[must_use]
    pub const fn kind(&self) -> &str {
        self.kind.as_str()
    }

    /// Field name linking the node to its parent, e.g. `name` or `body`.
    #[must_use]
    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    /// Source text of a node without named children.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Start of the node's span.
    #[must_use]
    pub const fn start(&self) -> PortablePosition {
        self.start
    }

    /// End of the node's span.
    #[must_use]
    pub const fn end(&self) -> PortablePosition {
        self.end
    }

    /// Named children in source order.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }
}

/// Converts a parse result into a portable tree rooted at `program`.
///
/// `max_depth` bounds the nesting of the produced tree; the root is depth 1.
///
/// # Errors
///
/// Returns [`ConversionError::DepthExceeded`] when the tree nests deeper than
/// `max_depth`, or [`ConversionError::InvalidRange`] when a node does not
/// address valid text in the source.
pub fn to_portable_tree(
    parsed: &ParseResult,
    max_depth: usize,
) -> Result<PortableNode, ConversionError> {
    convert_node(parsed.root_node(), None, parsed.source(), 1, max_depth)
}

fn convert_node(
    node: tree_sitter::Node<'_>,
    role: Option<&str>,
    source: &str,
    depth: usize,
    max_depth: usize,
) -> Result<PortableNode, ConversionError> {
    if depth > max_depth {
        return Err(ConversionError::DepthExceeded { limit: max_depth });
    }

    let mut children = Vec::with_capacity(node.named_child_count());
    let mut cursor = node.walk();
    if cursor.goto_first_child() {
        loop {
            let child = cursor.node();
            if child.is_named() {
                children.push(convert_node(
                    child,
                    cursor.field_name(),
                    source,
                    depth + 1,
                    max_depth,
                )?);
            }
            if !cursor.goto_next_sibling() {
                break;
            }
        }
    }

    let token = if children.is_empty() {
        Some(node_text(node, source)?.to_owned())
    } else {
        None
    };

    Ok(PortableNode {
        kind: node.kind().to_owned(),
        role: role.map(str::to_owned),
        token,
        start: PortablePosition::new(node.start_byte(), node.start_position()),
        end: PortablePosition::new(node.end_byte(), node.end_position()),
        children,
    })
}

fn node_text<'s>(node: tree_sitter::Node<'_>, source: &'s str) -> Result<&'s str, ConversionError> {
    let range = node.byte_range();
    source
        .get(range.clone())
        .ok_or_else(|| ConversionError::InvalidRange {
            kind: node.kind().to_owned(),
            start: range.start,
            end: range.end,
        })
}
