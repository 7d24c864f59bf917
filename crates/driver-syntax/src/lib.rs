//! Tree-sitter powered Java parsing for the Java driver.
//!
//! This crate is the parsing collaborator behind the driver protocol loop. It
//! provides:
//!
//! - **Parsing** via [`JavaParser`], which wraps a Tree-sitter parser loaded
//!   with the Java grammar. [`JavaParser::parse`] is error tolerant;
//!   [`JavaParser::parse_strict`] rejects trees that contain syntax errors.
//! - **Portable trees** via [`to_portable_tree`], which converts the native
//!   Tree-sitter tree into a language-neutral [`PortableNode`] hierarchy that
//!   serialises directly to JSON.
//!
//! # Example
//!
//! ```
//! use driver_syntax::{JavaParser, to_portable_tree};
//!
//! let mut parser = JavaParser::new()?;
//! let parsed = parser.parse_strict("class X {}")?;
//! let tree = to_portable_tree(&parsed, 64)?;
//! assert_eq!(tree.kind(), "program");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod language;
mod parser;
mod portable;
mod position;

pub use error::{ConversionError, SyntaxError};
pub use language::{LANGUAGE_NAME, LANGUAGE_VERSION, java_language};
pub use parser::{JavaParser, ParseResult, SyntaxErrorInfo};
pub use portable::{PortableNode, to_portable_tree};
pub use position::PortablePosition;
