//! Fault and error types for the protocol loop.
//!
//! [`SessionFault`] covers everything a session can report back to the
//! orchestrator before restarting. [`DriverError`] covers what it cannot: once
//! the output stream is unusable no reply can be delivered, so the process
//! terminates.

use std::any::type_name;
use std::fmt;

use thiserror::Error;

/// A per-request failure that ends the current session.
///
/// The `Display` form is the message reported to the orchestrator: a phase
/// prefix followed by the underlying error's message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionFault {
    /// The input is not well-formed JSON, so the end of the request is
    /// unknown.
    #[error("Error reading the petition: {message}")]
    Malformed {
        /// Type name of the underlying error.
        kind: &'static str,
        /// Message of the underlying error.
        message: String,
    },
    /// A complete JSON value was read but it is not a valid request.
    #[error("Error reading the petition: {message}")]
    Decode {
        /// Type name of the underlying error.
        kind: &'static str,
        /// Message of the underlying error.
        message: String,
    },
    /// Reading from the input stream failed.
    #[error("A problem occurred while processing the petition: {message}")]
    Read {
        /// Type name of the underlying error.
        kind: &'static str,
        /// Message of the underlying error.
        message: String,
    },
    /// The parser could not build a tree from the request content.
    #[error("A problem occurred while processing the petition: {message}")]
    Parse {
        /// Type name of the underlying error.
        kind: &'static str,
        /// Message of the underlying error.
        message: String,
    },
    /// The tree could not be converted or serialised to the wire format.
    #[error("Error serializing the AST to JSON: {message}")]
    Encode {
        /// Type name of the underlying error.
        kind: &'static str,
        /// Message of the underlying error.
        message: String,
    },
}

impl SessionFault {
    /// Creates a malformed-input fault from the underlying error.
    #[must_use]
    pub fn malformed<E: fmt::Display>(error: &E) -> Self {
        Self::Malformed {
            kind: type_name::<E>(),
            message: error.to_string(),
        }
    }

    /// Creates a decode fault from the underlying error.
    #[must_use]
    pub fn decode<E: fmt::Display>(error: &E) -> Self {
        Self::Decode {
            kind: type_name::<E>(),
            message: error.to_string(),
        }
    }

    /// Creates a read fault from the underlying error.
    #[must_use]
    pub fn read<E: fmt::Display>(error: &E) -> Self {
        Self::Read {
            kind: type_name::<E>(),
            message: error.to_string(),
        }
    }

    /// Creates a parse fault from the underlying error.
    #[must_use]
    pub fn parse<E: fmt::Display>(error: &E) -> Self {
        Self::Parse {
            kind: type_name::<E>(),
            message: error.to_string(),
        }
    }

    /// Creates an encode fault from the underlying error.
    #[must_use]
    pub fn encode<E: fmt::Display>(error: &E) -> Self {
        Self::Encode {
            kind: type_name::<E>(),
            message: error.to_string(),
        }
    }

    /// Returns the type name of the underlying error.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Malformed { kind, .. }
            | Self::Decode { kind, .. }
            | Self::Read { kind, .. }
            | Self::Parse { kind, .. }
            | Self::Encode { kind, .. } => *kind,
        }
    }

    /// Returns whether the fault leaves the input positioned inside a
    /// request.
    ///
    /// The supervisor skips ahead to the next object before starting another
    /// session. Every other fault happens after the request was consumed
    /// whole, so the input is already at the next request.
    #[must_use]
    pub const fn corrupts_input(&self) -> bool {
        matches!(self, Self::Malformed { .. } | Self::Read { .. })
    }

    /// Returns the error strings placed in the fatal response.
    #[must_use]
    pub fn report(&self) -> Vec<String> {
        vec![self.kind().to_owned(), self.to_string()]
    }
}

/// Process-fatal errors: the driver exits instead of starting a new session.
#[derive(Debug, Error)]
pub enum DriverError {
    /// Writing or flushing the output stream failed.
    #[error("failed to write driver response: {source}")]
    Write {
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The input kept failing while skipping past a broken request.
    #[error("failed to read driver input: {source}")]
    Read {
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Serialising a fault response failed, so no reply can be produced.
    #[error("failed to serialize driver response: {source}")]
    Serialize {
        /// Underlying serialisation error.
        #[source]
        source: serde_json::Error,
    },
    /// A parser for a new session could not be created.
    #[error("failed to initialise parser for a new session: {message}")]
    ParserInit {
        /// Description of the failure.
        message: String,
    },
}
