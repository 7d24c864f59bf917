//! Parse requests sent from the orchestrator to the driver.

use std::any::type_name;
use std::borrow::Cow;
use std::string::FromUtf8Error;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Request sent from the orchestrator to the driver on stdin.
///
/// Only `content` is required. Envelope fields the driver has no use for
/// (`action`, `language`, and so on) are accepted and ignored.
///
/// # Example
///
/// ```
/// use driver_protocol::DriverRequest;
///
/// let request: DriverRequest =
///     serde_json::from_str(r#"{"action":"ParseAST","content":"class X{}"}"#)?;
/// assert_eq!(request.source()?, "class X{}");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DriverRequest {
    content: String,
    #[serde(default)]
    encoding: ContentEncoding,
}

impl DriverRequest {
    /// Creates a request carrying plain UTF-8 source text.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            encoding: ContentEncoding::Utf8,
        }
    }

    /// Creates a request whose content is transported with `encoding`.
    #[must_use]
    pub fn with_encoding(content: impl Into<String>, encoding: ContentEncoding) -> Self {
        Self {
            content: content.into(),
            encoding,
        }
    }

    /// Returns the raw content field as received.
    #[must_use]
    pub const fn content(&self) -> &str {
        self.content.as_str()
    }

    /// Returns the transport encoding of the content field.
    #[must_use]
    pub const fn encoding(&self) -> ContentEncoding {
        self.encoding
    }

    /// Returns the source text, decoding the transport encoding if needed.
    ///
    /// # Errors
    ///
    /// Returns an error when base64 content is malformed or does not decode
    /// to valid UTF-8.
    pub fn source(&self) -> Result<Cow<'_, str>, ContentDecodeError> {
        match self.encoding {
            ContentEncoding::Utf8 => Ok(Cow::Borrowed(self.content.as_str())),
            ContentEncoding::Base64 => {
                let bytes = STANDARD
                    .decode(self.content.as_bytes())
                    .map_err(|source| ContentDecodeError::Base64 { source })?;
                let text = String::from_utf8(bytes)
                    .map_err(|source| ContentDecodeError::Utf8 { source })?;
                Ok(Cow::Owned(text))
            }
        }
    }
}

/// Transport encoding of [`DriverRequest`] content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentEncoding {
    /// Content is plain source text.
    #[default]
    #[serde(rename = "UTF8", alias = "utf8", alias = "UTF-8", alias = "utf-8")]
    Utf8,
    /// Content is base64 encoded UTF-8 source text.
    #[serde(rename = "BASE64", alias = "base64")]
    Base64,
}

/// Errors raised while decoding request content into source text.
#[derive(Debug, Error)]
pub enum ContentDecodeError {
    /// The content is not valid base64.
    #[error("content is not valid base64: {source}")]
    Base64 {
        /// Underlying base64 error.
        #[source]
        source: base64::DecodeError,
    },
    /// The decoded bytes are not valid UTF-8.
    #[error("decoded content is not valid UTF-8: {source}")]
    Utf8 {
        /// Underlying conversion error.
        #[source]
        source: FromUtf8Error,
    },
}

impl ContentDecodeError {
    /// Returns the fully qualified type name of the underlying error.
    #[must_use]
    pub fn source_type_name(&self) -> &'static str {
        match self {
            Self::Base64 { .. } => type_name::<base64::DecodeError>(),
            Self::Utf8 { .. } => type_name::<FromUtf8Error>(),
        }
    }
}
