//! Request decoding from the framing-free input stream.
//!
//! Requests are consecutive JSON objects with no length prefix or delimiter;
//! a streaming deserializer finds each object's end from the JSON itself. The
//! decoder is created per session and reads through the caller's buffered
//! reader, so bytes it has not consumed stay available to the next session.
//!
//! Decoding happens in two steps. The stream first yields a complete JSON
//! value, and only then is the value checked against the request schema. A
//! schema failure therefore leaves the input at the start of the next request,
//! while a syntax failure leaves it somewhere inside the broken one.

use std::io::Read;

use driver_protocol::DriverRequest;
use serde_json::de::IoRead;
use serde_json::error::Category;
use serde_json::{StreamDeserializer, Value};

use crate::error::SessionFault;

/// Pulls one request at a time from the input stream.
pub struct RequestDecoder<R: Read> {
    stream: StreamDeserializer<'static, IoRead<R>, Value>,
}

impl<R: Read> RequestDecoder<R> {
    /// Creates a decoder over `reader`.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            stream: serde_json::Deserializer::from_reader(reader).into_iter(),
        }
    }

    /// Decodes the next request and returns its source text.
    ///
    /// Returns `None` once the stream ends cleanly between requests. A stream
    /// that ends inside a request is a malformed-input fault.
    pub fn next_source(&mut self) -> Option<Result<String, SessionFault>> {
        let decoded = self.stream.next()?;
        Some(
            decoded
                .map_err(|error| classify(&error))
                .and_then(|value| {
                    serde_json::from_value::<DriverRequest>(value)
                        .map_err(|error| SessionFault::decode(&error))
                })
                .and_then(|request| source_of(&request)),
        )
    }
}

fn classify(error: &serde_json::Error) -> SessionFault {
    match error.classify() {
        Category::Io => SessionFault::read(error),
        Category::Syntax | Category::Eof | Category::Data => SessionFault::malformed(error),
    }
}

fn source_of(request: &DriverRequest) -> Result<String, SessionFault> {
    request
        .source()
        .map(std::borrow::Cow::into_owned)
        .map_err(|error| SessionFault::Decode {
            kind: error.source_type_name(),
            message: error.to_string(),
        })
}
