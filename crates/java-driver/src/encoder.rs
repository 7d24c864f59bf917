//! Response encoding and delivery.
//!
//! Encoding and delivery are separate steps. A response is first serialised
//! into a buffer owned by the current iteration; only a fully encoded buffer
//! is written to the output, with a single write followed by a flush. A
//! serialisation failure therefore never leaves a partial reply on the wire.

use std::io::Write;

use driver_protocol::{DriverIdentity, DriverResponse};
use serde::Serialize;

use crate::error::{DriverError, SessionFault};

/// Encodes responses for one driver identity and writes them to the output.
pub struct ResponseEncoder<W: Write> {
    output: W,
    identity: DriverIdentity,
}

impl<W: Write> ResponseEncoder<W> {
    /// Creates an encoder writing to `output`.
    #[must_use]
    pub const fn new(output: W, identity: DriverIdentity) -> Self {
        Self { output, identity }
    }

    /// Encodes a successful response carrying `tree`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionFault::Encode`] if the tree cannot be serialised; the
    /// caller reports that fault in place of the original response.
    pub fn encode_tree<T: Serialize>(&self, tree: T) -> Result<Vec<u8>, SessionFault> {
        to_buffer(&DriverResponse::ok(self.identity, tree))
            .map_err(|error| SessionFault::encode(&error))
    }

    /// Encodes a fatal response describing `fault`.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Serialize`] if even the fault response cannot be
    /// serialised.
    pub fn encode_fault(&self, fault: &SessionFault) -> Result<Vec<u8>, DriverError> {
        let response: DriverResponse<()> = DriverResponse::fatal(self.identity, fault.report());
        to_buffer(&response).map_err(|source| DriverError::Serialize { source })
    }

    /// Writes an encoded response and flushes the output.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Write`] if the output cannot be written or
    /// flushed.
    pub fn deliver(&mut self, buffer: &[u8]) -> Result<(), DriverError> {
        self.output
            .write_all(buffer)
            .map_err(|source| DriverError::Write { source })?;
        self.output
            .flush()
            .map_err(|source| DriverError::Write { source })
    }
}

fn to_buffer<T: Serialize>(response: &DriverResponse<T>) -> Result<Vec<u8>, serde_json::Error> {
    let mut buffer = serde_json::to_vec(response)?;
    buffer.push(b'\n');
    Ok(buffer)
}
