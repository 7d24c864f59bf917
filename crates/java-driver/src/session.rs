//! The per-session protocol loop.
//!
//! A session repeatedly decodes a request, invokes the collaborator, encodes
//! the response and delivers it:
//!
//! ```text
//! Idle -> Decoding -> Invoking -> Encoding -> Flushed -> Idle
//!            |           |           |
//!            +-----------+-----------+--> ErrorReporting -> Halted
//! ```
//!
//! Every accepted request gets exactly one response. A fault in any stage is
//! reported with a fatal response and ends the session; the supervisor then
//! starts a fresh one. Failing to deliver a response is not a fault but a
//! [`DriverError`], which ends the process.

use std::io::{Read, Write};

use driver_protocol::DriverIdentity;
use tracing::{debug, trace, warn};

use crate::decoder::RequestDecoder;
use crate::encoder::ResponseEncoder;
use crate::error::{DriverError, SessionFault};
use crate::invoker::{ParsingCollaborator, invoke};

/// Where a session is within its request cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting to start the next request.
    Idle,
    /// Reading and decoding a request.
    Decoding,
    /// Running the parsing collaborator.
    Invoking,
    /// Serialising the response.
    Encoding,
    /// The response has been written and flushed.
    Flushed,
    /// Writing the fatal response for a fault.
    ErrorReporting,
    /// A fault was reported; the session accepts no further requests.
    Halted,
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// The input stream ended cleanly between requests.
    InputClosed,
    /// A fault was reported and the session must be replaced.
    Halted(SessionFault),
}

enum Step {
    Continue,
    End(SessionEnd),
}

/// One continuous run of the protocol loop over a fresh collaborator.
pub struct Session<R: Read, W: Write, P: ParsingCollaborator> {
    decoder: RequestDecoder<R>,
    encoder: ResponseEncoder<W>,
    collaborator: P,
    state: SessionState,
    responses: u64,
}

impl<R: Read, W: Write, P: ParsingCollaborator> Session<R, W, P> {
    /// Creates a session reading from `input` and writing to `output`.
    #[must_use]
    pub fn new(input: R, output: W, collaborator: P, identity: DriverIdentity) -> Self {
        Self {
            decoder: RequestDecoder::new(input),
            encoder: ResponseEncoder::new(output, identity),
            collaborator,
            state: SessionState::Idle,
            responses: 0,
        }
    }

    /// Current state of the request cycle.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Number of responses delivered by this session.
    #[must_use]
    pub const fn responses(&self) -> u64 {
        self.responses
    }

    /// Serves requests until the input closes or a fault halts the session.
    ///
    /// # Errors
    ///
    /// Returns a [`DriverError`] when a response cannot be delivered; no
    /// further reply is possible after that.
    pub fn run(&mut self) -> Result<SessionEnd, DriverError> {
        loop {
            if let Step::End(end) = self.step()? {
                return Ok(end);
            }
        }
    }

    fn step(&mut self) -> Result<Step, DriverError> {
        self.transition(SessionState::Decoding);
        let Some(decoded) = self.decoder.next_source() else {
            self.transition(SessionState::Idle);
            debug!("input closed");
            return Ok(Step::End(SessionEnd::InputClosed));
        };

        match self.process(decoded) {
            Ok(buffer) => {
                self.encoder.deliver(&buffer)?;
                self.responses += 1;
                self.transition(SessionState::Flushed);
                debug!(bytes = buffer.len(), "response delivered");
                self.transition(SessionState::Idle);
                Ok(Step::Continue)
            }
            Err(fault) => {
                self.transition(SessionState::ErrorReporting);
                warn!(kind = fault.kind(), %fault, "request failed; halting session");
                let buffer = self.encoder.encode_fault(&fault)?;
                self.encoder.deliver(&buffer)?;
                self.responses += 1;
                self.transition(SessionState::Halted);
                Ok(Step::End(SessionEnd::Halted(fault)))
            }
        }
    }

    fn process(&mut self, decoded: Result<String, SessionFault>) -> Result<Vec<u8>, SessionFault> {
        let source = decoded?;
        debug!(bytes = source.len(), "request decoded");

        self.transition(SessionState::Invoking);
        let tree = invoke(&mut self.collaborator, &source)?;

        self.transition(SessionState::Encoding);
        self.encoder.encode_tree(tree)
    }

    fn transition(&mut self, next: SessionState) {
        trace!(from = ?self.state, to = ?next, "session transition");
        self.state = next;
    }
}
