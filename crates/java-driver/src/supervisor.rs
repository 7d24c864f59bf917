//! Session lifecycle management.
//!
//! The supervisor runs sessions back to back over the same streams. Each
//! session gets a freshly built collaborator, so parser state never leaks
//! from a failed request into the next one. Serving stops only when the input
//! closes or a [`DriverError`] makes further replies impossible.
//!
//! After a fault that leaves the input inside a broken request, the
//! supervisor skips to the next `{` before starting the next session. The
//! skip looks only at the bytes themselves, so one broken request gets one
//! reply however the reader happens to chunk the stream.

use std::fmt;
use std::io::{self, BufRead, BufReader, Read, Write};

use driver_protocol::DriverIdentity;
use tracing::{debug, error, info, info_span};

use crate::error::DriverError;
use crate::invoker::ParsingCollaborator;
use crate::session::{Session, SessionEnd};

/// Totals reported when serving finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServeSummary {
    /// Sessions started, including the final one.
    pub sessions: u64,
    /// Responses delivered across all sessions.
    pub responses: u64,
    /// Sessions that ended with a fault.
    pub halts: u64,
}

/// Starts a new session after each halt until the input closes.
pub struct Supervisor<F> {
    identity: DriverIdentity,
    factory: F,
}

impl<F, P, E> Supervisor<F>
where
    F: FnMut() -> Result<P, E>,
    P: ParsingCollaborator,
    E: fmt::Display,
{
    /// Creates a supervisor that builds each session's collaborator with
    /// `factory`.
    #[must_use]
    pub const fn new(identity: DriverIdentity, factory: F) -> Self {
        Self { identity, factory }
    }

    /// Serves requests from `input` until it closes.
    ///
    /// # Errors
    ///
    /// Returns a [`DriverError`] when the output cannot be written, a
    /// collaborator cannot be built for a new session, or the input fails
    /// again while skipping past a broken request.
    pub fn serve<R: Read, W: Write>(
        &mut self,
        input: &mut BufReader<R>,
        output: &mut W,
    ) -> Result<ServeSummary, DriverError> {
        let mut summary = ServeSummary::default();
        loop {
            summary.sessions += 1;
            let collaborator = (self.factory)().map_err(|error| DriverError::ParserInit {
                message: error.to_string(),
            })?;

            let span = info_span!("session", id = summary.sessions);
            let _entered = span.enter();
            debug!("session started");

            let mut session = Session::new(&mut *input, &mut *output, collaborator, self.identity);
            let end = session.run();
            summary.responses += session.responses();
            drop(session);

            match end? {
                SessionEnd::InputClosed => {
                    info!(
                        responses = summary.responses,
                        halts = summary.halts,
                        "input closed; driver stopping"
                    );
                    return Ok(summary);
                }
                SessionEnd::Halted(fault) => {
                    summary.halts += 1;
                    if fault.corrupts_input() {
                        let skipped = skip_to_next_object(input).map_err(|source| {
                            error!(%source, "input unreadable after a failed request");
                            DriverError::Read { source }
                        })?;
                        debug!(skipped, "skipped the rest of a broken request");
                    }
                }
            }
        }
    }
}

/// Consumes input up to, not including, the next `{` or the end of input.
///
/// Returns the number of bytes skipped.
fn skip_to_next_object<R: Read>(input: &mut BufReader<R>) -> io::Result<usize> {
    let mut skipped = 0;
    loop {
        let available = match input.fill_buf() {
            Ok(available) => available,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(error) => return Err(error),
        };
        if available.is_empty() {
            return Ok(skipped);
        }
        let (len, found) = available
            .iter()
            .position(|byte| *byte == b'{')
            .map_or((available.len(), false), |start| (start, true));
        input.consume(len);
        skipped += len;
        if found {
            return Ok(skipped);
        }
    }
}
