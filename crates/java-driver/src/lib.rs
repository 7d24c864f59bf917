//! Java language driver: a long-running stdio transducer from parse requests
//! to portable syntax trees.
//!
//! The driver reads framing-free JSON requests from stdin, parses each
//! request's source with Tree-sitter's Java grammar, converts the result into
//! a portable tree and writes one JSON response per request to stdout.
//!
//! Failures are contained per session. Malformed input, unparseable source or
//! an unserialisable tree produce a `fatal` response, after which the
//! [`Supervisor`] starts a fresh [`Session`] with a new parser. Only an
//! unwritable stdout stops the process, because no reply can be delivered
//! after that.

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod invoker;
pub mod session;
pub mod supervisor;
pub mod telemetry;

#[cfg(test)]
mod tests;

use std::io::{BufReader, Read, Write};

use driver_config::Config;
use driver_protocol::DriverIdentity;
use driver_syntax::{LANGUAGE_NAME, LANGUAGE_VERSION};

pub use error::{DriverError, SessionFault};
pub use invoker::{JavaCollaborator, ParsingCollaborator};
pub use session::{Session, SessionEnd, SessionState};
pub use supervisor::{ServeSummary, Supervisor};

/// Identity reported in every response written by this driver.
pub const JAVA_DRIVER: DriverIdentity = DriverIdentity {
    driver_version: env!("CARGO_PKG_VERSION"),
    language_name: LANGUAGE_NAME,
    language_version: LANGUAGE_VERSION,
};

/// Serves requests from `input` to `output` with the Java collaborator until
/// the input closes.
///
/// # Errors
///
/// Returns an error if the output becomes unwritable or a parser cannot be
/// created for a new session.
pub fn run<R: Read, W: Write>(
    input: &mut BufReader<R>,
    output: &mut W,
    config: &Config,
) -> Result<ServeSummary, DriverError> {
    let max_tree_depth = config.max_tree_depth();
    let mut supervisor = Supervisor::new(JAVA_DRIVER, move || {
        JavaCollaborator::new(max_tree_depth)
    });
    supervisor.serve(input, output)
}
