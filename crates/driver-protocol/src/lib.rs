//! Wire types exchanged between the orchestrator and a language driver.
//!
//! The exchange is a framing-free JSON stream over stdio. The orchestrator
//! writes one [`DriverRequest`] object per parse job to the driver's stdin;
//! objects are self-delimiting, so no length prefix or newline is required
//! between them. For every request the driver writes exactly one
//! [`DriverResponse`] object to stdout. Driver stderr carries diagnostics only
//! and is never part of the protocol.

mod request;
mod response;

pub use request::{ContentDecodeError, ContentEncoding, DriverRequest};
pub use response::{DriverIdentity, DriverResponse, ResponseStatus};
