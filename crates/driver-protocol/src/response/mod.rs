//! Responses written by the driver for every request it accepts.

use serde::{Deserialize, Serialize};

/// Static identity of a driver, repeated in every response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverIdentity {
    /// Semantic version of the driver itself.
    pub driver_version: &'static str,
    /// Name of the language the driver parses.
    pub language_name: &'static str,
    /// Version of the language the driver parses.
    pub language_version: &'static str,
}

/// Outcome reported by a [`DriverResponse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    /// The request was parsed and the tree is attached.
    Ok,
    /// The request failed but the driver keeps serving the same session.
    ///
    /// Part of the shared fleet vocabulary; this driver reports every
    /// failure as [`ResponseStatus::Fatal`].
    Error,
    /// The request failed and the driver restarts its session.
    Fatal,
}

/// Response sent from the driver to the orchestrator on stdout.
///
/// `ast` is present if and only if the status is [`ResponseStatus::Ok`]; the
/// constructors are the only way to build a response, so the pairing holds
/// for every value the driver writes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DriverResponse<T> {
    driver_version: String,
    language_name: String,
    language_version: String,
    status: ResponseStatus,
    ast: Option<T>,
    errors: Vec<String>,
}

impl<T> DriverResponse<T> {
    /// Creates a successful response carrying the portable tree.
    #[must_use]
    pub fn ok(identity: DriverIdentity, ast: T) -> Self {
        Self::with_identity(identity, ResponseStatus::Ok, Some(ast), Vec::new())
    }

    /// Creates a fatal response with the given error strings and no tree.
    #[must_use]
    pub fn fatal(identity: DriverIdentity, errors: Vec<String>) -> Self {
        Self::with_identity(identity, ResponseStatus::Fatal, None, errors)
    }

    fn with_identity(
        identity: DriverIdentity,
        status: ResponseStatus,
        ast: Option<T>,
        errors: Vec<String>,
    ) -> Self {
        Self {
            driver_version: identity.driver_version.to_owned(),
            language_name: identity.language_name.to_owned(),
            language_version: identity.language_version.to_owned(),
            status,
            ast,
            errors,
        }
    }

    /// Returns the reported status.
    #[must_use]
    pub const fn status(&self) -> ResponseStatus {
        self.status
    }

    /// Returns the portable tree, if any.
    #[must_use]
    pub const fn ast(&self) -> Option<&T> {
        self.ast.as_ref()
    }

    /// Returns the error strings in report order.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Returns the driver version.
    #[must_use]
    pub const fn driver_version(&self) -> &str {
        self.driver_version.as_str()
    }

    /// Returns the implemented language name.
    #[must_use]
    pub const fn language_name(&self) -> &str {
        self.language_name.as_str()
    }

    /// Returns the implemented language version.
    #[must_use]
    pub const fn language_version(&self) -> &str {
        self.language_version.as_str()
    }
}
