//! Layered configuration for the Java driver.
//!
//! Values are resolved by `ortho_config` from, in increasing precedence, a
//! configuration file and `JAVA_DRIVER_*` environment variables. The driver
//! binary forwards no command-line arguments, so the process remains a pure
//! stream transducer over stdio.

mod defaults;
mod logging;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{DEFAULT_LOG_FILTER, DEFAULT_MAX_TREE_DEPTH, default_log_format};
pub use logging::{LogFormat, LogFormatParseError};

/// Runtime configuration shared by the driver binary and its tests.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "JAVA_DRIVER")]
pub struct Config {
    /// Tracing filter expression, e.g. `info` or `java_driver=debug`.
    log_filter: Option<String>,
    /// Diagnostic log output format.
    log_format: Option<LogFormat>,
    /// Deepest portable tree the driver will serialise.
    max_tree_depth: Option<usize>,
}

impl Config {
    /// Builds a configuration from explicit values; `None` selects the
    /// built-in default for that setting.
    #[must_use]
    pub const fn from_parts(
        log_filter: Option<String>,
        log_format: Option<LogFormat>,
        max_tree_depth: Option<usize>,
    ) -> Self {
        Self {
            log_filter,
            log_format,
            max_tree_depth,
        }
    }

    /// Configuration with every setting at its built-in default.
    #[must_use]
    pub const fn builtin() -> Self {
        Self::from_parts(None, None, None)
    }

    /// Effective tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    /// Effective log output format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format.unwrap_or_else(default_log_format)
    }

    /// Effective maximum portable tree depth; never zero.
    #[must_use]
    pub fn max_tree_depth(&self) -> usize {
        self.max_tree_depth
            .filter(|depth| *depth > 0)
            .unwrap_or(DEFAULT_MAX_TREE_DEPTH)
    }
}
