/// Default log filter expression used by the driver.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default bound on portable tree nesting.
pub const DEFAULT_MAX_TREE_DEPTH: usize = 1024;

/// Default logging format for the driver.
#[must_use]
pub const fn default_log_format() -> crate::logging::LogFormat {
    crate::logging::LogFormat::Json
}
