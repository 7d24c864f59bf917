//! Java grammar selection and language identity.

/// Name of the language implemented by this driver.
pub const LANGUAGE_NAME: &str = "Java";

/// Language level reported to the orchestrator.
pub const LANGUAGE_VERSION: &str = "8";

/// Returns the Tree-sitter grammar for Java.
#[must_use]
pub fn java_language() -> tree_sitter::Language {
    tree_sitter_java::LANGUAGE.into()
}
