//! Crate-level error types for damage-estimate diagnostics.

/// Every failure carries the offending input so a diagnostic can be printed
/// without re-running the pipeline.
#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A divisor evaluated to zero.
    #[error("division by zero in `{expression}`")]
    DivisionByZero {
        /// The full arithmetic expression being evaluated.
        expression: String,
    },

    /// Underlying I/O error from stdin or the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON (de)serialization failed, usually a malformed dialog payload.
    #[error("json: {0}")]
    Json(
        /// The wrapped JSON error.
        #[from]
        serde_json::Error,
    ),

    /// Arithmetic text handed to the evaluator is not well-formed.
    #[error("malformed expression `{expression}`: {reason}")]
    MalformedExpression {
        /// The full arithmetic expression being evaluated.
        expression: String,
        /// What the scanner found instead of what it expected.
        reason: String,
    },

    /// Tree-sitter could not build a markup tree for the formula.
    #[error("markup parse failed: {reason}")]
    MarkupParseFailed {
        /// Description of the parse failure.
        reason: String,
    },

    /// TOML deserialization of `.damage-estimate.toml` failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),
}
