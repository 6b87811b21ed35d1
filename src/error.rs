//! Error types for the query engine.
//!
//! Every fallible stage reports a variant of [`EngineError`]. Errors are
//! propagated with `?` inside the engine and converted into outcome
//! envelopes ([`crate::types::QueryOutcome`], [`crate::types::IngestOutcome`])
//! only at the public entry points; nothing escapes them.

use thiserror::Error;

/// Convenience alias for engine results.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors produced by the engine and its service clients.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Fetching or reading the source document failed.
    #[error("source unavailable: {message}")]
    SourceUnavailable {
        /// Underlying transport or I/O cause.
        message: String,
    },

    /// The embedding provider rejected or failed a request.
    #[error("embedding failed: {message}")]
    EmbeddingFailed {
        /// Underlying provider cause.
        message: String,
    },

    /// The vector index rejected or failed a request.
    #[error("vector index unavailable: {message}")]
    IndexUnavailable {
        /// Underlying index service cause.
        message: String,
    },

    /// The LLM call failed.
    #[error("model unavailable: {message}")]
    ModelUnavailable {
        /// Underlying API cause.
        message: String,
    },

    /// A social platform API call failed.
    #[error("platform request failed: {message}")]
    PlatformRequest {
        /// Underlying API cause or validation message.
        message: String,
    },

    /// The model requested a tool that is not registered.
    #[error("tool not found: {name}")]
    ToolNotFound {
        /// The unknown tool name as emitted by the model.
        name: String,
    },

    /// Tool arguments failed schema validation; the tool was not executed.
    #[error("invalid arguments for tool '{tool}': {message}")]
    ArgumentInvalid {
        /// Tool whose arguments were rejected.
        tool: String,
        /// Deserialization/validation failure detail.
        message: String,
    },

    /// A tool's underlying capability failed after its arguments validated.
    #[error("tool '{tool}' execution failed: {cause}")]
    ExecutionFailed {
        /// Tool that failed.
        tool: String,
        /// The wrapped underlying cause.
        cause: String,
    },

    /// A required credential or setting is absent.
    #[error("missing configuration: {name}")]
    ConfigurationMissing {
        /// Name of the missing setting (typically the environment variable).
        name: String,
    },

    /// The tool registry was mis-assembled at startup.
    #[error("tool registry configuration error: {message}")]
    ToolConfiguration {
        /// What went wrong during registration.
        message: String,
    },

    /// A caller-supplied request failed validation.
    #[error("invalid request: {message}")]
    InvalidRequest {
        /// Validation failure detail.
        message: String,
    },
}

impl EngineError {
    /// Short machine-readable kind tag, used in outcome envelopes and logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::SourceUnavailable { .. } => "SourceUnavailable",
            Self::EmbeddingFailed { .. } => "EmbeddingFailed",
            Self::IndexUnavailable { .. } => "IndexUnavailable",
            Self::ModelUnavailable { .. } => "ModelUnavailable",
            Self::PlatformRequest { .. } => "PlatformRequest",
            Self::ToolNotFound { .. } => "ToolNotFound",
            Self::ArgumentInvalid { .. } => "ArgumentInvalid",
            Self::ExecutionFailed { .. } => "ExecutionFailed",
            Self::ConfigurationMissing { .. } => "ConfigurationMissing",
            Self::ToolConfiguration { .. } => "ToolConfiguration",
            Self::InvalidRequest { .. } => "InvalidRequest",
        }
    }
}
