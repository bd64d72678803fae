//! Error types for RLM-Reader.
//!
//! Each concern gets its own `thiserror` enum; [`Error`] aggregates them
//! for callers that cross module boundaries. Errors raised *inside* the
//! orchestration loop (provider faults, sandbox faults, sub-call faults)
//! are absorbed there and never reach the caller.

use std::path::PathBuf;

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Document could not be located or fetched.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// Reasoning provider failure.
    #[error(transparent)]
    Agent(#[from] AgentError),

    /// CLI command failure.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// I/O failure outside extraction.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `chunk_size` must be positive.
    #[error("chunk_size must be greater than zero")]
    ZeroChunkSize,

    /// Overlap would stall or reverse the size-based window.
    #[error("overlap ({overlap}) must be smaller than chunk_size ({chunk_size})")]
    OverlapTooLarge {
        /// Configured overlap.
        overlap: usize,
        /// Configured chunk size.
        chunk_size: usize,
    },

    /// Chunking strategy name not recognized.
    #[error("unknown chunking strategy: {name} (expected auto, section or size)")]
    UnknownChunker {
        /// Requested name.
        name: String,
    },

    /// A numeric option that must be at least one was zero.
    #[error("{name} must be at least 1")]
    ZeroValue {
        /// Option name.
        name: &'static str,
    },
}

/// Text extraction errors.
///
/// Only [`ExtractionError::NotFound`] and [`ExtractionError::Fetch`] surface
/// to callers; backend failures degrade to a placeholder document.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Local source does not exist.
    #[error("document not found: {}", path.display())]
    NotFound {
        /// Path that was requested.
        path: PathBuf,
    },

    /// Remote source could not be fetched.
    #[error("failed to fetch {url}: {message}")]
    Fetch {
        /// URL that was requested.
        url: String,
        /// Failure description.
        message: String,
    },

    /// A single extraction backend failed.
    #[error("{backend} extraction failed: {message}")]
    Backend {
        /// Backend name.
        backend: &'static str,
        /// Failure description.
        message: String,
    },

    /// I/O error while reading the source.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the reasoning-provider boundary.
#[derive(Debug, Error)]
pub enum AgentError {
    /// No API key configured for a provider that needs one.
    #[error("API key not configured. Set OPENAI_API_KEY or RLM_API_KEY")]
    ApiKeyMissing,

    /// Configured provider name is unknown or not compiled in.
    #[error("unsupported provider: {name}")]
    UnsupportedProvider {
        /// Provider name.
        name: String,
    },

    /// The provider API returned an error.
    #[error("API request failed: {message}")]
    ApiRequest {
        /// Failure description.
        message: String,
        /// HTTP status code, when known.
        status: Option<u16>,
    },

    /// A reasoning call exceeded the configured wall-clock timeout.
    #[error("reasoning call timed out after {seconds}s")]
    Timeout {
        /// Timeout that elapsed.
        seconds: u64,
    },

    /// Generic orchestration failure (task join, semaphore).
    #[error("orchestration error: {message}")]
    Orchestration {
        /// Failure description.
        message: String,
    },
}

/// Errors raised by the sandbox interpreter.
///
/// These never escape [`Sandbox::run`](crate::agent::sandbox::Sandbox::run);
/// they are rendered into the captured output. Both carry the interpreter's
/// diagnostic, which names the offending line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SandboxError {
    /// Code could not be parsed, or uses a disabled statement such as `load`.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// Evaluation failed, including unknown names and an exhausted range budget.
    #[error("{0}")]
    Runtime(String),
}

/// CLI command errors.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Command failed.
    #[error("{0}")]
    ExecutionFailed(String),

    /// Output could not be rendered.
    #[error("output format error: {0}")]
    OutputFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::OverlapTooLarge {
            overlap: 600,
            chunk_size: 500,
        };
        assert_eq!(
            err.to_string(),
            "overlap (600) must be smaller than chunk_size (500)"
        );
    }

    #[test]
    fn test_not_found_display() {
        let err = ExtractionError::NotFound {
            path: PathBuf::from("missing.pdf"),
        };
        assert!(err.to_string().contains("missing.pdf"));
    }

    #[test]
    fn test_error_from_conversions() {
        let err: Error = ConfigError::ZeroChunkSize.into();
        assert!(matches!(err, Error::Config(_)));

        let err: Error = AgentError::Timeout { seconds: 5 }.into();
        assert_eq!(err.to_string(), "reasoning call timed out after 5s");
    }
}
