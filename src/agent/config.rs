//! Reader configuration with builder pattern and environment variable support.
//!
//! Configuration is resolved in order: explicit values → environment variables → defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::chunking::{DEFAULT_CHUNK_SIZE, DEFAULT_OVERLAP};
use crate::error::ConfigError;
use crate::extract::DEFAULT_FETCH_TIMEOUT;

/// Default root-loop iteration budget.
const DEFAULT_MAX_ITERATIONS: usize = 10;
/// Default cap on sandbox output fed back to the root model.
const DEFAULT_MAX_OUTPUT_LENGTH: usize = 500_000;
/// Default maximum concurrent sub-calls.
const DEFAULT_MAX_CONCURRENCY: usize = 8;
/// Default per-call timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 120;
/// Default context preview length in the initial prompt.
const DEFAULT_CONTEXT_PREVIEW_CHARS: usize = 500;
/// Default context prefix length given to each sub-call.
const DEFAULT_SUB_CONTEXT_CHARS: usize = 5_000;
/// Default content preview length in structure reports.
const DEFAULT_REPORT_PREVIEW_CHARS: usize = 1_000;
/// Default completion budget per reasoning call.
const DEFAULT_MAX_TOKENS: u32 = 4096;
/// Default root model.
const DEFAULT_ROOT_MODEL: &str = "gpt-5.2-2025-12-11";
/// Default sub-call model.
const DEFAULT_SUB_MODEL: &str = "gpt-5-mini-2025-08-07";

/// Configuration for a reader session.
#[derive(Debug, Clone)]
pub struct RlmConfig {
    /// Target size-based chunk length in characters.
    pub chunk_size: usize,
    /// Overlap between consecutive size-based chunks.
    pub overlap: usize,
    /// Maximum root-loop iterations.
    pub max_iterations: usize,
    /// Sandbox output is truncated to this many characters.
    pub max_output_length: usize,
    /// Promotes per-iteration progress logs from `debug` to `info`.
    pub verbose: bool,
    /// Maximum concurrent sub-calls in one dispatch.
    pub max_concurrency: usize,
    /// Wall-clock timeout for a single reasoning call.
    pub timeout: Duration,
    /// Timeout for fetching remote documents.
    pub fetch_timeout: Duration,
    /// Characters of context shown in the initial prompt.
    pub context_preview_chars: usize,
    /// Characters of context prefixed to each sub-call prompt.
    pub sub_context_chars: usize,
    /// Characters of content shown in structure reports.
    pub report_preview_chars: usize,
    /// LLM provider name (e.g., "openai").
    pub provider: String,
    /// API key for the provider, when it needs one.
    pub api_key: Option<String>,
    /// Optional base URL override (for proxies or compatible APIs).
    pub base_url: Option<String>,
    /// Model for root calls.
    pub root_model: String,
    /// Model for sub-calls.
    pub sub_model: String,
    /// Completion budget per reasoning call.
    pub max_tokens: u32,
    /// Directory containing prompt template files.
    ///
    /// When set, system prompts are loaded from markdown files in this
    /// directory, falling back to compiled-in defaults for any missing
    /// files.
    pub prompt_dir: Option<PathBuf>,
}

impl RlmConfig {
    /// Creates a new builder for `RlmConfig`.
    #[must_use]
    pub fn builder() -> RlmConfigBuilder {
        RlmConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a resolved value is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::builder().from_env().build()
    }
}

impl Default for RlmConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_OVERLAP,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_output_length: DEFAULT_MAX_OUTPUT_LENGTH,
            verbose: false,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            context_preview_chars: DEFAULT_CONTEXT_PREVIEW_CHARS,
            sub_context_chars: DEFAULT_SUB_CONTEXT_CHARS,
            report_preview_chars: DEFAULT_REPORT_PREVIEW_CHARS,
            provider: "openai".to_string(),
            api_key: None,
            base_url: None,
            root_model: DEFAULT_ROOT_MODEL.to_string(),
            sub_model: DEFAULT_SUB_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            prompt_dir: None,
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name)
        .ok()
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

/// Builder for [`RlmConfig`].
#[derive(Debug, Clone, Default)]
pub struct RlmConfigBuilder {
    chunk_size: Option<usize>,
    overlap: Option<usize>,
    max_iterations: Option<usize>,
    max_output_length: Option<usize>,
    verbose: Option<bool>,
    max_concurrency: Option<usize>,
    timeout: Option<Duration>,
    fetch_timeout: Option<Duration>,
    context_preview_chars: Option<usize>,
    sub_context_chars: Option<usize>,
    report_preview_chars: Option<usize>,
    provider: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    root_model: Option<String>,
    sub_model: Option<String>,
    max_tokens: Option<u32>,
    prompt_dir: Option<PathBuf>,
}

impl RlmConfigBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if self.chunk_size.is_none() {
            self.chunk_size = env_parse("RLM_CHUNK_SIZE");
        }
        if self.overlap.is_none() {
            self.overlap = env_parse("RLM_OVERLAP");
        }
        if self.max_iterations.is_none() {
            self.max_iterations = env_parse("RLM_MAX_ITERATIONS");
        }
        if self.max_output_length.is_none() {
            self.max_output_length = env_parse("RLM_MAX_OUTPUT_LENGTH");
        }
        if self.verbose.is_none() {
            self.verbose = env_flag("RLM_VERBOSE");
        }
        if self.max_concurrency.is_none() {
            self.max_concurrency = env_parse("RLM_MAX_CONCURRENCY");
        }
        if self.timeout.is_none() {
            self.timeout = env_parse("RLM_TIMEOUT_SECS").map(Duration::from_secs);
        }
        if self.provider.is_none() {
            self.provider = std::env::var("RLM_PROVIDER").ok();
        }
        if self.api_key.is_none() {
            self.api_key = std::env::var("OPENAI_API_KEY")
                .or_else(|_| std::env::var("RLM_API_KEY"))
                .ok();
        }
        if self.base_url.is_none() {
            self.base_url = std::env::var("OPENAI_BASE_URL")
                .or_else(|_| std::env::var("RLM_BASE_URL"))
                .ok();
        }
        if self.root_model.is_none() {
            self.root_model = std::env::var("RLM_ROOT_MODEL").ok();
        }
        if self.sub_model.is_none() {
            self.sub_model = std::env::var("RLM_SUB_MODEL").ok();
        }
        if self.prompt_dir.is_none() {
            self.prompt_dir = std::env::var("RLM_PROMPT_DIR").ok().map(PathBuf::from);
        }
        self
    }

    /// Sets the size-based chunk length.
    #[must_use]
    pub const fn chunk_size(mut self, n: usize) -> Self {
        self.chunk_size = Some(n);
        self
    }

    /// Sets the chunk overlap.
    #[must_use]
    pub const fn overlap(mut self, n: usize) -> Self {
        self.overlap = Some(n);
        self
    }

    /// Sets the root-loop iteration budget.
    #[must_use]
    pub const fn max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = Some(n);
        self
    }

    /// Sets the sandbox output cap.
    #[must_use]
    pub const fn max_output_length(mut self, n: usize) -> Self {
        self.max_output_length = Some(n);
        self
    }

    /// Enables verbose progress logging.
    #[must_use]
    pub const fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    /// Sets the maximum concurrency.
    #[must_use]
    pub const fn max_concurrency(mut self, n: usize) -> Self {
        self.max_concurrency = Some(n);
        self
    }

    /// Sets the per-call timeout.
    #[must_use]
    pub const fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Sets the remote fetch timeout.
    #[must_use]
    pub const fn fetch_timeout(mut self, duration: Duration) -> Self {
        self.fetch_timeout = Some(duration);
        self
    }

    /// Sets the initial-prompt context preview length.
    #[must_use]
    pub const fn context_preview_chars(mut self, n: usize) -> Self {
        self.context_preview_chars = Some(n);
        self
    }

    /// Sets the sub-call context prefix length.
    #[must_use]
    pub const fn sub_context_chars(mut self, n: usize) -> Self {
        self.sub_context_chars = Some(n);
        self
    }

    /// Sets the structure report preview length.
    #[must_use]
    pub const fn report_preview_chars(mut self, n: usize) -> Self {
        self.report_preview_chars = Some(n);
        self
    }

    /// Sets the LLM provider name.
    #[must_use]
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the base URL override.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the root model.
    #[must_use]
    pub fn root_model(mut self, model: impl Into<String>) -> Self {
        self.root_model = Some(model.into());
        self
    }

    /// Sets the sub-call model.
    #[must_use]
    pub fn sub_model(mut self, model: impl Into<String>) -> Self {
        self.sub_model = Some(model.into());
        self
    }

    /// Sets the completion budget per call.
    #[must_use]
    pub const fn max_tokens(mut self, n: u32) -> Self {
        self.max_tokens = Some(n);
        self
    }

    /// Sets the prompt template directory.
    #[must_use]
    pub fn prompt_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.prompt_dir = Some(dir.into());
        self
    }

    /// Builds and validates the [`RlmConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `chunk_size` is zero, `overlap` is not
    /// smaller than `chunk_size`, or the iteration budget or concurrency
    /// limit is zero.
    pub fn build(self) -> Result<RlmConfig, ConfigError> {
        let defaults = RlmConfig::default();
        let config = RlmConfig {
            chunk_size: self.chunk_size.unwrap_or(defaults.chunk_size),
            overlap: self.overlap.unwrap_or(defaults.overlap),
            max_iterations: self.max_iterations.unwrap_or(defaults.max_iterations),
            max_output_length: self.max_output_length.unwrap_or(defaults.max_output_length),
            verbose: self.verbose.unwrap_or(defaults.verbose),
            max_concurrency: self.max_concurrency.unwrap_or(defaults.max_concurrency),
            timeout: self.timeout.unwrap_or(defaults.timeout),
            fetch_timeout: self.fetch_timeout.unwrap_or(defaults.fetch_timeout),
            context_preview_chars: self
                .context_preview_chars
                .unwrap_or(defaults.context_preview_chars),
            sub_context_chars: self.sub_context_chars.unwrap_or(defaults.sub_context_chars),
            report_preview_chars: self
                .report_preview_chars
                .unwrap_or(defaults.report_preview_chars),
            provider: self.provider.unwrap_or(defaults.provider),
            api_key: self.api_key.filter(|k| !k.trim().is_empty()),
            base_url: self.base_url,
            root_model: self.root_model.unwrap_or(defaults.root_model),
            sub_model: self.sub_model.unwrap_or(defaults.sub_model),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            prompt_dir: self.prompt_dir,
        };

        if config.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        if config.overlap >= config.chunk_size {
            return Err(ConfigError::OverlapTooLarge {
                overlap: config.overlap,
                chunk_size: config.chunk_size,
            });
        }
        if config.max_iterations == 0 {
            return Err(ConfigError::ZeroValue {
                name: "max_iterations",
            });
        }
        if config.max_concurrency == 0 {
            return Err(ConfigError::ZeroValue {
                name: "max_concurrency",
            });
        }
        Ok(config)
    }
}
