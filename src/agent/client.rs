//! Provider registry and factory.
//!
//! Maps provider names to concrete [`LlmProvider`] implementations.

use std::sync::Arc;

use crate::agent::config::RlmConfig;
use crate::agent::provider::LlmProvider;
use crate::error::AgentError;

/// Creates an [`LlmProvider`] based on the configured provider name.
///
/// # Supported Providers
///
/// - `"openai"` (default, feature `openai`): OpenAI-compatible APIs via `async-openai`
///
/// # Errors
///
/// Returns [`AgentError::UnsupportedProvider`] for unknown (or not compiled
/// in) provider names and [`AgentError::ApiKeyMissing`] when the provider
/// needs a key and none is configured.
pub fn create_provider(config: &RlmConfig) -> Result<Arc<dyn LlmProvider>, AgentError> {
    match config.provider.as_str() {
        #[cfg(feature = "openai")]
        "openai" => {
            let api_key = config.api_key.as_deref().ok_or(AgentError::ApiKeyMissing)?;
            Ok(Arc::new(crate::agent::providers::OpenAiProvider::new(
                api_key,
                config.base_url.as_deref(),
            )))
        }
        other => Err(AgentError::UnsupportedProvider {
            name: other.to_string(),
        }),
    }
}
