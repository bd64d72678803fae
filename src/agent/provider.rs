//! Pluggable LLM provider trait.
//!
//! Implementations translate provider-agnostic [`ChatRequest`]/[`ChatResponse`]
//! into provider-specific SDK calls. [`FnProvider`] adapts a plain closure
//! of `(prompt, system_prompt)` for embedders and tests.

use std::sync::Arc;

use async_trait::async_trait;

use super::message::{ChatRequest, ChatResponse, Role};
use crate::error::AgentError;

/// Trait for LLM provider backends.
///
/// Implementations handle the transport layer (HTTP, SDK calls, retries)
/// for a specific provider while presenting a uniform interface to the
/// orchestration loop. Must tolerate many calls per query, including
/// concurrent calls during sub-query dispatch.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name (e.g., `"openai"`).
    fn name(&self) -> &'static str;

    /// Executes a chat completion request.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on API failures, timeouts, or parse errors.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError>;
}

/// Provider backed by a synchronous closure `(prompt, system_prompt) -> text`.
///
/// Each call runs on the blocking thread pool, so a slow closure does not
/// stall the runtime and the loop's per-call timeout still fires. A call
/// that times out keeps its thread until the closure returns.
pub struct FnProvider<F> {
    func: Arc<F>,
}

impl<F> FnProvider<F>
where
    F: Fn(&str, &str) -> Result<String, AgentError> + Send + Sync + 'static,
{
    /// Wraps a closure.
    pub fn new(func: F) -> Self {
        Self {
            func: Arc::new(func),
        }
    }
}

impl<F> std::fmt::Debug for FnProvider<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnProvider").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F> LlmProvider for FnProvider<F>
where
    F: Fn(&str, &str) -> Result<String, AgentError> + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "fn"
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError> {
        let func = Arc::clone(&self.func);
        let prompt = request.content_of(Role::User).to_owned();
        let system_prompt = request.content_of(Role::System).to_owned();
        tokio::task::spawn_blocking(move || func(&prompt, &system_prompt))
            .await
            .map_err(|e| AgentError::ApiRequest {
                message: format!("provider closure failed: {e}"),
                status: None,
            })?
            .map(ChatResponse::text)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_fn_provider_passes_prompts() {
        let provider = FnProvider::new(|prompt: &str, system: &str| Ok(format!("{system}|{prompt}")));
        let request = ChatRequest::single_turn("m", "sys", "hello", 16);
        let response = provider
            .chat(&request)
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(response.content, "sys|hello");
        assert_eq!(provider.name(), "fn");
    }

    #[tokio::test]
    async fn test_fn_provider_propagates_errors() {
        let provider = FnProvider::new(|_: &str, _: &str| {
            Err(AgentError::ApiRequest {
                message: "boom".to_string(),
                status: Some(500),
            })
        });
        let request = ChatRequest::single_turn("m", "sys", "hello", 16);
        assert!(provider.chat(&request).await.is_err());
    }

    #[tokio::test]
    async fn test_fn_provider_panic_becomes_error() {
        let provider = FnProvider::new(|_: &str, _: &str| -> Result<String, AgentError> {
            panic!("closure blew up")
        });
        let request = ChatRequest::single_turn("m", "sys", "hello", 16);
        let err = provider
            .chat(&request)
            .await
            .map(|r| r.content)
            .err()
            .map(|e| e.to_string())
            .unwrap_or_default();
        assert!(err.contains("provider closure failed"), "{err}");
    }

    #[tokio::test]
    async fn test_blocking_closure_can_time_out() {
        let provider = FnProvider::new(|_: &str, _: &str| {
            std::thread::sleep(Duration::from_millis(500));
            Ok("late".to_string())
        });
        let request = ChatRequest::single_turn("m", "sys", "hello", 16);
        let outcome = tokio::time::timeout(Duration::from_millis(50), provider.chat(&request)).await;
        assert!(outcome.is_err());
    }
}
