//! Concurrent dispatch of delegated sub-queries.
//!
//! Each sub-query is a single-shot leaf call: it sees a fixed-size prefix
//! of the shared context plus its own task, and may not delegate further.
//! Calls run concurrently under a semaphore; results come back in request
//! order, and a failure only affects its own slot.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::{debug, warn};

use super::config::RlmConfig;
use super::message::ChatRequest;
use super::prompt::build_sub_prompt;
use super::provider::LlmProvider;
use super::stats::estimate_tokens;
use crate::error::AgentError;

/// Outcome of one delegated call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubcallResult {
    /// Non-empty answer text.
    Answer(String),
    /// The call succeeded but returned nothing.
    Empty,
    /// The call failed; holds the error description.
    Failed(String),
}

impl SubcallResult {
    /// Text handed back to the root loop for this slot.
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Self::Answer(text) => text.clone(),
            Self::Empty => "<no response>".to_string(),
            Self::Failed(error) => format!("<error: {error}>"),
        }
    }

    /// Estimated tokens; only answers count.
    #[must_use]
    pub fn tokens(&self) -> usize {
        match self {
            Self::Answer(text) => estimate_tokens(text),
            Self::Empty | Self::Failed(_) => 0,
        }
    }

    /// Returns `true` if the call failed.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Settings shared by every call in one dispatch.
#[derive(Debug, Clone)]
struct DispatchSettings {
    model: String,
    system_prompt: String,
    max_tokens: u32,
    timeout: Duration,
}

/// Runs every sub-query against the provider and returns one result per
/// prompt, in input order.
pub async fn dispatch_all(
    queries: &[String],
    provider: &Arc<dyn LlmProvider>,
    context: &str,
    system_prompt: &str,
    config: &RlmConfig,
) -> Vec<SubcallResult> {
    if queries.is_empty() {
        return Vec::new();
    }

    let semaphore = Arc::new(Semaphore::new(config.max_concurrency.max(1)));
    let settings = Arc::new(DispatchSettings {
        model: config.sub_model.clone(),
        system_prompt: system_prompt.to_string(),
        max_tokens: config.max_tokens,
        timeout: config.timeout,
    });

    let mut handles = Vec::with_capacity(queries.len());
    for (slot, query) in queries.iter().enumerate() {
        let sem = Arc::clone(&semaphore);
        let prov = Arc::clone(provider);
        let settings = Arc::clone(&settings);
        let prompt = build_sub_prompt(context, query, config.sub_context_chars);

        handles.push(tokio::spawn(async move {
            let _permit = sem.acquire().await.map_err(|e| AgentError::Orchestration {
                message: format!("Semaphore acquire failed: {e}"),
            })?;
            debug!(slot, "dispatching sub-query");
            call_once(&*prov, &settings, &prompt).await
        }));
    }

    let mut results = Vec::with_capacity(handles.len());
    for (slot, handle) in handles.into_iter().enumerate() {
        let outcome = match handle.await {
            Ok(result) => result,
            Err(e) => Err(AgentError::Orchestration {
                message: format!("Task join failed: {e}"),
            }),
        };
        results.push(match outcome {
            Ok(text) if text.trim().is_empty() => SubcallResult::Empty,
            Ok(text) => SubcallResult::Answer(text),
            Err(e) => {
                warn!(slot, error = %e, "sub-query failed");
                SubcallResult::Failed(e.to_string())
            }
        });
    }

    results
}

async fn call_once(
    provider: &dyn LlmProvider,
    settings: &DispatchSettings,
    prompt: &str,
) -> Result<String, AgentError> {
    let request = ChatRequest::single_turn(
        &settings.model,
        &settings.system_prompt,
        prompt,
        settings.max_tokens,
    );
    match tokio::time::timeout(settings.timeout, provider.chat(&request)).await {
        Ok(response) => response.map(|r| r.content),
        Err(_) => Err(AgentError::Timeout {
            seconds: settings.timeout.as_secs(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::agent::message::{ChatResponse, Role};
    use crate::agent::provider::FnProvider;

    fn config() -> RlmConfig {
        RlmConfig::builder()
            .max_concurrency(2)
            .build()
            .unwrap_or_else(|_| unreachable!())
    }

    fn queries(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[tokio::test]
    async fn test_failure_is_isolated_and_order_kept() {
        let provider: Arc<dyn LlmProvider> = Arc::new(FnProvider::new(|prompt: &str, _: &str| {
            if prompt.contains("task two") {
                Err(AgentError::ApiRequest {
                    message: "rate limited".to_string(),
                    status: Some(429),
                })
            } else if prompt.contains("task one") {
                Ok("answer one".to_string())
            } else {
                Ok("answer three".to_string())
            }
        }));

        let results = dispatch_all(
            &queries(&["task one", "task two", "task three"]),
            &provider,
            "shared context",
            "sys",
            &config(),
        )
        .await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0], SubcallResult::Answer("answer one".to_string()));
        assert!(results[1].is_failure());
        assert!(results[1].text().starts_with("<error: API request failed: rate limited"));
        assert_eq!(results[2], SubcallResult::Answer("answer three".to_string()));
    }

    #[tokio::test]
    async fn test_empty_answers_and_tokens() {
        let provider: Arc<dyn LlmProvider> = Arc::new(FnProvider::new(|prompt: &str, _: &str| {
            Ok(if prompt.contains("blank") { "  ".to_string() } else { "four".to_string() })
        }));
        let results =
            dispatch_all(&queries(&["blank", "full"]), &provider, "", "sys", &config()).await;
        assert_eq!(results[0], SubcallResult::Empty);
        assert_eq!(results[0].text(), "<no response>");
        assert_eq!(results[0].tokens(), 0);
        assert_eq!(results[1].tokens(), 4);
    }

    #[tokio::test]
    async fn test_sub_prompt_carries_context_prefix_and_system_prompt() {
        let provider: Arc<dyn LlmProvider> =
            Arc::new(FnProvider::new(|prompt: &str, system: &str| Ok(format!("{system}\n{prompt}"))));
        let context = "c".repeat(6000);
        let results = dispatch_all(&queries(&["q"]), &provider, &context, "SUB", &config()).await;
        let SubcallResult::Answer(echo) = &results[0] else {
            unreachable!()
        };
        assert!(echo.starts_with("SUB\n"));
        assert!(echo.contains(&"c".repeat(5000)));
        assert!(!echo.contains(&"c".repeat(5001)));
    }

    struct SlowProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LlmProvider for SlowProvider {
        fn name(&self) -> &'static str {
            "slow"
        }

        async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if request.content_of(Role::User).contains("hang") {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            Ok(ChatResponse::text("done"))
        }
    }

    #[tokio::test]
    async fn test_timeout_marks_only_the_slow_slot() {
        let slow = Arc::new(SlowProvider {
            calls: AtomicUsize::new(0),
        });
        let provider: Arc<dyn LlmProvider> = slow.clone();
        let config = RlmConfig::builder()
            .timeout(Duration::from_millis(50))
            .build()
            .unwrap_or_else(|_| unreachable!());
        let results =
            dispatch_all(&queries(&["hang", "quick"]), &provider, "", "sys", &config).await;
        assert!(matches!(&results[0], SubcallResult::Failed(e) if e.contains("timed out")));
        assert_eq!(results[1], SubcallResult::Answer("done".to_string()));
        assert_eq!(slow.calls.load(Ordering::SeqCst), 2);
    }
}
