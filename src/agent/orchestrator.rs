//! The recursive orchestration loop.
//!
//! One root reasoning call per iteration; its reply is parsed into an
//! [`Intent`] and acted upon (run code in the sandbox, fan out sub-queries,
//! or continue the conversation) until the model calls `FINAL(...)` or the
//! iteration budget runs out. Faults inside the loop become the next
//! prompt; the loop itself never fails.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::config::RlmConfig;
use super::message::ChatRequest;
use super::parser::{Intent, parse};
use super::prompt::{
    PromptSet, build_error_prompt, build_initial_prompt, build_repl_feedback, build_sub_results,
};
use super::provider::LlmProvider;
use super::sandbox::Sandbox;
use super::stats::{RlmStats, estimate_tokens};
use super::subcall::{SubcallResult, dispatch_all};
use crate::error::AgentError;

/// Result of one loop run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Completion {
    /// Final answer, or `None` when the budget ran out first.
    pub answer: Option<String>,
    /// Counters collected during the run.
    pub stats: RlmStats,
}

impl Completion {
    /// Returns `true` if the model produced a final answer.
    #[must_use]
    pub const fn converged(&self) -> bool {
        self.answer.is_some()
    }
}

/// Drives the root loop against a reasoning provider.
///
/// Holds no per-query state: every [`completion`](Self::completion) call
/// gets its own sandbox and counters, so one orchestrator can serve
/// concurrent queries.
pub struct Orchestrator {
    provider: Arc<dyn LlmProvider>,
    config: RlmConfig,
    prompts: PromptSet,
}

impl Orchestrator {
    /// Creates an orchestrator, loading prompts from
    /// [`RlmConfig::prompt_dir`] with compiled-in fallbacks.
    pub fn new(provider: Arc<dyn LlmProvider>, config: RlmConfig) -> Self {
        let prompts = PromptSet::load(config.prompt_dir.as_deref());
        Self {
            provider,
            config,
            prompts,
        }
    }

    /// Replaces the system prompts.
    #[must_use]
    pub fn with_prompts(mut self, prompts: PromptSet) -> Self {
        self.prompts = prompts;
        self
    }

    /// Configuration in effect.
    pub const fn config(&self) -> &RlmConfig {
        &self.config
    }

    /// Runs the loop over an externalized context.
    ///
    /// `context` is bound as `context` in the sandbox and previewed in the
    /// first prompt; `chunks` is bound as `chunks`.
    pub async fn completion(&self, context: &str, chunks: &[String], query: &str) -> Completion {
        let max_iterations = self.config.max_iterations;
        let mut sandbox = Sandbox::new(context).with_chunks(chunks.iter().map(String::as_str));
        let mut stats = RlmStats::default();
        let mut prompt = build_initial_prompt(context, query, self.config.context_preview_chars);

        for iteration in 1..=max_iterations {
            stats.iterations += 1;
            stats.root_calls += 1;
            self.progress(iteration, "root call");

            let response = match self.root_call(&prompt).await {
                Ok(text) => text,
                Err(e) => {
                    warn!(iteration, error = %e, "root call failed");
                    prompt = build_error_prompt(&e);
                    continue;
                }
            };

            if response.trim().is_empty() {
                debug!(iteration, "empty response, re-issuing prompt");
                continue;
            }
            stats.root_tokens += estimate_tokens(&response);

            let intent = parse(&response);
            debug!(iteration, intent = intent.kind(), "parsed response");

            prompt = match intent {
                Intent::FinalAnswer(answer) => {
                    self.progress(iteration, "final answer");
                    return Completion {
                        answer: Some(answer),
                        stats,
                    };
                }
                Intent::CodeBlock(code) => {
                    let output = sandbox.run(&code);
                    debug!(iteration, output_chars = output.len(), "sandbox run complete");
                    build_repl_feedback(&output, self.config.max_output_length)
                }
                Intent::SubQueries(queries) => {
                    self.progress(iteration, "dispatching sub-queries");
                    let results =
                        dispatch_all(&queries, &self.provider, context, &self.prompts.sub, &self.config)
                            .await;
                    stats.sub_calls += queries.len();
                    stats.sub_tokens += results.iter().map(SubcallResult::tokens).sum::<usize>();
                    let failed = results.iter().filter(|r| r.is_failure()).count();
                    debug!(iteration, sub_queries = queries.len(), failed, "sub-queries returned");
                    let texts: Vec<String> = results.iter().map(SubcallResult::text).collect();
                    build_sub_results(&texts)
                }
                Intent::Continue(text) => text,
            };
        }

        self.progress(max_iterations, "iteration budget exhausted");
        Completion {
            answer: None,
            stats,
        }
    }

    async fn root_call(&self, prompt: &str) -> Result<String, AgentError> {
        let request = ChatRequest::single_turn(
            &self.config.root_model,
            &self.prompts.root,
            prompt,
            self.config.max_tokens,
        );
        match tokio::time::timeout(self.config.timeout, self.provider.chat(&request)).await {
            Ok(response) => response.map(|r| r.content),
            Err(_) => Err(AgentError::Timeout {
                seconds: self.config.timeout.as_secs(),
            }),
        }
    }

    fn progress(&self, iteration: usize, phase: &'static str) {
        let max_iterations = self.config.max_iterations;
        if self.config.verbose {
            info!(iteration, max_iterations, phase, "rlm progress");
        } else {
            debug!(iteration, max_iterations, phase, "rlm progress");
        }
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("provider", &self.provider.name())
            .field("config", &self.config)
            .field("prompts", &self.prompts)
            .finish()
    }
}
