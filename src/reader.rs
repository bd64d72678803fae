//! Session bundle tying extraction, segmentation and the loop together.
//!
//! A [`DocumentReader`] is constructed once per session and passed
//! explicitly; it holds configuration and collaborators but no per-query
//! state, so concurrent `process` calls never share a sandbox.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::agent::prompt::build_document_context;
use crate::agent::{LlmProvider, Orchestrator, PromptSet, RlmConfig};
use crate::analysis::analyze;
use crate::chunking::Segmenter;
use crate::core::{Chunk, Document};
use crate::error::{ConfigError, Result};
use crate::extract::Extractor;
use crate::report::{AnalysisReport, QueryReport};

/// Reads documents and answers questions about them.
#[derive(Debug)]
pub struct DocumentReader {
    config: RlmConfig,
    extractor: Extractor,
    segmenter: Segmenter,
    prompts: PromptSet,
}

impl DocumentReader {
    /// Creates a reader with the default extractor chain.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the chunking settings cannot make progress.
    pub fn new(config: RlmConfig) -> std::result::Result<Self, ConfigError> {
        let segmenter = Segmenter::new(config.chunk_size, config.overlap)?;
        let extractor = Extractor::new().with_fetch_timeout(config.fetch_timeout);
        let prompts = PromptSet::load(config.prompt_dir.as_deref());
        Ok(Self {
            config,
            extractor,
            segmenter,
            prompts,
        })
    }

    /// Replaces the extractor chain.
    #[must_use]
    pub fn with_extractor(mut self, extractor: Extractor) -> Self {
        self.extractor = extractor;
        self
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

    /// Extracts a document from a local path or URL.
    pub async fn load(&self, source: &str) -> Result<Document> {
        Ok(self.extractor.extract(source).await?)
    }

    /// Segments a document with the configured chunk settings.
    pub fn chunks(&self, document: &Document) -> Vec<Chunk> {
        self.segmenter.segment(document)
    }

    /// Answers `query` about `source`, returning a typed report.
    ///
    /// Only input errors (missing file, unreachable URL) are returned;
    /// everything that goes wrong inside the loop is absorbed into the report.
    #[instrument(skip(self, provider), fields(provider = provider.name()))]
    pub async fn try_process(
        &self,
        source: &str,
        query: &str,
        provider: Arc<dyn LlmProvider>,
    ) -> Result<QueryReport> {
        let document = self.load(source).await?;
        let structure = analyze(&document.content);
        let context = build_document_context(&document, &structure);
        let chunks: Vec<String> = self
            .chunks(&document)
            .into_iter()
            .map(|c| c.content)
            .collect();
        info!(
            title = %document.title,
            chars = structure.char_count,
            chunks = chunks.len(),
            "document ready"
        );

        let orchestrator =
            Orchestrator::new(provider, self.config.clone()).with_prompts(self.prompts.clone());
        let completion = orchestrator.completion(&context, &chunks, query).await;
        info!(
            converged = completion.converged(),
            iterations = completion.stats.iterations,
            sub_calls = completion.stats.sub_calls,
            "query finished"
        );
        Ok(QueryReport::new(document.title, query, completion))
    }

    /// Answers `query` about `source`; always returns report text.
    pub async fn process(&self, source: &str, query: &str, provider: Arc<dyn LlmProvider>) -> String {
        match self.try_process(source, query, provider).await {
            Ok(report) => report.to_markdown(),
            Err(e) => format!("Error processing document: {e}"),
        }
    }

    /// Summarizes a document's structure without any reasoning calls.
    #[instrument(skip(self))]
    pub async fn try_analyze(&self, source: &str) -> Result<AnalysisReport> {
        let document = self.load(source).await?;
        let structure = analyze(&document.content);
        Ok(AnalysisReport::new(
            &document,
            structure,
            self.config.report_preview_chars,
        ))
    }

    /// Summarizes a document's structure; always returns report text.
    pub async fn analyze(&self, source: &str) -> String {
        match self.try_analyze(source).await {
            Ok(report) => report.to_markdown(),
            Err(e) => format!("Error analyzing document: {e}"),
        }
    }
}
