//! MCP server implementation for rlm-reader.
//!
//! Exposes document querying and structure analysis as MCP tools. Each
//! `query` call gets its own loop state; the server itself only holds
//! configuration and the provider.

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo};
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};
use serde::Serialize;

use crate::agent::client::create_provider;
use crate::agent::{LlmProvider, RlmConfig};
use crate::error::{Error, ExtractionError};
use crate::reader::DocumentReader;
use crate::report::{AnalysisReport, QueryReport};

use super::params::{AnalyzeParams, QueryParams};

/// Maps a reader error to an MCP error: missing inputs are the caller's fault.
fn to_mcp_error(e: &Error) -> McpError {
    match e {
        Error::Extraction(ExtractionError::NotFound { .. } | ExtractionError::Fetch { .. }) => {
            McpError::invalid_params(e.to_string(), None)
        }
        _ => McpError::internal_error(e.to_string(), None),
    }
}

fn render<T: Serialize>(value: &T, markdown: Option<String>) -> Result<CallToolResult, McpError> {
    let text = match markdown {
        Some(text) => text,
        None => serde_json::to_string_pretty(value)
            .map_err(|e| McpError::internal_error(format!("Serialization error: {e}"), None))?,
    };
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

/// RLM-Reader MCP server.
#[derive(Clone)]
pub struct RlmMcpServer {
    tool_router: ToolRouter<Self>,
    config: RlmConfig,
    reader: Arc<DocumentReader>,
    provider: Arc<dyn LlmProvider>,
}

impl std::fmt::Debug for RlmMcpServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RlmMcpServer")
            .field("provider", &self.provider.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[tool_router]
impl RlmMcpServer {
    /// Answer a question about a document with the recursive loop.
    #[tool(
        name = "query",
        description = "Answer a question about a document (local path or URL) that may be far larger than a context window. The document is explored iteratively through a sandboxed REPL with parallel sub-model calls. Returns JSON with the answer (null if the loop did not converge) and call statistics."
    )]
    async fn query(
        &self,
        Parameters(params): Parameters<QueryParams>,
    ) -> Result<CallToolResult, McpError> {
        let report = self.run_query(&params).await?;
        let markdown = params.markdown.then(|| report.to_markdown());
        render(&report, markdown)
    }

    /// Summarize a document's structure without calling any model.
    #[tool(
        name = "analyze",
        description = "Summarize a document's structure (pages, words, characters, sections, tables, code blocks, recommended chunking method and a content preview) without any model calls. Returns JSON."
    )]
    async fn analyze(
        &self,
        Parameters(params): Parameters<AnalyzeParams>,
    ) -> Result<CallToolResult, McpError> {
        let report = self.run_analyze(&params).await?;
        let markdown = params.markdown.then(|| report.to_markdown());
        render(&report, markdown)
    }
}

#[tool_handler]
impl ServerHandler for RlmMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "rlm-reader".to_string(),
                title: Some("RLM-Reader MCP Server".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: Some("https://github.com/zircote/rlm-reader".to_string()),
            },
            instructions: Some(
                "RLM-Reader: answers questions about documents that exceed context limits. \
                 Use `analyze` to inspect a document's structure and `query` to ask a question."
                    .to_string(),
            ),
        }
    }
}

impl RlmMcpServer {
    /// Creates a server using the provider named in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot be created or the chunking
    /// settings are invalid.
    pub fn new(config: RlmConfig) -> Result<Self, Error> {
        let provider = create_provider(&config)?;
        Self::with_provider(config, provider)
    }

    /// Creates a server around an explicit provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the chunking settings are invalid.
    pub fn with_provider(config: RlmConfig, provider: Arc<dyn LlmProvider>) -> Result<Self, Error> {
        let reader = Arc::new(DocumentReader::new(config.clone())?);
        Ok(Self {
            tool_router: Self::tool_router(),
            config,
            reader,
            provider,
        })
    }

    /// Configuration in effect.
    #[must_use]
    pub const fn config(&self) -> &RlmConfig {
        &self.config
    }

    async fn run_query(&self, params: &QueryParams) -> Result<QueryReport, McpError> {
        let result = match params.max_iterations.filter(|&n| n > 0) {
            Some(n) if n != self.config.max_iterations => {
                let mut config = self.config.clone();
                config.max_iterations = n;
                let reader = DocumentReader::new(config).map_err(|e| to_mcp_error(&Error::from(e)))?;
                reader
                    .try_process(&params.source, &params.query, Arc::clone(&self.provider))
                    .await
            }
            _ => {
                self.reader
                    .try_process(&params.source, &params.query, Arc::clone(&self.provider))
                    .await
            }
        };
        result.map_err(|e| to_mcp_error(&e))
    }

    async fn run_analyze(&self, params: &AnalyzeParams) -> Result<AnalysisReport, McpError> {
        self.reader
            .try_analyze(&params.source)
            .await
            .map_err(|e| to_mcp_error(&e))
    }
}
