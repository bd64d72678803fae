//! MCP tool parameter types.
//!
//! Defines the input schemas for MCP tools using `schemars` for automatic
//! JSON Schema generation required by the MCP protocol.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `query` MCP tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QueryParams {
    /// Local path or http(s) URL of the document.
    pub source: String,

    /// The question to answer about the document.
    pub query: String,

    /// Root-loop iteration budget override (0 or absent = configured value).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<usize>,

    /// Return the markdown report instead of JSON.
    #[serde(default)]
    pub markdown: bool,
}

/// Parameters for the `analyze` MCP tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnalyzeParams {
    /// Local path or http(s) URL of the document.
    pub source: String,

    /// Return the markdown report instead of JSON.
    #[serde(default)]
    pub markdown: bool,
}
