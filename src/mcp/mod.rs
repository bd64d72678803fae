//! MCP (Model Context Protocol) server for rlm-reader.
//!
//! Exposes document querying and structure analysis to external agents.
//!
//! # Feature Gate
//!
//! This module requires the `mcp` feature flag:
//! ```toml
//! [dependencies]
//! rlm-reader = { version = "...", features = ["mcp"] }
//! ```
//!
//! # Architecture
//!
//! ```text
//! MCP Client
//!   ↓ query(source, query)
//! RlmMcpServer
//!   ↓
//! DocumentReader::try_process()
//!   ├── Extractor → Document
//!   ├── Segmenter → chunks
//!   └── Orchestrator loop (sandbox + llm_query fan-out)
//!   ↓
//! QueryReport JSON → MCP Client
//! ```

pub mod params;
pub mod server;
pub mod transport;

pub use params::{AnalyzeParams, QueryParams};
pub use server::RlmMcpServer;
pub use transport::{McpTransport, serve, serve_sse, serve_stdio};
