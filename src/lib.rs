//! # RLM-Reader
//!
//! Recursive Language Model document reader: answers questions about
//! documents far larger than a model's context window.
//!
//! The document is never pasted into a prompt. It is extracted to text,
//! bound as the read-only `context` variable of a small sandboxed
//! interpreter, and a root model explores it iteratively: it writes code to
//! slice and search the text, delegates focused sub-questions with
//! `llm_query("...")` (answered concurrently by a sub-model), and finishes
//! with `FINAL("...")`.
//!
//! ## Layout
//!
//! - [`extract`] turns a path or URL into a [`Document`]
//! - [`chunking`] segments documents (section-first, size fallback)
//! - [`analysis`] computes structure statistics
//! - [`agent`] holds the reasoning boundary, the sandbox and the loop
//! - [`report`] renders query and analysis reports
//! - [`reader`] bundles all of the above into a [`DocumentReader`]
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use rlm_reader::agent::{FnProvider, LlmProvider, RlmConfig};
//! use rlm_reader::DocumentReader;
//!
//! # async fn demo() -> rlm_reader::Result<()> {
//! let reader = DocumentReader::new(RlmConfig::default())?;
//! let provider: Arc<dyn LlmProvider> = Arc::new(FnProvider::new(|_prompt: &str, _system: &str| {
//!     Ok("FINAL(\"42\")".to_string())
//! }));
//! let report = reader.process("paper.pdf", "What is the answer?", provider).await;
//! assert!(report.contains("42"));
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod analysis;
pub mod chunking;
pub mod cli;
pub mod core;
pub mod error;
pub mod extract;
pub mod io;
#[cfg(feature = "mcp")]
pub mod mcp;
pub mod reader;
pub mod report;

pub use crate::core::{Chunk, ChunkMethod, Document, StructureReport};
pub use agent::{Completion, LlmProvider, RlmConfig, RlmStats};
pub use analysis::analyze;
pub use chunking::Segmenter;
pub use error::{Error, Result};
pub use extract::Extractor;
pub use reader::DocumentReader;
pub use report::{AnalysisReport, QueryReport};
