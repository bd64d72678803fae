//! Reasoning boundary and the recursive loop that drives it.
//!
//! # Architecture
//!
//! ```text
//! query + framed context → Orchestrator
//!   ├── root call (LlmProvider) → parser::parse → Intent
//!   │   ├── FinalAnswer  → done
//!   │   ├── CodeBlock    → Sandbox::run → output becomes next prompt
//!   │   ├── SubQueries   → subcall::dispatch_all (concurrent, ordered)
//!   │   └── Continue     → reply becomes next prompt
//!   └── repeat until FINAL or max_iterations
//! ```
//!
//! The provider abstraction is backed by OpenAI-compatible APIs (feature
//! `openai`) or any closure via [`FnProvider`].

pub mod client;
pub mod config;
pub mod message;
pub mod orchestrator;
pub mod parser;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod sandbox;
pub mod stats;
pub mod subcall;

pub use client::create_provider;
pub use config::{RlmConfig, RlmConfigBuilder};
pub use message::{ChatMessage, ChatRequest, ChatResponse, Role};
pub use orchestrator::{Completion, Orchestrator};
pub use parser::Intent;
pub use prompt::PromptSet;
pub use provider::{FnProvider, LlmProvider};
pub use sandbox::Sandbox;
pub use stats::RlmStats;
pub use subcall::SubcallResult;
