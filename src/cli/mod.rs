//! CLI layer for RLM-Reader.
//!
//! Provides the command-line interface using clap, with commands for
//! querying and inspecting documents.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
#[cfg(feature = "mcp")]
pub use parser::McpCommands;
pub use parser::{ChunkingArgs, Cli, Commands};
