//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::chunking::available_strategies;

/// Default preview length for the `chunks` listing.
pub const DEFAULT_CHUNK_PREVIEW: usize = 80;

/// RLM-Reader: answer questions about documents larger than a context window.
///
/// Extracts a document, externalizes it into a sandboxed REPL and lets a
/// root model explore it iteratively, delegating sub-questions to parallel
/// sub-model calls.
#[derive(Parser, Debug)]
#[command(name = "rlm-reader")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (per-iteration progress on stderr).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json, ndjson).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// Directory containing prompt templates (root.md, subcall.md).
    ///
    /// Defaults to `~/.config/rlm-reader/prompts/`; missing files fall back
    /// to the built-in prompts.
    #[arg(long, global = true)]
    pub prompt_dir: Option<PathBuf>,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Segmentation overrides shared by commands that chunk a document.
#[derive(Args, Debug, Clone, Default)]
pub struct ChunkingArgs {
    /// Size-based chunk length in characters [env: `RLM_CHUNK_SIZE`, default: 10000].
    #[arg(short = 'c', long)]
    pub chunk_size: Option<usize>,

    /// Overlap between size-based chunks in characters [env: `RLM_OVERLAP`, default: 500].
    #[arg(long)]
    pub overlap: Option<usize>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Answer a question about a document.
    ///
    /// Runs the recursive loop: the root model inspects the document through
    /// code, delegates `llm_query` sub-questions, and finishes with `FINAL(...)`.
    #[command(after_help = r#"Examples:
  rlm-reader query paper.pdf "What are the main findings?"
  rlm-reader query https://example.com/report.pdf "Summarize section 3"
  rlm-reader query notes.md "List every TODO" --max-iterations 20
  rlm-reader --format json query paper.pdf "Who are the authors?" | jq '.answer'
"#)]
    Query {
        /// Local path or http(s) URL of the document.
        source: String,

        /// The question to answer.
        query: String,

        /// Segmentation overrides.
        #[command(flatten)]
        chunking: ChunkingArgs,

        /// Maximum root-loop iterations [env: `RLM_MAX_ITERATIONS`, default: 10].
        #[arg(short = 'n', long)]
        max_iterations: Option<usize>,

        /// Maximum characters of code output fed back per iteration [env: `RLM_MAX_OUTPUT_LENGTH`].
        #[arg(long)]
        max_output_length: Option<usize>,

        /// Maximum concurrent sub-calls [env: `RLM_MAX_CONCURRENCY`, default: 8].
        #[arg(long)]
        concurrency: Option<usize>,

        /// Timeout per reasoning call in seconds [env: `RLM_TIMEOUT_SECS`, default: 120].
        #[arg(long)]
        timeout: Option<u64>,

        /// Model for root calls [env: `RLM_ROOT_MODEL`].
        #[arg(long)]
        root_model: Option<String>,

        /// Model for sub-calls [env: `RLM_SUB_MODEL`].
        #[arg(long)]
        sub_model: Option<String>,
    },

    /// Summarize a document's structure without calling any model.
    #[command(after_help = r#"Examples:
  rlm-reader analyze paper.pdf
  rlm-reader --format json analyze notes.md | jq '.structure.recommended_method'
"#)]
    Analyze {
        /// Local path or http(s) URL of the document.
        source: String,
    },

    /// List the chunks the segmenter produces for a document.
    #[command(after_help = r#"Examples:
  rlm-reader chunks paper.pdf
  rlm-reader chunks notes.md --chunk-size 2000 --overlap 100
  rlm-reader chunks notes.md --preview 0       # Hide content previews
  rlm-reader chunks notes.md --strategy size   # Force fixed-size windows
"#)]
    Chunks {
        /// Local path or http(s) URL of the document.
        source: String,

        /// Segmentation overrides.
        #[command(flatten)]
        chunking: ChunkingArgs,

        /// Segmentation strategy: auto (sections, else size), section, size.
        #[arg(
            short,
            long,
            default_value = "auto",
            value_parser = clap::builder::PossibleValuesParser::new(available_strategies().iter().copied())
        )]
        strategy: String,

        /// Characters of content to preview per chunk (0 disables).
        #[arg(long, default_value_t = DEFAULT_CHUNK_PREVIEW)]
        preview: usize,
    },

    /// Write default prompt templates to disk for customization.
    ///
    /// Creates markdown template files in the prompt directory so users
    /// can customize system prompts without recompiling.
    #[command(name = "init-prompts")]
    #[command(after_help = r#"Examples:
  rlm-reader init-prompts                        # Write to ~/.config/rlm-reader/prompts/
  rlm-reader init-prompts --dir ./my-prompts     # Write to custom directory
"#)]
    InitPrompts {
        /// Target directory for prompt templates.
        ///
        /// Defaults to `~/.config/rlm-reader/prompts/`.
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Run as an MCP (Model Context Protocol) server.
    #[cfg(feature = "mcp")]
    #[command(subcommand)]
    Mcp(McpCommands),
}

/// MCP server subcommands.
#[cfg(feature = "mcp")]
#[derive(Subcommand, Debug)]
pub enum McpCommands {
    /// Start MCP server with stdio transport.
    ///
    /// Reads JSON-RPC messages from stdin, writes responses to stdout.
    #[command(after_help = r#"Examples:
  rlm-reader mcp stdio                         # Start stdio MCP server
  OPENAI_API_KEY=sk-... rlm-reader mcp stdio   # With API key
"#)]
    Stdio,

    /// Start MCP server with streamable HTTP transport.
    #[command(after_help = r#"Examples:
  rlm-reader mcp sse                            # Listen on 127.0.0.1:3000
  rlm-reader mcp sse --host 0.0.0.0 --port 8080
"#)]
    Sse {
        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to.
        #[arg(long, default_value = "3000")]
        port: u16,
    },
}
