//! CLI command implementations.
//!
//! Contains the business logic for each CLI command. Commands return the
//! text to print; the binary decides where it goes.

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::format_push_string)]

use std::path::Path;
use std::time::Duration;

use crate::agent::client::create_provider;
use crate::agent::config::{RlmConfig, RlmConfigBuilder};
use crate::agent::prompt::PromptSet;
use crate::chunking::create_chunker;
use crate::cli::output::{OutputFormat, format_chunks};
#[cfg(feature = "mcp")]
use crate::cli::parser::McpCommands;
use crate::cli::parser::{ChunkingArgs, Cli, Commands};
use crate::error::{CommandError, Result};
use crate::reader::DocumentReader;

// ==================== Parameter Structs ====================

/// Parameters for the query command.
#[derive(Debug, Clone, Default)]
pub struct QueryCommandParams<'a> {
    /// Local path or URL of the document.
    pub source: &'a str,
    /// The question to answer.
    pub query: &'a str,
    /// Segmentation overrides.
    pub chunking: ChunkingArgs,
    /// Root-loop iteration budget.
    pub max_iterations: Option<usize>,
    /// Cap on code output fed back per iteration.
    pub max_output_length: Option<usize>,
    /// Maximum concurrent sub-calls.
    pub concurrency: Option<usize>,
    /// Per-call timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Model for root calls.
    pub root_model: Option<&'a str>,
    /// Model for sub-calls.
    pub sub_model: Option<&'a str>,
}

/// Executes the CLI command.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);

    match &cli.command {
        Commands::Query {
            source,
            query,
            chunking,
            max_iterations,
            max_output_length,
            concurrency,
            timeout,
            root_model,
            sub_model,
        } => {
            let params = QueryCommandParams {
                source,
                query,
                chunking: chunking.clone(),
                max_iterations: *max_iterations,
                max_output_length: *max_output_length,
                concurrency: *concurrency,
                timeout_secs: *timeout,
                root_model: root_model.as_deref(),
                sub_model: sub_model.as_deref(),
            };
            cmd_query(cli, &params, format)
        }
        Commands::Analyze { source } => {
            let config = build_config(base_builder(cli, &ChunkingArgs::default()))?;
            cmd_analyze(config, source, format)
        }
        Commands::Chunks {
            source,
            chunking,
            strategy,
            preview,
        } => {
            let config = build_config(base_builder(cli, chunking))?;
            cmd_chunks(config, source, strategy, *preview, format)
        }
        Commands::InitPrompts { dir } => cmd_init_prompts(dir.as_deref(), format),

        #[cfg(feature = "mcp")]
        Commands::Mcp(sub) => cmd_mcp(sub, cli),
    }
}

// ==================== Configuration ====================

/// Builder carrying the overrides every command shares.
fn base_builder(cli: &Cli, chunking: &ChunkingArgs) -> RlmConfigBuilder {
    let mut builder = RlmConfig::builder();
    if let Some(n) = chunking.chunk_size {
        builder = builder.chunk_size(n);
    }
    if let Some(n) = chunking.overlap {
        builder = builder.overlap(n);
    }
    if let Some(dir) = &cli.prompt_dir {
        builder = builder.prompt_dir(dir.clone());
    }
    if cli.verbose {
        builder = builder.verbose(true);
    }
    builder
}

/// Fills unset fields from the environment and validates.
fn build_config(builder: RlmConfigBuilder) -> Result<RlmConfig> {
    Ok(builder.from_env().build()?)
}

fn query_config(cli: &Cli, params: &QueryCommandParams<'_>) -> Result<RlmConfig> {
    let mut builder = base_builder(cli, &params.chunking);
    if let Some(n) = params.max_iterations {
        builder = builder.max_iterations(n);
    }
    if let Some(n) = params.max_output_length {
        builder = builder.max_output_length(n);
    }
    if let Some(n) = params.concurrency {
        builder = builder.max_concurrency(n);
    }
    if let Some(secs) = params.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    if let Some(model) = params.root_model {
        builder = builder.root_model(model);
    }
    if let Some(model) = params.sub_model {
        builder = builder.sub_model(model);
    }
    build_config(builder)
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to create async runtime: {e}")).into()
    })
}

// ==================== Document Commands ====================

fn cmd_query(cli: &Cli, params: &QueryCommandParams<'_>, format: OutputFormat) -> Result<String> {
    let config = query_config(cli, params)?;

    let provider = create_provider(&config).map_err(|e| {
        CommandError::ExecutionFailed(format!("Provider creation failed: {e}"))
    })?;
    let reader = DocumentReader::new(config)?;

    let rt = runtime()?;
    let report = rt.block_on(reader.try_process(params.source, params.query, provider))?;

    match format {
        OutputFormat::Text => Ok(report.to_markdown()),
        OutputFormat::Json | OutputFormat::Ndjson => Ok(format.to_json(&report)),
    }
}

fn cmd_analyze(config: RlmConfig, source: &str, format: OutputFormat) -> Result<String> {
    let reader = DocumentReader::new(config)?;
    let rt = runtime()?;
    let report = rt.block_on(reader.try_analyze(source))?;

    match format {
        OutputFormat::Text => Ok(report.to_markdown()),
        OutputFormat::Json | OutputFormat::Ndjson => Ok(format.to_json(&report)),
    }
}

fn cmd_chunks(
    config: RlmConfig,
    source: &str,
    strategy: &str,
    preview: usize,
    format: OutputFormat,
) -> Result<String> {
    let chunker = create_chunker(strategy, config.chunk_size, config.overlap)?;
    let reader = DocumentReader::new(config)?;
    let rt = runtime()?;
    let document = rt.block_on(reader.load(source))?;
    let chunks = chunker.chunk(&document.content);

    match format {
        OutputFormat::Text => Ok(format_chunks(&document.title, &chunks, preview)),
        OutputFormat::Json | OutputFormat::Ndjson => {
            let json = serde_json::json!({
                "title": document.title,
                "strategy": chunker.name(),
                "chunk_size": reader.config().chunk_size,
                "overlap": reader.config().overlap,
                "count": chunks.len(),
                "chunks": chunks,
            });
            Ok(format.to_json(&json))
        }
    }
}

// ==================== Prompt Templates ====================

fn cmd_init_prompts(dir: Option<&Path>, format: OutputFormat) -> Result<String> {
    let target_dir = dir
        .map(std::path::PathBuf::from)
        .or_else(PromptSet::default_dir)
        .ok_or_else(|| {
            CommandError::ExecutionFailed(
                "Could not determine home directory for default prompt path".to_string(),
            )
        })?;

    let written = PromptSet::write_defaults(&target_dir).map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to write prompt templates: {e}"))
    })?;

    match format {
        OutputFormat::Text => {
            if written.is_empty() {
                Ok(format!(
                    "All prompt templates already exist in: {}\n",
                    target_dir.display()
                ))
            } else {
                let mut output = format!(
                    "Wrote {} prompt template(s) to: {}\n",
                    written.len(),
                    target_dir.display()
                );
                for path in &written {
                    output.push_str(&format!(
                        "  {}\n",
                        path.file_name()
                            .and_then(|n| n.to_str())
                            .unwrap_or("unknown")
                    ));
                }
                output.push_str("\nEdit these files to customize the system prompts.\n");
                Ok(output)
            }
        }
        OutputFormat::Json | OutputFormat::Ndjson => {
            let json = serde_json::json!({
                "directory": target_dir.to_string_lossy(),
                "written": written.iter().map(|p| p.to_string_lossy().into_owned()).collect::<Vec<_>>(),
                "count": written.len()
            });
            Ok(format.to_json(&json))
        }
    }
}

// ==================== MCP Server ====================

/// Starts the MCP server with the specified transport.
///
/// Runs until the client disconnects (stdio) or the server is stopped (SSE).
#[cfg(feature = "mcp")]
fn cmd_mcp(cmd: &McpCommands, cli: &Cli) -> Result<String> {
    use crate::mcp::{McpTransport, RlmMcpServer, serve};

    let config = build_config(base_builder(cli, &ChunkingArgs::default()))?;
    let server = RlmMcpServer::new(config).map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to create MCP server: {e}"))
    })?;
    let transport = match cmd {
        McpCommands::Stdio => McpTransport::Stdio,
        McpCommands::Sse { host, port } => McpTransport::Http {
            host: host.clone(),
            port: *port,
        },
    };

    runtime()?
        .block_on(serve(server, transport))
        .map_err(|e| CommandError::ExecutionFailed(format!("MCP server error: {e}")))?;

    Ok(String::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    const SAMPLE: &str = "# Title\n\nIntro paragraph with several words.\n\n## Methods\n\n| a | b |\n| 1 | 2 |\n";

    fn setup() -> (TempDir, String) {
        let temp_dir = TempDir::new().unwrap_or_else(|e| panic!("tempdir: {e}"));
        let path = temp_dir.path().join("sample.md");
        std::fs::write(&path, SAMPLE).unwrap_or_else(|e| panic!("write: {e}"));
        let source = path.to_string_lossy().into_owned();
        (temp_dir, source)
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap_or_else(|e| panic!("parse failed: {e}"))
    }

    #[test]
    fn test_cmd_analyze_text() {
        let (_dir, source) = setup();
        let cli = parse(&["rlm-reader", "analyze", &source]);
        let out = execute(&cli).unwrap_or_else(|e| panic!("analyze failed: {e}"));
        assert!(out.starts_with("# Document Structure Analysis"));
        assert!(out.contains("sample"));
        assert!(out.contains("Intro paragraph"));
    }

    #[test]
    fn test_cmd_analyze_json() {
        let (_dir, source) = setup();
        let cli = parse(&["rlm-reader", "--format", "json", "analyze", &source]);
        let out = execute(&cli).unwrap_or_else(|e| panic!("analyze failed: {e}"));
        let value: serde_json::Value =
            serde_json::from_str(&out).unwrap_or_else(|e| panic!("invalid json: {e}"));
        assert_eq!(value["title"], "sample");
        assert_eq!(value["structure"]["section_count"], 2);
        assert_eq!(value["structure"]["table_count"], 2);
    }

    #[test]
    fn test_cmd_analyze_missing_file() {
        let cli = parse(&["rlm-reader", "analyze", "/definitely/not/here.txt"]);
        let err = execute(&cli).err().map(|e| e.to_string()).unwrap_or_default();
        assert!(err.contains("not found"), "unexpected error: {err}");
    }

    #[test]
    fn test_cmd_chunks_lists_segments() {
        let (_dir, source) = setup();
        let cli = parse(&["rlm-reader", "--format", "json", "chunks", &source]);
        let out = execute(&cli).unwrap_or_else(|e| panic!("chunks failed: {e}"));
        let value: serde_json::Value =
            serde_json::from_str(&out).unwrap_or_else(|e| panic!("invalid json: {e}"));
        assert_eq!(value["title"], "sample");
        let listed = value["chunks"].as_array().map_or(0, Vec::len);
        assert_eq!(value["count"], serde_json::json!(listed));
    }

    #[test]
    fn test_cmd_chunks_rejects_bad_overlap() {
        let (_dir, source) = setup();
        let cli = parse(&[
            "rlm-reader",
            "chunks",
            &source,
            "--chunk-size",
            "100",
            "--overlap",
            "100",
        ]);
        let err = execute(&cli).err().map(|e| e.to_string()).unwrap_or_default();
        assert!(err.contains("must be smaller than chunk_size"), "unexpected error: {err}");
    }

    #[test]
    fn test_cmd_chunks_forced_size_strategy() {
        let (_dir, source) = setup();
        let cli = parse(&[
            "rlm-reader",
            "--format",
            "json",
            "chunks",
            &source,
            "--strategy",
            "size",
        ]);
        let out = execute(&cli).unwrap_or_else(|e| panic!("chunks failed: {e}"));
        let value: serde_json::Value =
            serde_json::from_str(&out).unwrap_or_else(|e| panic!("invalid json: {e}"));
        assert_eq!(value["strategy"], "size");
    }

    #[test]
    fn test_cmd_init_prompts() {
        let temp_dir = TempDir::new().unwrap_or_else(|e| panic!("tempdir: {e}"));
        let dir = temp_dir.path().join("prompts");

        let out = cmd_init_prompts(Some(&dir), OutputFormat::Text)
            .unwrap_or_else(|e| panic!("init-prompts failed: {e}"));
        assert!(out.contains("Wrote 2 prompt template(s)"));
        assert!(dir.join("root.md").exists());
        assert!(dir.join("subcall.md").exists());

        let again = cmd_init_prompts(Some(&dir), OutputFormat::Text)
            .unwrap_or_else(|e| panic!("init-prompts failed: {e}"));
        assert!(again.contains("already exist"));
    }

    #[test]
    fn test_query_config_overrides() {
        let cli = parse(&["rlm-reader", "-v", "query", "doc.txt", "q"]);
        let params = QueryCommandParams {
            source: "doc.txt",
            query: "q",
            chunking: ChunkingArgs {
                chunk_size: Some(2_000),
                overlap: Some(100),
            },
            max_iterations: Some(3),
            concurrency: Some(2),
            timeout_secs: Some(9),
            root_model: Some("root-x"),
            ..Default::default()
        };
        let config = query_config(&cli, &params).unwrap_or_else(|e| panic!("config: {e}"));
        assert_eq!(config.chunk_size, 2_000);
        assert_eq!(config.overlap, 100);
        assert_eq!(config.max_iterations, 3);
        assert_eq!(config.max_concurrency, 2);
        assert_eq!(config.timeout, Duration::from_secs(9));
        assert_eq!(config.root_model, "root-x");
        assert!(config.verbose);
    }
}
