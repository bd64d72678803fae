//! MCP transports: stdio and streamable HTTP.

use std::io::Write;
use std::sync::Arc;

use rmcp::ServiceExt;
use rmcp::transport::io::stdio;
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService};
use tokio_util::sync::CancellationToken;

use super::server::RlmMcpServer;

/// Where the server listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum McpTransport {
    /// JSON-RPC over stdin/stdout.
    Stdio,
    /// Streamable HTTP at `http://{host}:{port}/mcp`.
    Http {
        /// Host to bind to.
        host: String,
        /// Port to bind to.
        port: u16,
    },
}

/// Runs `server` on `transport` until the client disconnects or Ctrl-C.
///
/// # Errors
///
/// Returns an error if the transport cannot be set up or fails while running.
pub async fn serve(server: RlmMcpServer, transport: McpTransport) -> anyhow::Result<()> {
    match transport {
        McpTransport::Stdio => serve_stdio(server).await,
        McpTransport::Http { host, port } => serve_sse(server, &host, port).await,
    }
}

/// Starts the MCP server with stdio transport.
///
/// # Errors
///
/// Returns an error if the server fails to start or encounters a runtime error.
pub async fn serve_stdio(server: RlmMcpServer) -> anyhow::Result<()> {
    let service = server.serve(stdio()).await?;
    service.waiting().await?;
    Ok(())
}

/// Starts the MCP server with streamable HTTP transport (the successor to
/// the legacy SSE transport, hence the name).
///
/// # Errors
///
/// Returns an error if the server fails to bind or encounters a runtime error.
pub async fn serve_sse(server: RlmMcpServer, host: &str, port: u16) -> anyhow::Result<()> {
    let shutdown = CancellationToken::new();

    // Every session clones the same reader and provider; loop state is per call.
    let service = StreamableHttpService::new(
        move || Ok(server.clone()),
        Arc::new(LocalSessionManager::default()),
        StreamableHttpServerConfig {
            cancellation_token: shutdown.child_token(),
            ..Default::default()
        },
    );

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let _ = writeln!(std::io::stderr(), "rlm-reader MCP server on http://{addr}/mcp");

    let app = axum::Router::new().nest_service("/mcp", service);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            shutdown.cancel();
        })
        .await?;
    Ok(())
}
