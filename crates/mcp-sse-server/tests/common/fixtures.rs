//! Shared fixtures for MCP server tests.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tempfile::TempDir;

use mcp_sse_server::builtin::{SearchClient, SearchHit};
use mcp_sse_server::schema::Arguments;
use mcp_sse_server::tools::ToolExecutor;
use mcp_sse_server::types::{McpError, McpResult, ToolCallResult};
use mcp_sse_server::{Builtins, CapabilityRegistry, Invoker, ProtocolHandler, ServerConfig};

/// Bytes of the sample PDF under `docs/pdf/report.pdf`.
pub const REPORT_BYTES: &[u8] = &[0x25, 0x50, 0x44, 0x46, 0x2d, 0x00, 0xff, 0x10];

/// A content root with one file of each kind.
pub fn content_dir() -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let root = dir.path();

    std::fs::create_dir_all(root.join("logs")).unwrap();
    std::fs::write(
        root.join("logs/app.log"),
        "INFO server started\nERROR upstream timed out\n",
    )
    .unwrap();

    std::fs::create_dir_all(root.join("docs/pdf")).unwrap();
    std::fs::write(root.join("docs/pdf/report.pdf"), REPORT_BYTES).unwrap();

    std::fs::create_dir_all(root.join("text/notes")).unwrap();
    std::fs::write(root.join("text/notes/todo.md"), "# Todo\n- ship it\n").unwrap();

    dir
}

/// The built-in catalog over `root`, with no search key configured.
pub fn builtins(root: &Path) -> Builtins {
    Builtins::from_config(ServerConfig::default())
        .expect("Failed to build builtins")
        .with_content_root(root)
}

/// Share `registry` behind a handler with a short deadline.
pub fn handler_for(registry: CapabilityRegistry) -> ProtocolHandler {
    ProtocolHandler::new(
        registry.into_shared(),
        Invoker::with_deadline(Duration::from_secs(5)),
    )
}

/// A handler serving the built-in catalog over `root`.
pub fn builtin_handler(root: &Path) -> ProtocolHandler {
    let registry = builtins(root)
        .build_registry()
        .expect("Failed to build registry");
    handler_for(registry)
}

/// Encode one JSON-RPC request frame.
pub fn frame(id: i64, method: &str, params: Value) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params,
    }))
    .unwrap()
}

/// Send one request through `handler` and return its response.
pub async fn request(handler: &ProtocolHandler, id: i64, method: &str, params: Value) -> Value {
    handler
        .handle_frame(&frame(id, method, params))
        .await
        .expect("Requests always get a response")
}

/// Text of the first content block of a tool result.
pub fn result_text(response: &Value) -> &str {
    response["result"]["content"][0]["text"]
        .as_str()
        .unwrap_or_else(|| panic!("Expected text content in {response}"))
}

/// The `error.data.kind` tag of a failure response.
pub fn error_kind(response: &Value) -> &str {
    response["error"]["data"]["kind"]
        .as_str()
        .unwrap_or_else(|| panic!("Expected a failure response, got {response}"))
}

/// Tool executor that counts its calls and echoes its arguments.
#[derive(Clone, Default)]
pub struct CountingTool {
    pub calls: Arc<AtomicUsize>,
}

impl CountingTool {
    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ToolExecutor for CountingTool {
    async fn execute(&self, args: Arguments) -> McpResult<ToolCallResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ToolCallResult::json(&Value::Object(args)))
    }
}

/// Tool executor that sleeps before answering.
pub struct SlowTool(pub Duration);

#[async_trait]
impl ToolExecutor for SlowTool {
    async fn execute(&self, _args: Arguments) -> McpResult<ToolCallResult> {
        tokio::time::sleep(self.0).await;
        Ok(ToolCallResult::text("done"))
    }
}

/// Tool executor that panics.
pub struct PanickingTool;

#[async_trait]
impl ToolExecutor for PanickingTool {
    async fn execute(&self, _args: Arguments) -> McpResult<ToolCallResult> {
        panic!("tool blew up");
    }
}

/// Search capability answering from a fixed list.
#[derive(Default)]
pub struct StubSearch {
    pub hits: Vec<SearchHit>,
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl StubSearch {
    pub fn with_hits(n: usize) -> Self {
        Self {
            hits: (1..=n)
                .map(|i| SearchHit {
                    title: format!("Result {i}"),
                    url: format!("https://example.com/{i}"),
                    description: format!("Description {i}"),
                })
                .collect(),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl SearchClient for StubSearch {
    async fn search(&self, _query: &str, count: usize) -> McpResult<Vec<SearchHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(McpError::Upstream("search provider returned 503".into()));
        }
        Ok(self.hits.iter().take(count).cloned().collect())
    }
}
