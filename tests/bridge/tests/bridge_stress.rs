//! Stress: many requests and rapid session churn through one handler.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use futures::StreamExt;
use serde_json::{json, Value};

use mcp_sse_server::types::{JsonRpcMessage, JsonRpcRequest, RequestId};
use mcp_sse_server::{Builtins, Invoker, ProtocolHandler, ServerConfig, SessionManager};

// ─── Helpers ───────────────────────────────────────────────────────────────

fn create_handler() -> (Arc<ProtocolHandler>, tempfile::TempDir) {
    let content = tempfile::tempdir().expect("Failed to create temp dir");
    std::fs::create_dir_all(content.path().join("logs")).unwrap();
    std::fs::write(content.path().join("logs/big.log"), "line\n".repeat(20_000)).unwrap();

    let registry = Builtins::from_config(ServerConfig::default())
        .expect("Failed to build builtins")
        .with_content_root(content.path())
        .build_registry()
        .expect("Failed to build registry")
        .into_shared();
    let handler = ProtocolHandler::new(registry, Invoker::with_deadline(Duration::from_secs(30)));
    (Arc::new(handler), content)
}

async fn send(handler: &ProtocolHandler, id: i64, method: &str, params: Value) -> Value {
    let request = JsonRpcRequest::new(RequestId::Number(id), method, Some(params));
    handler
        .handle_message(JsonRpcMessage::Request(request))
        .await
        .expect("Requests always get a response")
}

// ─── Tests ─────────────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_thousand_concurrent_requests() {
    let (handler, _content) = create_handler();

    let start = Instant::now();
    let calls = (0..1000).map(|i| {
        let handler = Arc::clone(&handler);
        tokio::spawn(async move {
            let (method, params) = match i % 4 {
                0 => (
                    "tools/call",
                    json!({"name": "add", "arguments": {"a": i, "b": 1}}),
                ),
                1 => (
                    "resources/read",
                    json!({"uri": format!("greeting://user{i}")}),
                ),
                2 => ("resources/read", json!({"uri": "log://big.log"})),
                _ => ("tools/list", json!({})),
            };
            (i, send(&handler, i, method, params).await)
        })
    });

    for outcome in join_all(calls).await {
        let (i, response) = outcome.unwrap();
        assert_eq!(response["id"], i, "response id mismatch");
        assert!(response.get("result").is_some(), "request {i} failed: {response}");
        if i % 4 == 0 {
            assert_eq!(
                response["result"]["content"][0]["text"],
                (i + 1).to_string()
            );
        }
    }

    eprintln!("1000 requests in {:?}", start.elapsed());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_session_churn() {
    let (handler, _content) = create_handler();
    let sessions = Arc::new(SessionManager::new(4));

    let churners = (0..8).map(|_| {
        let handler = Arc::clone(&handler);
        let sessions = Arc::clone(&sessions);
        tokio::spawn(async move {
            for round in 0..50 {
                let mut stream = sessions.open();
                let id = stream.id();
                let response = send(&handler, round, "ping", json!({})).await;
                sessions.deliver(&id, response).await.unwrap();
                let echoed = stream.next().await.unwrap();
                assert_eq!(echoed["id"], round);
            }
        })
    });

    for churner in join_all(churners).await {
        churner.unwrap();
    }
    assert!(sessions.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_failures_do_not_poison_the_handler() {
    let (handler, _content) = create_handler();

    let calls = (0..200).map(|i| {
        let handler = Arc::clone(&handler);
        tokio::spawn(async move {
            let params = if i % 2 == 0 {
                json!({"name": "add", "arguments": {"a": "bad", "b": 1}})
            } else {
                json!({"name": "add", "arguments": {"a": i, "b": i}})
            };
            (i, send(&handler, i, "tools/call", params).await)
        })
    });

    for outcome in join_all(calls).await {
        let (i, response) = outcome.unwrap();
        if i % 2 == 0 {
            assert_eq!(response["error"]["data"]["kind"], "invalid_arguments");
        } else {
            assert_eq!(
                response["result"]["content"][0]["text"],
                (2 * i).to_string()
            );
        }
    }
}
