//! Concurrent access: many sessions sharing one handler.
//!
//! Each simulated client owns a session stream and posts requests the way
//! the SSE transport does: dispatch on a spawned task, deliver the response
//! to the posting session. Responses must never cross sessions.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use serde_json::{json, Value};
use tokio::sync::Barrier;

use mcp_sse_server::builtin::KeyValueStore;
use mcp_sse_server::session::SessionId;
use mcp_sse_server::types::{JsonRpcMessage, JsonRpcRequest, RequestId};
use mcp_sse_server::{Builtins, Invoker, ProtocolHandler, ServerConfig, SessionManager};

// ─── Helpers ───────────────────────────────────────────────────────────────

fn create_handler(store: Arc<KeyValueStore>) -> (Arc<ProtocolHandler>, tempfile::TempDir) {
    let content = tempfile::tempdir().expect("Failed to create temp dir");
    let registry = Builtins::from_config(ServerConfig::default())
        .expect("Failed to build builtins")
        .with_content_root(content.path())
        .with_store(store)
        .build_registry()
        .expect("Failed to build registry")
        .into_shared();
    let handler = ProtocolHandler::new(registry, Invoker::with_deadline(Duration::from_secs(10)));
    (Arc::new(handler), content)
}

/// Post one request against `session` the way the transport does.
fn post(
    handler: &Arc<ProtocolHandler>,
    sessions: &Arc<SessionManager>,
    session: SessionId,
    id: i64,
    method: &str,
    params: Value,
) -> tokio::task::JoinHandle<()> {
    let request = JsonRpcRequest::new(RequestId::Number(id), method, Some(params));
    let handler = Arc::clone(handler);
    let sessions = Arc::clone(sessions);
    tokio::spawn(async move {
        if let Some(response) = handler
            .handle_message(JsonRpcMessage::Request(request))
            .await
        {
            let _ = sessions.deliver(&session, response).await;
        }
    })
}

fn add_args(a: i64, b: i64) -> Value {
    json!({"name": "add", "arguments": {"a": a, "b": b}})
}

// ─── Tests ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_parallel_sessions_get_their_own_responses() {
    let (handler, _content) = create_handler(Arc::new(KeyValueStore::seeded()));
    let sessions = Arc::new(SessionManager::default());

    const CLIENTS: i64 = 16;
    const REQUESTS: i64 = 20;

    let barrier = Arc::new(Barrier::new(CLIENTS as usize));
    let mut clients = Vec::new();
    for client in 0..CLIENTS {
        let handler = Arc::clone(&handler);
        let sessions = Arc::clone(&sessions);
        let barrier = Arc::clone(&barrier);
        clients.push(tokio::spawn(async move {
            let mut stream = sessions.open();
            let session = stream.id();
            barrier.wait().await;

            for n in 0..REQUESTS {
                post(&handler, &sessions, session, n, "tools/call", add_args(client * 1000, n));
            }

            let mut seen = HashSet::new();
            for _ in 0..REQUESTS {
                let response = tokio::time::timeout(Duration::from_secs(5), stream.next())
                    .await
                    .expect("Timed out waiting for a response")
                    .expect("Stream ended early");
                let id = response["id"].as_i64().unwrap();
                let sum: i64 = response["result"]["content"][0]["text"]
                    .as_str()
                    .unwrap()
                    .parse()
                    .unwrap();
                assert_eq!(sum, client * 1000 + id, "response crossed sessions");
                assert!(seen.insert(id), "duplicate response for id {id}");
            }
            seen.len()
        }));
    }

    for client in clients {
        assert_eq!(client.await.unwrap(), REQUESTS as usize);
    }
    assert!(sessions.is_empty());
}

#[tokio::test]
async fn test_writers_and_readers_share_the_store() {
    let store = Arc::new(KeyValueStore::new());
    let (handler, _content) = create_handler(Arc::clone(&store));
    let sessions = Arc::new(SessionManager::default());

    let mut writer = sessions.open();
    let writer_id = writer.id();
    for n in 0..50 {
        post(
            &handler,
            &sessions,
            writer_id,
            n,
            "tools/call",
            json!({"name": "db_put", "arguments": {
                "collection": "events",
                "id": format!("{n:03}"),
                "data": format!("{{\"seq\": {n}}}")
            }}),
        );
    }
    for _ in 0..50 {
        let response = writer.next().await.unwrap();
        assert!(response.get("result").is_some(), "write failed: {response}");
    }
    assert_eq!(store.ids("events").len(), 50);

    // Readers on separate sessions see every record
    let mut readers = Vec::new();
    for r in 0..4 {
        let handler = Arc::clone(&handler);
        let sessions = Arc::clone(&sessions);
        readers.push(tokio::spawn(async move {
            let mut stream = sessions.open();
            let id = stream.id();
            for n in 0..50 {
                post(
                    &handler,
                    &sessions,
                    id,
                    n,
                    "resources/read",
                    json!({"uri": format!("db://events/{n:03}")}),
                );
            }
            let mut total = 0;
            for _ in 0..50 {
                let response = stream.next().await.unwrap();
                let text = response["result"]["contents"][0]["text"].as_str().unwrap();
                let record: Value = serde_json::from_str(text).unwrap();
                total += record["seq"].as_i64().unwrap();
            }
            (r, total)
        }));
    }

    for reader in readers {
        let (_, total) = reader.await.unwrap();
        assert_eq!(total, (0..50).sum::<i64>());
    }
}

#[tokio::test]
async fn test_closed_session_discards_in_flight_responses() {
    let (handler, _content) = create_handler(Arc::new(KeyValueStore::seeded()));
    let sessions = Arc::new(SessionManager::default());

    let closing = sessions.open();
    let closing_id = closing.id();
    let mut staying = sessions.open();
    let staying_id = staying.id();

    let in_flight = post(&handler, &sessions, closing_id, 1, "tools/call", add_args(1, 1));
    drop(closing);
    in_flight.await.unwrap();
    assert!(sessions.get(&closing_id).is_err());

    post(&handler, &sessions, staying_id, 2, "ping", json!({}));
    let response = staying.next().await.unwrap();
    assert_eq!(response["id"], 2);
}
