//! Phase 5: HTTP and SSE transport.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, BodyDataStream};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use futures::StreamExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use mcp_sse_server::{SessionManager, SseTransport};

use common::fixtures::{builtin_handler, content_dir, frame};

struct Server {
    _content: TempDir,
    transport: SseTransport,
    app: Router,
}

fn server() -> Server {
    let content = content_dir();
    let transport = SseTransport::new(
        builtin_handler(content.path()),
        Arc::new(SessionManager::default()),
    );
    let app = transport.router();
    Server {
        _content: content,
        transport,
        app,
    }
}

/// Reads `event:`/`data:` pairs off an SSE body.
struct EventReader {
    body: BodyDataStream,
    buffer: String,
}

impl EventReader {
    fn new(body: Body) -> Self {
        Self {
            body: body.into_data_stream(),
            buffer: String::new(),
        }
    }

    async fn next_event(&mut self) -> (String, String) {
        loop {
            if let Some(end) = self.buffer.find("\n\n") {
                let raw: String = self.buffer.drain(..end + 2).collect();
                let mut event = String::from("message");
                let mut data = String::new();
                for line in raw.lines() {
                    if let Some(value) = line.strip_prefix("event:") {
                        event = value.trim_start().to_string();
                    } else if let Some(value) = line.strip_prefix("data:") {
                        data.push_str(value.trim_start());
                    }
                }
                // Keep-alive comments carry no data
                if data.is_empty() {
                    continue;
                }
                return (event, data);
            }

            let chunk = tokio::time::timeout(Duration::from_secs(5), self.body.next())
                .await
                .expect("Timed out waiting for an event")
                .expect("Stream ended")
                .expect("Body error");
            self.buffer.push_str(std::str::from_utf8(&chunk).unwrap());
        }
    }

    async fn next_message(&mut self) -> Value {
        let (event, data) = self.next_event().await;
        assert_eq!(event, "message");
        serde_json::from_str(&data).unwrap()
    }
}

async fn open_session(app: &Router) -> (String, EventReader) {
    let response = app
        .clone()
        .oneshot(Request::get("/sse").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));

    let mut reader = EventReader::new(response.into_body());
    let (event, endpoint) = reader.next_event().await;
    assert_eq!(event, "endpoint");
    assert!(endpoint.starts_with("/messages?sessionId="));
    (endpoint, reader)
}

async fn post(app: &Router, endpoint: &str, body: Vec<u8>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::post(endpoint)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let server = server();
    let response = server
        .app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn test_info() {
    let server = server();
    let response = server
        .app
        .clone()
        .oneshot(Request::get("/info").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let info: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(info["name"], "mcp-sse-server");
    assert_eq!(info["endpoints"], json!(["/sse", "/messages", "/info", "/health"]));
    assert_eq!(info["tools"].as_array().unwrap().len(), 4);
    assert_eq!(info["resourceCount"], 2);
    assert_eq!(info["resourceTemplateCount"], 5);
    assert_eq!(info["promptCount"], 3);
}

#[tokio::test]
async fn test_cors_is_permissive() {
    let server = server();
    let response = server
        .app
        .clone()
        .oneshot(
            Request::get("/health")
                .header(header::ORIGIN, "https://client.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[tokio::test]
async fn test_post_to_unknown_session() {
    let server = server();

    let (status, body) = post(
        &server.app,
        "/messages?sessionId=6f1d8a5e-3c2b-4e7f-9a10-0b1c2d3e4f50",
        frame(1, "ping", json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["data"]["kind"], "session_not_found");

    let (status, _) = post(&server.app, "/messages", frame(1, "ping", json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_request_response_over_stream() {
    let server = server();
    let (endpoint, mut events) = open_session(&server.app).await;
    assert_eq!(server.transport.sessions().len(), 1);

    let (status, _) = post(
        &server.app,
        &endpoint,
        frame(
            1,
            "initialize",
            json!({
                "protocolVersion": "2025-06-18",
                "capabilities": {},
                "clientInfo": {"name": "test", "version": "1"}
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let response = events.next_message().await;
    assert_eq!(response["id"], 1);
    assert_eq!(response["result"]["protocolVersion"], "2025-06-18");

    let (status, _) = post(
        &server.app,
        &endpoint,
        frame(2, "tools/call", json!({"name": "add", "arguments": {"a": 2, "b": 3}})),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let response = events.next_message().await;
    assert_eq!(response["id"], 2);
    assert_eq!(response["result"]["content"][0]["text"], "5");
}

#[tokio::test]
async fn test_malformed_frame() {
    let server = server();
    let (endpoint, mut events) = open_session(&server.app).await;

    let (status, body) = post(&server.app, &endpoint, b"{not json".to_vec()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], -32700);
    assert_eq!(body["id"], Value::Null);

    let pushed = events.next_message().await;
    assert_eq!(pushed["id"], Value::Null);
    assert_eq!(pushed["error"]["data"]["kind"], "malformed_request");
}

#[tokio::test]
async fn test_notifications_get_no_response() {
    let server = server();
    let (endpoint, mut events) = open_session(&server.app).await;

    let notification =
        serde_json::to_vec(&json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
            .unwrap();
    let (status, _) = post(&server.app, &endpoint, notification).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    // The next thing on the stream answers the ping, not the notification
    post(&server.app, &endpoint, frame(7, "ping", json!({}))).await;
    assert_eq!(events.next_message().await["id"], 7);
}

#[tokio::test]
async fn test_disconnect_closes_session() {
    let server = server();
    let (endpoint, events) = open_session(&server.app).await;
    assert_eq!(server.transport.sessions().len(), 1);

    drop(events);
    assert!(server.transport.sessions().is_empty());

    let (status, body) = post(&server.app, &endpoint, frame(1, "ping", json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["data"]["kind"], "session_not_found");
}

#[tokio::test]
async fn test_responses_go_to_their_own_session() {
    let server = server();
    let (endpoint_a, mut events_a) = open_session(&server.app).await;
    let (endpoint_b, mut events_b) = open_session(&server.app).await;
    assert_ne!(endpoint_a, endpoint_b);

    post(
        &server.app,
        &endpoint_a,
        frame(1, "resources/read", json!({"uri": "greeting://A"})),
    )
    .await;
    post(
        &server.app,
        &endpoint_b,
        frame(1, "resources/read", json!({"uri": "greeting://B"})),
    )
    .await;

    let a = events_a.next_message().await;
    let b = events_b.next_message().await;
    assert_eq!(a["result"]["contents"][0]["text"], "Hello, A!");
    assert_eq!(b["result"]["contents"][0]["text"], "Hello, B!");
}

#[tokio::test]
async fn test_shutdown_with_open_stream() {
    let server = server();
    let sessions = Arc::clone(server.transport.sessions());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let transport = server.transport;
    let running = tokio::spawn(async move {
        transport
            .serve_until(listener, async move {
                let _ = stop_rx.await;
            })
            .await
    });

    let mut response = reqwest::get(format!("http://{addr}/sse")).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let first = response.chunk().await.unwrap().unwrap();
    assert!(std::str::from_utf8(&first).unwrap().contains("/messages?sessionId="));
    assert_eq!(sessions.len(), 1);

    stop_tx.send(()).unwrap();

    let outcome = tokio::time::timeout(Duration::from_secs(5), running)
        .await
        .expect("Server kept running with a client connected");
    outcome.unwrap().unwrap();
    assert!(sessions.is_empty());

    // The client sees its stream end rather than hang
    let rest = tokio::time::timeout(Duration::from_secs(5), async {
        while let Ok(Some(_)) = response.chunk().await {}
    })
    .await;
    assert!(rest.is_ok());
}
