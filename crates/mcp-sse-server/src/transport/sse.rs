//! SSE transport: one event stream per client, requests posted alongside it.
//!
//! A client opens `GET /sse` and learns its post URL from the first
//! `endpoint` event. Each `POST /messages?sessionId=..` is acknowledged
//! immediately and its response is pushed later as a `message` event.

use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::protocol::{Inbound, ProtocolHandler};
use crate::session::SessionManager;
use crate::types::{JsonRpcError, McpError, McpResult, RequestId};

use super::{ENDPOINTS, HEALTH_PATH, INFO_PATH, MESSAGES_PATH, SSE_PATH};

/// Shared state of every route.
#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<ProtocolHandler>,
    pub sessions: Arc<SessionManager>,
}

/// SSE transport for web-based MCP clients.
pub struct SseTransport {
    state: AppState,
}

#[derive(Debug, Deserialize)]
struct MessageQuery {
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
}

impl SseTransport {
    pub fn new(handler: ProtocolHandler, sessions: Arc<SessionManager>) -> Self {
        Self {
            state: AppState {
                handler: Arc::new(handler),
                sessions,
            },
        }
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.state.sessions
    }

    /// The HTTP surface, ready to serve or to drive in tests.
    pub fn router(&self) -> Router {
        Router::new()
            .route(SSE_PATH, get(open_stream))
            .route(MESSAGES_PATH, post(post_message))
            .route(INFO_PATH, get(info))
            .route(HEALTH_PATH, get(|| async { "ok" }))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(CorsLayer::permissive()),
            )
            .with_state(self.state.clone())
    }

    /// Serve on `addr` until ctrl-c, then close every session.
    pub async fn run(&self, addr: &str) -> McpResult<()> {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(McpError::Io)?;
        self.serve_until(listener, shutdown_signal()).await
    }

    /// Serve on a bound listener until `signal` resolves.
    ///
    /// Sessions are closed as soon as the signal fires. Open event streams
    /// end with them, so graceful shutdown does not wait on idle clients.
    pub async fn serve_until<F>(&self, listener: TcpListener, signal: F) -> McpResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if let Ok(local) = listener.local_addr() {
            tracing::info!("SSE transport listening on {local}");
        }

        let sessions = Arc::clone(&self.state.sessions);
        let shutdown = async move {
            signal.await;
            let closed = sessions.close_all();
            tracing::info!("Closed {closed} sessions for shutdown");
        };

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| McpError::Transport(e.to_string()))?;

        tracing::info!("SSE transport stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}

async fn open_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let session = state.sessions.open();
    let endpoint = format!("{MESSAGES_PATH}?sessionId={}", session.id());

    let first = stream::once(async move {
        Ok::<_, Infallible>(Event::default().event("endpoint").data(endpoint))
    });
    let messages = session.map(|frame| {
        Ok::<_, Infallible>(Event::default().event("message").data(frame.to_string()))
    });

    Sse::new(first.chain(messages)).keep_alive(KeepAlive::default())
}

async fn post_message(
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
    body: Bytes,
) -> Response {
    let raw = query.session_id.unwrap_or_default();
    let session = match state.sessions.lookup(&raw) {
        Ok(session) => session,
        Err(e) => {
            tracing::debug!("Post to unknown session '{raw}'");
            return error_response(StatusCode::NOT_FOUND, &e);
        }
    };
    let id = session.id();

    let inbound = match Inbound::decode(&body) {
        Ok(inbound) => inbound,
        Err(e) => {
            let frame = ProtocolHandler::malformed(&e);
            let sessions = Arc::clone(&state.sessions);
            let pushed = frame.clone();
            tokio::spawn(async move {
                if let Err(e) = sessions.deliver(&id, pushed).await {
                    tracing::debug!("Could not report malformed frame to {id}: {e}");
                }
            });
            return (StatusCode::BAD_REQUEST, Json(frame)).into_response();
        }
    };

    tokio::spawn(async move {
        if let Some(response) = state.handler.handle_inbound(inbound).await {
            if let Err(e) = state.sessions.deliver(&id, response).await {
                tracing::debug!("Response for {id} discarded: {e}");
            }
        }
    });

    StatusCode::ACCEPTED.into_response()
}

async fn info(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.handler.registry().server_info(&ENDPOINTS))
}

fn error_response(status: StatusCode, error: &McpError) -> Response {
    (status, Json(JsonRpcError::from_error(RequestId::Null, error))).into_response()
}
