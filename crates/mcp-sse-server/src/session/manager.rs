//! Per-client session tracking, keyed by session id.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::Stream;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tokio::sync::mpsc::{self, error::SendTimeoutError};
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

use crate::types::{McpError, McpResult};

/// Default capacity of each session's outbound channel.
pub const DEFAULT_OUTBOUND_CAPACITY: usize = 64;

/// How long a frame may wait for room in a full outbound channel.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Session identifier.
pub type SessionId = Uuid;

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Open,
    Closed,
}

/// Server-side state for one connected client.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    outbound: mpsc::Sender<Value>,
    created_at: DateTime<Utc>,
    state: Mutex<SessionState>,
}

impl Session {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock()
    }

    fn set_state(&self, state: SessionState) {
        *self.state.lock() = state;
    }

    /// Push one frame onto this session's stream, waiting at most `limit`
    /// for the client to drain it.
    async fn send(&self, frame: Value, limit: Duration) -> McpResult<()> {
        match self.outbound.send_timeout(frame, limit).await {
            Ok(()) => Ok(()),
            Err(SendTimeoutError::Timeout(_)) => {
                tracing::warn!("Session {} stopped reading its stream", self.id);
                Err(McpError::SessionNotFound(self.id.to_string()))
            }
            Err(SendTimeoutError::Closed(_)) => {
                Err(McpError::SessionNotFound(self.id.to_string()))
            }
        }
    }
}

/// Tracks every open session.
///
/// The map lock is synchronous and only held for inserts, removals and
/// lookups; sends happen after it is released.
#[derive(Debug)]
pub struct SessionManager {
    sessions: RwLock<HashMap<SessionId, Arc<Session>>>,
    capacity: usize,
    send_timeout: Duration,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(DEFAULT_OUTBOUND_CAPACITY)
    }
}

impl SessionManager {
    /// Create a manager whose sessions buffer up to `capacity` outbound frames.
    pub fn new(capacity: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
            send_timeout: DEFAULT_SEND_TIMEOUT,
        }
    }

    /// Bound how long a delivery waits on a client that is not reading.
    pub fn with_send_timeout(mut self, limit: Duration) -> Self {
        self.send_timeout = limit;
        self
    }

    /// Allocate a new session. The returned stream yields the session's
    /// outbound frames; dropping it closes the session.
    pub fn open(self: &Arc<Self>) -> SessionStream {
        let (tx, rx) = mpsc::channel(self.capacity);
        let session = Arc::new(Session {
            id: Uuid::new_v4(),
            outbound: tx,
            created_at: Utc::now(),
            state: Mutex::new(SessionState::Connecting),
        });
        let id = session.id;

        self.sessions.write().insert(id, Arc::clone(&session));
        session.set_state(SessionState::Open);
        tracing::info!("Session {id} opened");

        SessionStream {
            id,
            inner: ReceiverStream::new(rx),
            manager: Arc::downgrade(self),
        }
    }

    /// Look up an open session.
    pub fn get(&self, id: &SessionId) -> McpResult<Arc<Session>> {
        self.sessions
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| McpError::SessionNotFound(id.to_string()))
    }

    /// Look up a session by its textual id, as posted by a client.
    pub fn lookup(&self, raw: &str) -> McpResult<Arc<Session>> {
        let id = Uuid::parse_str(raw).map_err(|_| McpError::SessionNotFound(raw.to_string()))?;
        self.get(&id)
    }

    /// Close a session. Returns whether it was open.
    pub fn close(&self, id: &SessionId) -> bool {
        let removed = self.sessions.write().remove(id);
        match removed {
            Some(session) => {
                session.set_state(SessionState::Closed);
                tracing::info!("Session {id} closed");
                true
            }
            None => false,
        }
    }

    /// Deliver a frame to a session. Fails with `SessionNotFound` when the
    /// session is closed, including when it closes while the frame is queued.
    /// A session whose channel stays full past the send timeout is closed.
    pub async fn deliver(&self, id: &SessionId, frame: Value) -> McpResult<()> {
        let session = self.get(id)?;
        let result = session.send(frame, self.send_timeout).await;
        if result.is_err() {
            self.close(id);
        }
        result
    }

    /// Close every session, used at shutdown.
    pub fn close_all(&self) -> usize {
        let drained: Vec<_> = self.sessions.write().drain().collect();
        for (id, session) in &drained {
            session.set_state(SessionState::Closed);
            tracing::debug!("Session {id} closed at shutdown");
        }
        drained.len()
    }

    /// Number of open sessions.
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    pub fn ids(&self) -> Vec<SessionId> {
        self.sessions.read().keys().copied().collect()
    }
}

/// Outbound frames of one session. Closes the session when dropped.
#[derive(Debug)]
pub struct SessionStream {
    id: SessionId,
    inner: ReceiverStream<Value>,
    manager: Weak<SessionManager>,
}

impl SessionStream {
    pub fn id(&self) -> SessionId {
        self.id
    }
}

impl Stream for SessionStream {
    type Item = Value;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Value>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

impl Drop for SessionStream {
    fn drop(&mut self) {
        if let Some(manager) = self.manager.upgrade() {
            manager.close(&self.id);
        }
    }
}
