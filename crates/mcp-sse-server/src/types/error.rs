//! Error taxonomy shared by the registry, invocation layer, sessions and transport.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// JSON-RPC parse error.
pub const PARSE_ERROR: i32 = -32700;
/// JSON-RPC invalid request.
pub const INVALID_REQUEST: i32 = -32600;
/// JSON-RPC method not found.
pub const METHOD_NOT_FOUND: i32 = -32601;
/// JSON-RPC invalid params.
pub const INVALID_PARAMS: i32 = -32602;
/// JSON-RPC internal error.
pub const INTERNAL_ERROR: i32 = -32603;
/// Tool name not registered.
pub const TOOL_NOT_FOUND: i32 = -32001;
/// Resource URI not resolvable.
pub const RESOURCE_NOT_FOUND: i32 = -32002;
/// Prompt name not registered.
pub const PROMPT_NOT_FOUND: i32 = -32003;
/// External collaborator failed.
pub const UPSTREAM_ERROR: i32 = -32010;
/// Message posted against an unknown or closed session.
pub const SESSION_NOT_FOUND: i32 = -32011;
/// Registration conflict.
pub const DUPLICATE_NAME: i32 = -32012;

/// Wire tag carried in `error.data.kind` of every failure response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    InvalidArguments,
    DuplicateName,
    SessionNotFound,
    Upstream,
    MalformedRequest,
    MethodNotFound,
    Internal,
}

/// Errors produced anywhere in the server.
#[derive(Debug, thiserror::Error)]
pub enum McpError {
    /// The frame was not valid JSON.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The frame was JSON but not a JSON-RPC 2.0 message.
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// Params did not fit the method's expected shape.
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// A tool or prompt argument failed shape validation.
    #[error("Invalid argument '{field}': {reason}")]
    InvalidArguments { field: String, reason: String },

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Prompt not found: {0}")]
    PromptNotFound(String),

    #[error("Duplicate {kind} registration: {key}")]
    DuplicateName { kind: &'static str, key: String },

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Upstream failure: {0}")]
    Upstream(String),

    #[error("Invocation exceeded its deadline of {0:?}")]
    DeadlineExceeded(Duration),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used across the crate.
pub type McpResult<T> = Result<T, McpError>;

impl McpError {
    /// Shorthand for an argument validation failure.
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// The failure tag reported on the wire.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ParseError(_) | Self::MalformedRequest(_) => ErrorKind::MalformedRequest,
            Self::MethodNotFound(_) => ErrorKind::MethodNotFound,
            Self::InvalidParams(_) | Self::InvalidArguments { .. } => ErrorKind::InvalidArguments,
            Self::ResourceNotFound(_) | Self::ToolNotFound(_) | Self::PromptNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::DuplicateName { .. } => ErrorKind::DuplicateName,
            Self::SessionNotFound(_) => ErrorKind::SessionNotFound,
            Self::Upstream(_) | Self::DeadlineExceeded(_) | Self::Io(_) => ErrorKind::Upstream,
            Self::Transport(_)
            | Self::Config(_)
            | Self::InternalError(_)
            | Self::Json(_) => ErrorKind::Internal,
        }
    }

    /// JSON-RPC error code for this failure.
    pub fn code(&self) -> i32 {
        match self {
            Self::ParseError(_) => PARSE_ERROR,
            Self::MalformedRequest(_) => INVALID_REQUEST,
            Self::MethodNotFound(_) => METHOD_NOT_FOUND,
            Self::InvalidParams(_) | Self::InvalidArguments { .. } => INVALID_PARAMS,
            Self::ResourceNotFound(_) => RESOURCE_NOT_FOUND,
            Self::ToolNotFound(_) => TOOL_NOT_FOUND,
            Self::PromptNotFound(_) => PROMPT_NOT_FOUND,
            Self::DuplicateName { .. } => DUPLICATE_NAME,
            Self::SessionNotFound(_) => SESSION_NOT_FOUND,
            Self::Upstream(_) | Self::DeadlineExceeded(_) | Self::Io(_) => UPSTREAM_ERROR,
            Self::Transport(_)
            | Self::Config(_)
            | Self::InternalError(_)
            | Self::Json(_) => INTERNAL_ERROR,
        }
    }
}
