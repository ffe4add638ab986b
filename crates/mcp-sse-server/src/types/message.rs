//! JSON-RPC 2.0 framing for the request/response protocol carried on each session.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::error::McpError;

/// JSON-RPC 2.0 protocol version.
pub const JSONRPC_VERSION: &str = "2.0";

/// Correlation id linking a request to its response.
///
/// `Null` is used for failures that cannot be correlated, such as a frame
/// that never decoded far enough to reveal its id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    String(String),
    Number(i64),
    Null,
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestId::String(s) => write!(f, "{s}"),
            RequestId::Number(n) => write!(f, "{n}"),
            RequestId::Null => write!(f, "null"),
        }
    }
}

/// An inbound request: carries an id and expects exactly one response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: RequestId,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// Success response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: RequestId,
    pub result: Value,
}

/// Failure response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub jsonrpc: String,
    pub id: RequestId,
    pub error: JsonRpcErrorObject,
}

/// Error object within a failure response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcErrorObject {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// A notification: no id, never answered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcNotification {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// Any JSON-RPC message. Variant order matters for untagged decoding:
/// a frame with both `id` and `method` is a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonRpcMessage {
    Request(JsonRpcRequest),
    Response(JsonRpcResponse),
    Error(JsonRpcError),
    Notification(JsonRpcNotification),
}

impl JsonRpcMessage {
    /// The `jsonrpc` version string the peer sent.
    pub fn version(&self) -> &str {
        match self {
            JsonRpcMessage::Request(r) => &r.jsonrpc,
            JsonRpcMessage::Response(r) => &r.jsonrpc,
            JsonRpcMessage::Error(e) => &e.jsonrpc,
            JsonRpcMessage::Notification(n) => &n.jsonrpc,
        }
    }
}

impl JsonRpcRequest {
    /// Build a request, mostly useful for clients and tests.
    pub fn new(id: RequestId, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.into(),
            params,
        }
    }
}

impl JsonRpcResponse {
    pub fn new(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result,
        }
    }
}

impl JsonRpcError {
    /// Normalize a server error into a tagged failure response.
    pub fn from_error(id: RequestId, err: &McpError) -> Self {
        let mut data = json!({ "kind": err.kind() });
        if let McpError::InvalidArguments { field, .. } = err {
            data["field"] = Value::String(field.clone());
        }
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            error: JsonRpcErrorObject {
                code: err.code(),
                message: err.to_string(),
                data: Some(data),
            },
        }
    }
}
