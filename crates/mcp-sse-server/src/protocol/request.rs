//! Decoding of inbound frames into typed requests.
//!
//! Method names are matched exactly once, here. Everything downstream works
//! on the [`Method`] enum, so adding a request kind is a compile error until
//! the dispatcher handles it.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::types::{
    InitializeParams, JsonRpcMessage, ListParams, McpError, McpResult, PromptGetParams, RequestId,
    ResourceReadParams, ToolCallParams, JSONRPC_VERSION,
};

/// A request kind with its typed payload.
#[derive(Debug, Clone)]
pub enum Method {
    Initialize(InitializeParams),
    Ping,
    ListResources(ListParams),
    ListResourceTemplates(ListParams),
    ReadResource(ResourceReadParams),
    ListTools(ListParams),
    CallTool(ToolCallParams),
    ListPrompts(ListParams),
    GetPrompt(PromptGetParams),
}

impl Method {
    /// Decode a method name and its params. Unknown names are
    /// `MethodNotFound`; params of the wrong shape are `InvalidParams`.
    pub fn decode(name: &str, params: Option<Value>) -> McpResult<Self> {
        Ok(match name {
            "initialize" => Method::Initialize(typed(params)?),
            "ping" => Method::Ping,
            "resources/list" => Method::ListResources(typed(params)?),
            "resources/templates/list" => Method::ListResourceTemplates(typed(params)?),
            "resources/read" => Method::ReadResource(typed(params)?),
            "tools/list" => Method::ListTools(typed(params)?),
            "tools/call" => Method::CallTool(typed(params)?),
            "prompts/list" => Method::ListPrompts(typed(params)?),
            "prompts/get" => Method::GetPrompt(typed(params)?),
            other => return Err(McpError::MethodNotFound(other.to_string())),
        })
    }

    /// Wire name of the method.
    pub fn name(&self) -> &'static str {
        match self {
            Method::Initialize(_) => "initialize",
            Method::Ping => "ping",
            Method::ListResources(_) => "resources/list",
            Method::ListResourceTemplates(_) => "resources/templates/list",
            Method::ReadResource(_) => "resources/read",
            Method::ListTools(_) => "tools/list",
            Method::CallTool(_) => "tools/call",
            Method::ListPrompts(_) => "prompts/list",
            Method::GetPrompt(_) => "prompts/get",
        }
    }
}

fn typed<T: DeserializeOwned>(params: Option<Value>) -> McpResult<T> {
    let value = match params {
        None | Some(Value::Null) => Value::Object(Map::new()),
        Some(v) => v,
    };
    serde_json::from_value(value).map_err(|e| McpError::InvalidParams(e.to_string()))
}

/// A decoded request, immutable once received.
#[derive(Debug, Clone)]
pub struct McpRequest {
    pub id: RequestId,
    pub method: Method,
}

/// Classification of one inbound frame.
#[derive(Debug)]
pub enum Inbound {
    Request(McpRequest),
    /// A request whose method or params failed to decode. It still has an
    /// id, so the failure is correlated.
    Rejected { id: RequestId, error: McpError },
    /// Notifications are accepted and never answered.
    Notification(String),
    /// The server never issues requests, so client replies are ignored.
    Reply(RequestId),
}

impl Inbound {
    /// Classify a JSON-RPC message.
    pub fn from_message(msg: JsonRpcMessage) -> McpResult<Self> {
        if msg.version() != JSONRPC_VERSION {
            return Err(McpError::MalformedRequest(format!(
                "unsupported jsonrpc version '{}'",
                msg.version()
            )));
        }

        Ok(match msg {
            JsonRpcMessage::Request(req) => match Method::decode(&req.method, req.params) {
                Ok(method) => Inbound::Request(McpRequest { id: req.id, method }),
                Err(error) => Inbound::Rejected { id: req.id, error },
            },
            JsonRpcMessage::Notification(n) => Inbound::Notification(n.method),
            JsonRpcMessage::Response(r) => Inbound::Reply(r.id),
            JsonRpcMessage::Error(e) => Inbound::Reply(e.id),
        })
    }

    /// Decode a raw frame. An `Err` here cannot be correlated to any request.
    pub fn decode(bytes: &[u8]) -> McpResult<Self> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|e| McpError::ParseError(e.to_string()))?;
        if value.is_array() {
            return Err(McpError::MalformedRequest(
                "batch requests are not supported".to_string(),
            ));
        }
        let has_id = value.get("id").is_some();
        let msg: JsonRpcMessage = serde_json::from_value(value).map_err(|_| {
            McpError::MalformedRequest("frame is not a JSON-RPC 2.0 message".to_string())
        })?;
        // An id that is neither a string nor an integer cannot be answered
        if has_id && matches!(msg, JsonRpcMessage::Notification(_)) {
            return Err(McpError::MalformedRequest(
                "request id must be a string or an integer".to_string(),
            ));
        }
        Self::from_message(msg)
    }
}
