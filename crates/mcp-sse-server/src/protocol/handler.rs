//! Request dispatch: resolve against the registry, invoke, answer exactly once.
//!
//! The handler is stateless between requests. Registry lookups need no lock
//! and invocations run on their own tasks, so any number of requests from
//! any number of sessions can be in flight through one handler.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};

use crate::invoke::Invoker;
use crate::registry::CapabilityRegistry;
use crate::types::{
    JsonRpcError, JsonRpcMessage, JsonRpcResponse, McpError, McpResult, PromptListResult,
    RequestId, ResourceListResult, ResourceTemplateListResult, ToolListResult,
};

use super::negotiation;
use super::request::{Inbound, McpRequest, Method};

pub struct ProtocolHandler {
    registry: Arc<CapabilityRegistry>,
    invoker: Invoker,
}

impl ProtocolHandler {
    pub fn new(registry: Arc<CapabilityRegistry>, invoker: Invoker) -> Self {
        Self { registry, invoker }
    }

    pub fn registry(&self) -> &Arc<CapabilityRegistry> {
        &self.registry
    }

    /// Handle one raw frame. Returns the response to push, if any:
    /// requests and malformed frames get one, notifications and replies don't.
    pub async fn handle_frame(&self, bytes: &[u8]) -> Option<Value> {
        match Inbound::decode(bytes) {
            Ok(inbound) => self.handle_inbound(inbound).await,
            Err(e) => Some(Self::malformed(&e)),
        }
    }

    /// Handle an already-parsed JSON-RPC message.
    pub async fn handle_message(&self, msg: JsonRpcMessage) -> Option<Value> {
        match Inbound::from_message(msg) {
            Ok(inbound) => self.handle_inbound(inbound).await,
            Err(e) => Some(Self::malformed(&e)),
        }
    }

    /// Handle a classified frame.
    pub async fn handle_inbound(&self, inbound: Inbound) -> Option<Value> {
        match inbound {
            Inbound::Request(request) => Some(self.dispatch(request).await),
            Inbound::Rejected { id, error } => {
                tracing::debug!("Rejected request {id}: {error}");
                Some(Self::failure(id, &error))
            }
            Inbound::Notification(method) => {
                tracing::debug!("Notification: {method}");
                None
            }
            Inbound::Reply(id) => {
                tracing::debug!("Ignoring client reply {id}");
                None
            }
        }
    }

    /// The uncorrelated failure answer for a frame that did not decode.
    pub fn malformed(error: &McpError) -> Value {
        tracing::warn!("Malformed frame: {error}");
        Self::failure(RequestId::Null, error)
    }

    /// Run one request to completion. Always yields exactly one response
    /// carrying the request's id.
    pub async fn dispatch(&self, request: McpRequest) -> Value {
        let McpRequest { id, method } = request;
        let name = method.name();
        tracing::debug!("Request {id}: {name}");

        match self.execute(method).await {
            Ok(result) => serde_json::to_value(JsonRpcResponse::new(id, result))
                .unwrap_or_else(|e| json!({ "error": e.to_string() })),
            Err(e) => {
                tracing::debug!("Request {id} ({name}) failed: {e}");
                Self::failure(id, &e)
            }
        }
    }

    async fn execute(&self, method: Method) -> McpResult<Value> {
        match method {
            Method::Initialize(params) => to_result(&negotiation::negotiate(&params)),
            Method::Ping => Ok(json!({})),
            Method::ListResources(_) => to_result(&ResourceListResult {
                resources: self.registry.list_resources(),
                next_cursor: None,
            }),
            Method::ListResourceTemplates(_) => to_result(&ResourceTemplateListResult {
                resource_templates: self.registry.list_resource_templates(),
                next_cursor: None,
            }),
            Method::ReadResource(params) => {
                let resolved = self.registry.resolve_resource(&params.uri)?;
                to_result(&self.invoker.read_resource(&params.uri, resolved).await?)
            }
            Method::ListTools(_) => to_result(&ToolListResult {
                tools: self.registry.list_tools(),
                next_cursor: None,
            }),
            Method::CallTool(params) => {
                let tool = self.registry.resolve_tool(&params.name)?;
                to_result(&self.invoker.call_tool(tool, params.arguments).await?)
            }
            Method::ListPrompts(_) => to_result(&PromptListResult {
                prompts: self.registry.list_prompts(),
                next_cursor: None,
            }),
            Method::GetPrompt(params) => {
                let prompt = self.registry.resolve_prompt(&params.name)?;
                to_result(&self.invoker.get_prompt(prompt, params.arguments).await?)
            }
        }
    }

    fn failure(id: RequestId, error: &McpError) -> Value {
        serde_json::to_value(JsonRpcError::from_error(id, error))
            .unwrap_or_else(|e| json!({ "error": e.to_string() }))
    }
}

fn to_result(value: &impl Serialize) -> McpResult<Value> {
    Ok(serde_json::to_value(value)?)
}
