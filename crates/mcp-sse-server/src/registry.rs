//! The capability registry: resources, tools and prompts in three independent tables.
//!
//! Filled once at startup through `&mut self`, then shared behind an `Arc`
//! for the life of the process. Nothing mutates it afterwards, so lookups
//! need no synchronization.

use std::sync::Arc;

use crate::prompts::{PromptDescriptor, PromptRegistry};
use crate::resources::{ResolvedResource, ResourceDescriptor, ResourceRegistry};
use crate::tools::{ToolDescriptor, ToolRegistry};
use crate::types::{
    McpResult, PromptDefinition, ResourceDefinition, ResourceTemplateDefinition, ServerInfo,
    ToolDefinition, LATEST_PROTOCOL_VERSION, SERVER_NAME, SERVER_VERSION,
};

#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    resources: ResourceRegistry,
    tools: ToolRegistry,
    prompts: PromptRegistry,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_resource(&mut self, descriptor: ResourceDescriptor) -> McpResult<()> {
        self.resources.register(descriptor)
    }

    pub fn register_tool(&mut self, descriptor: ToolDescriptor) -> McpResult<()> {
        self.tools.register(descriptor)
    }

    pub fn register_prompt(&mut self, descriptor: PromptDescriptor) -> McpResult<()> {
        self.prompts.register(descriptor)
    }

    pub fn resolve_resource(&self, uri: &str) -> McpResult<ResolvedResource> {
        self.resources.resolve(uri)
    }

    pub fn resolve_tool(&self, name: &str) -> McpResult<Arc<ToolDescriptor>> {
        self.tools.resolve(name)
    }

    pub fn resolve_prompt(&self, name: &str) -> McpResult<Arc<PromptDescriptor>> {
        self.prompts.resolve(name)
    }

    pub fn list_resources(&self) -> Vec<ResourceDefinition> {
        self.resources.list()
    }

    pub fn list_resource_templates(&self) -> Vec<ResourceTemplateDefinition> {
        self.resources.list_templates()
    }

    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        self.tools.list()
    }

    pub fn list_prompts(&self) -> Vec<PromptDefinition> {
        self.prompts.list()
    }

    /// Identity summary for the info endpoint.
    pub fn server_info(&self, endpoints: &[&str]) -> ServerInfo {
        let templates = self.resources.list_templates().len();
        ServerInfo {
            name: SERVER_NAME.to_string(),
            version: SERVER_VERSION.to_string(),
            protocol_version: LATEST_PROTOCOL_VERSION.to_string(),
            endpoints: endpoints.iter().map(|e| e.to_string()).collect(),
            tools: self.tools.summaries(),
            resource_count: self.resources.len() - templates,
            resource_template_count: templates,
            prompt_count: self.prompts.len(),
        }
    }

    /// Freeze the registry for sharing.
    pub fn into_shared(self) -> Arc<Self> {
        tracing::info!(
            "Registry ready: {} resources, {} tools, {} prompts",
            self.resources.len(),
            self.tools.len(),
            self.prompts.len()
        );
        Arc::new(self)
    }
}
