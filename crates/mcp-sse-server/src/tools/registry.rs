//! Tool table: unique names, registration order preserved for listing.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::schema::InputShape;
use crate::types::{McpError, McpResult, ToolDefinition, ToolSummary};

use super::ToolExecutor;

/// A registered tool.
pub struct ToolDescriptor {
    pub name: String,
    pub description: Option<String>,
    pub input: InputShape,
    /// Overrides the server-wide invocation deadline.
    pub timeout: Option<Duration>,
    pub executor: Arc<dyn ToolExecutor>,
}

impl std::fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("name", &self.name)
            .field("input", &self.input)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ToolDescriptor {
    pub fn new(
        name: impl Into<String>,
        input: InputShape,
        executor: impl ToolExecutor + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: None,
            input,
            timeout: None,
            executor: Arc::new(executor),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Definition advertised by `tools/list`.
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: self.input.to_json_schema(),
        }
    }
}

/// Registry of all available tools.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    entries: Vec<Arc<ToolDescriptor>>,
    by_name: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, descriptor: ToolDescriptor) -> McpResult<()> {
        if self.by_name.contains_key(&descriptor.name) {
            return Err(McpError::DuplicateName {
                kind: "tool",
                key: descriptor.name,
            });
        }
        tracing::debug!("Registered tool '{}'", descriptor.name);
        self.by_name
            .insert(descriptor.name.clone(), self.entries.len());
        self.entries.push(Arc::new(descriptor));
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> McpResult<Arc<ToolDescriptor>> {
        self.by_name
            .get(name)
            .map(|&index| Arc::clone(&self.entries[index]))
            .ok_or_else(|| McpError::ToolNotFound(name.to_string()))
    }

    pub fn list(&self) -> Vec<ToolDefinition> {
        self.entries.iter().map(|t| t.definition()).collect()
    }

    pub fn summaries(&self) -> Vec<ToolSummary> {
        self.entries
            .iter()
            .map(|t| ToolSummary {
                name: t.name.clone(),
                description: t.description.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
