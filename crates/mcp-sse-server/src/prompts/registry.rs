//! Prompt registration and lookup.

use std::collections::HashMap;
use std::sync::Arc;

use crate::schema::InputShape;
use crate::types::{McpError, McpResult, PromptDefinition};

use super::PromptRenderer;

/// A registered prompt. Prompts without a shape receive their arguments unvalidated.
pub struct PromptDescriptor {
    pub name: String,
    pub description: Option<String>,
    pub input: Option<InputShape>,
    pub renderer: Arc<dyn PromptRenderer>,
}

impl std::fmt::Debug for PromptDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptDescriptor")
            .field("name", &self.name)
            .field("input", &self.input)
            .finish_non_exhaustive()
    }
}

impl PromptDescriptor {
    pub fn new(name: impl Into<String>, renderer: impl PromptRenderer + 'static) -> Self {
        Self {
            name: name.into(),
            description: None,
            input: None,
            renderer: Arc::new(renderer),
        }
    }

    pub fn with_input(mut self, input: InputShape) -> Self {
        self.input = Some(input);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn definition(&self) -> PromptDefinition {
        PromptDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            arguments: self.input.as_ref().map(InputShape::to_prompt_arguments),
        }
    }
}

/// Registry of all available prompts.
#[derive(Debug, Default)]
pub struct PromptRegistry {
    entries: Vec<Arc<PromptDescriptor>>,
    by_name: HashMap<String, usize>,
}

impl PromptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, descriptor: PromptDescriptor) -> McpResult<()> {
        if self.by_name.contains_key(&descriptor.name) {
            return Err(McpError::DuplicateName {
                kind: "prompt",
                key: descriptor.name,
            });
        }
        tracing::debug!("Registered prompt '{}'", descriptor.name);
        self.by_name
            .insert(descriptor.name.clone(), self.entries.len());
        self.entries.push(Arc::new(descriptor));
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> McpResult<Arc<PromptDescriptor>> {
        self.by_name
            .get(name)
            .map(|&index| Arc::clone(&self.entries[index]))
            .ok_or_else(|| McpError::PromptNotFound(name.to_string()))
    }

    /// All prompt definitions in registration order.
    pub fn list(&self) -> Vec<PromptDefinition> {
        self.entries.iter().map(|p| p.definition()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
