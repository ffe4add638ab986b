//! Resource table: exact URIs and templates, resolved with fixed precedence.

use std::collections::HashMap;
use std::sync::Arc;

use crate::types::{McpError, McpResult, ResourceDefinition, ResourceTemplateDefinition};

use super::template::{split_uri, UriParams, UriTemplate};
use super::ResourceProducer;

/// Where a resource lives.
#[derive(Debug, Clone)]
pub enum ResourceAddress {
    /// One concrete URI.
    Exact(String),
    /// Any URI the template matches.
    Template(UriTemplate),
}

impl ResourceAddress {
    pub fn as_str(&self) -> &str {
        match self {
            ResourceAddress::Exact(uri) => uri,
            ResourceAddress::Template(template) => template.as_str(),
        }
    }
}

/// A registered resource. Immutable once it is in the registry.
pub struct ResourceDescriptor {
    pub name: String,
    pub description: Option<String>,
    pub mime_type: Option<String>,
    pub address: ResourceAddress,
    /// Only exact resources can be listed; templates have no enumerable instances.
    pub listable: bool,
    pub producer: Arc<dyn ResourceProducer>,
}

impl std::fmt::Debug for ResourceDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceDescriptor")
            .field("name", &self.name)
            .field("address", &self.address)
            .field("listable", &self.listable)
            .finish_non_exhaustive()
    }
}

impl ResourceDescriptor {
    /// A listable resource at exactly `uri`.
    pub fn exact(
        uri: impl Into<String>,
        name: impl Into<String>,
        producer: impl ResourceProducer + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: None,
            mime_type: None,
            address: ResourceAddress::Exact(uri.into()),
            listable: true,
            producer: Arc::new(producer),
        }
    }

    /// A resource family addressed by a URI template.
    pub fn template(
        pattern: &str,
        name: impl Into<String>,
        producer: impl ResourceProducer + 'static,
    ) -> McpResult<Self> {
        Ok(Self {
            name: name.into(),
            description: None,
            mime_type: None,
            address: ResourceAddress::Template(UriTemplate::compile(pattern)?),
            listable: false,
            producer: Arc::new(producer),
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Keep an exact resource out of `resources/list`.
    pub fn unlisted(mut self) -> Self {
        self.listable = false;
        self
    }

    pub fn is_template(&self) -> bool {
        matches!(self.address, ResourceAddress::Template(_))
    }
}

/// Outcome of resolving a URI: the descriptor plus its template bindings.
#[derive(Debug, Clone)]
pub struct ResolvedResource {
    pub descriptor: Arc<ResourceDescriptor>,
    pub params: UriParams,
}

/// Registration-ordered table of resources.
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    entries: Vec<Arc<ResourceDescriptor>>,
    exact: HashMap<String, usize>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource. Exact URIs must be unique; templates must be
    /// distinct and must not overlap an earlier template.
    pub fn register(&mut self, descriptor: ResourceDescriptor) -> McpResult<()> {
        match &descriptor.address {
            ResourceAddress::Exact(uri) => {
                if split_uri(uri).is_none() {
                    return Err(McpError::Config(format!("resource URI has no scheme: {uri}")));
                }
                if self.exact.contains_key(uri) {
                    return Err(McpError::DuplicateName {
                        kind: "resource",
                        key: uri.clone(),
                    });
                }
                self.exact.insert(uri.clone(), self.entries.len());
            }
            ResourceAddress::Template(template) => {
                if let Some(existing) = self.templates().find(|t| t.overlaps(template)) {
                    let key = if existing == template {
                        template.to_string()
                    } else {
                        format!("{template} (overlaps {existing})")
                    };
                    return Err(McpError::DuplicateName {
                        kind: "resource template",
                        key,
                    });
                }
            }
        }

        tracing::debug!(
            "Registered resource '{}' at {}",
            descriptor.name,
            descriptor.address.as_str()
        );
        let mut descriptor = descriptor;
        if descriptor.is_template() {
            descriptor.listable = false;
        }
        self.entries.push(Arc::new(descriptor));
        Ok(())
    }

    /// Exact match first, then the first matching template in registration order.
    pub fn resolve(&self, uri: &str) -> McpResult<ResolvedResource> {
        if let Some(&index) = self.exact.get(uri) {
            return Ok(ResolvedResource {
                descriptor: Arc::clone(&self.entries[index]),
                params: UriParams::default(),
            });
        }

        self.entries
            .iter()
            .find_map(|entry| match &entry.address {
                ResourceAddress::Template(template) => {
                    template.matches(uri).map(|params| ResolvedResource {
                        descriptor: Arc::clone(entry),
                        params,
                    })
                }
                ResourceAddress::Exact(_) => None,
            })
            .ok_or_else(|| McpError::ResourceNotFound(uri.to_string()))
    }

    /// Listable resources in registration order.
    pub fn list(&self) -> Vec<ResourceDefinition> {
        self.entries
            .iter()
            .filter(|e| e.listable)
            .map(|e| ResourceDefinition {
                uri: e.address.as_str().to_string(),
                name: e.name.clone(),
                description: e.description.clone(),
                mime_type: e.mime_type.clone(),
            })
            .collect()
    }

    /// Templated resources in registration order.
    pub fn list_templates(&self) -> Vec<ResourceTemplateDefinition> {
        self.entries
            .iter()
            .filter(|e| e.is_template())
            .map(|e| ResourceTemplateDefinition {
                uri_template: e.address.as_str().to_string(),
                name: e.name.clone(),
                description: e.description.clone(),
                mime_type: e.mime_type.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn templates(&self) -> impl Iterator<Item = &UriTemplate> {
        self.entries.iter().filter_map(|e| match &e.address {
            ResourceAddress::Template(t) => Some(t),
            ResourceAddress::Exact(_) => None,
        })
    }
}
