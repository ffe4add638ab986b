//! The built-in catalog served by the binary.
//!
//! Every content source is a capability object owned here and handed to
//! the producers and executors that need it.

pub mod files;
pub mod prompts;
pub mod resources;
pub mod search;
pub mod store;
pub mod tools;

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::registry::CapabilityRegistry;
use crate::types::McpResult;

pub use search::{BraveSearchClient, SearchClient, SearchHit};
pub use store::KeyValueStore;

/// Capabilities shared by the built-in resources, tools and prompts.
#[derive(Clone)]
pub struct Builtins {
    pub config: Arc<ServerConfig>,
    pub content_root: PathBuf,
    pub store: Arc<KeyValueStore>,
    pub search: Arc<dyn SearchClient>,
}

impl Builtins {
    /// Wire the production capabilities: seeded store, Brave search client.
    pub fn from_config(config: ServerConfig) -> McpResult<Self> {
        let search = BraveSearchClient::new(&config.search)?;
        let content_root = config.content_root.clone();
        Ok(Self {
            config: Arc::new(config),
            content_root,
            store: Arc::new(KeyValueStore::seeded()),
            search: Arc::new(search),
        })
    }

    pub fn with_content_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.content_root = root.into();
        self
    }

    pub fn with_store(mut self, store: Arc<KeyValueStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_search(mut self, search: Arc<dyn SearchClient>) -> Self {
        self.search = search;
        self
    }

    /// Register the whole catalog.
    pub fn register(&self, registry: &mut CapabilityRegistry) -> McpResult<()> {
        resources::register(registry, self)?;
        tools::register(registry, self)?;
        prompts::register(registry)?;
        tracing::debug!(
            "Built-in catalog registered (content root {})",
            self.content_root.display()
        );
        Ok(())
    }

    /// A fresh registry holding the catalog.
    pub fn build_registry(&self) -> McpResult<CapabilityRegistry> {
        let mut registry = CapabilityRegistry::new();
        self.register(&mut registry)?;
        Ok(registry)
    }
}
