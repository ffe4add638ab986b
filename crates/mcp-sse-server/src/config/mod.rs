//! Configuration loading and resolution.

pub mod loader;

pub use loader::{load_config, resolve_content_root, SearchConfig, ServerConfig};
