//! Server configuration: TOML file first, environment variables on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::session::{DEFAULT_OUTBOUND_CAPACITY, DEFAULT_SEND_TIMEOUT};
use crate::types::{McpError, McpResult};

/// Default search endpoint (Brave Search web API).
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://api.search.brave.com/res/v1/web/search";

/// Complete server configuration. Every field has a default, so an empty
/// file (or none at all) is valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding `logs/`, `docs/` and `text/`.
    pub content_root: PathBuf,
    /// Deadline for a single invocation; 0 disables it.
    pub invocation_timeout_secs: u64,
    /// Outbound frames buffered per session.
    pub session_buffer: usize,
    /// Seconds a frame may wait on a session whose client stopped reading.
    pub session_send_timeout_secs: u64,
    pub search: SearchConfig,
}

/// Outbound web-search capability settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub endpoint: String,
    /// Missing keys are reported when the tool is called, not at startup.
    pub api_key: Option<String>,
    pub max_results: usize,
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            content_root: PathBuf::from("content"),
            invocation_timeout_secs: 30,
            session_buffer: DEFAULT_OUTBOUND_CAPACITY,
            session_send_timeout_secs: DEFAULT_SEND_TIMEOUT.as_secs(),
            search: SearchConfig::default(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            api_key: None,
            max_results: 5,
            timeout_secs: 10,
        }
    }
}

impl ServerConfig {
    /// Parse a TOML document.
    pub fn from_toml(text: &str) -> McpResult<Self> {
        toml::from_str(text).map_err(|e| McpError::Config(e.to_string()))
    }

    /// Apply overrides from an environment lookup.
    ///
    /// Recognized: `HOST`, `PORT`, `CONTENT_ROOT`, `INVOCATION_TIMEOUT_SECS`,
    /// `SEARCH_API_KEY` (falling back to `BRAVE_API_KEY`).
    pub fn apply_env<F>(&mut self, lookup: F) -> McpResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.port = port
                .parse()
                .map_err(|_| McpError::Config(format!("PORT is not a valid port: {port}")))?;
        }
        if let Some(root) = lookup("CONTENT_ROOT") {
            self.content_root = PathBuf::from(root);
        }
        if let Some(secs) = lookup("INVOCATION_TIMEOUT_SECS") {
            self.invocation_timeout_secs = secs.parse().map_err(|_| {
                McpError::Config(format!("INVOCATION_TIMEOUT_SECS is not a number: {secs}"))
            })?;
        }
        if let Some(key) = lookup("SEARCH_API_KEY").or_else(|| lookup("BRAVE_API_KEY")) {
            if !key.trim().is_empty() {
                self.search.api_key = Some(key);
            }
        }
        Ok(())
    }

    /// Listen address.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn invocation_timeout(&self) -> Duration {
        Duration::from_secs(self.invocation_timeout_secs)
    }

    pub fn session_send_timeout(&self) -> Duration {
        Duration::from_secs(self.session_send_timeout_secs.max(1))
    }

    /// Configuration safe to show to clients: credentials become presence flags.
    pub fn public_snapshot(&self) -> Value {
        json!({
            "host": self.host,
            "port": self.port,
            "content_root": self.content_root.display().to_string(),
            "invocation_timeout_secs": self.invocation_timeout_secs,
            "session_buffer": self.session_buffer,
            "session_send_timeout_secs": self.session_send_timeout_secs,
            "search": {
                "endpoint": self.search.endpoint,
                "max_results": self.search.max_results,
                "api_key_configured": self.search.api_key.is_some(),
            },
        })
    }
}

/// Load configuration from an optional TOML file, then the process environment.
pub fn load_config(path: Option<&str>) -> McpResult<ServerConfig> {
    let mut config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| McpError::Config(format!("cannot read {path}: {e}")))?;
            tracing::debug!("Loaded configuration from {path}");
            ServerConfig::from_toml(&text)?
        }
        None => ServerConfig::default(),
    };
    config.apply_env(|key| std::env::var(key).ok())?;

    if config.search.api_key.is_none() {
        tracing::warn!("No search API key configured; web_search calls will fail");
    }
    Ok(config)
}

/// Content root: explicit CLI value first, then configuration.
pub fn resolve_content_root(explicit: Option<&Path>, config: &ServerConfig) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.content_root.clone())
}
